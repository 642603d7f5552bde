use crate::server::api;
use crate::server::request::RequestError;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

fn json_ok(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/clash") => payload_response(api::clash_payload(body)),
        ("POST", "/api/matchup") => payload_response(api::matchup_payload(body)),
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn payload_response(result: Result<String, api::PayloadError>) -> HttpResponse {
    match result {
        Ok(payload) => json_ok(payload),
        Err(api::PayloadError::Parse(err)) => {
            error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
        }
        Err(api::PayloadError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
        Err(err @ (api::PayloadError::Engine(_) | api::PayloadError::NoResults(_))) => {
            error_response(422, "Unprocessable Entity", &err.to_string())
        }
        Err(err @ api::PayloadError::Serialize(_)) => {
            error_response(500, "Internal Server Error", &err.to_string())
        }
    }
}

/// Response for a request the reader refused before routing.
pub fn request_error_response(err: &RequestError) -> HttpResponse {
    match err {
        RequestError::BodyTooLarge { .. } => {
            error_response(413, "Payload Too Large", &err.to_string())
        }
        RequestError::HeadersTooLarge => {
            error_response(431, "Request Header Fields Too Large", &err.to_string())
        }
        _ => error_response(400, "Bad Request", &err.to_string()),
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Limbus Clash Calculator</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    .row { display: grid; grid-template-columns: repeat(7, 1fr); gap: 6px; align-items: end; }
    label { display:block; font-size: 0.8rem; font-weight: 600; }
    input { width: 100%; padding: 6px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 120px; }
  </style>
</head>
<body>
  <h1>Clash Calculator</h1>
  <p>Exact clash win probability for two skills.</p>

  <div class="card" id="p1">
    <strong>Sinner skill</strong>
    <div class="row">
      <label>Base<input data-field="base_power" type="number" value="6" /></label>
      <label>Coins<input data-field="num_coins" type="number" min="1" value="3" /></label>
      <label>Coin power<input data-field="coin_power" type="number" value="4" /></label>
      <label>Sanity<input data-field="sanity" type="number" min="-45" max="45" value="40" /></label>
      <label>Offense<input data-field="offense_level" type="number" value="40" /></label>
      <label>Modifier<input data-field="final_clash_power_modifier" type="number" value="0" /></label>
      <label>Paralyze<input data-field="paralyze_count" type="number" min="0" value="0" /></label>
    </div>
  </div>

  <div class="card" id="p2">
    <strong>Enemy skill</strong>
    <div class="row">
      <label>Base<input data-field="base_power" type="number" value="13" /></label>
      <label>Coins<input data-field="num_coins" type="number" min="1" value="3" /></label>
      <label>Coin power<input data-field="coin_power" type="number" value="2" /></label>
      <label>Sanity<input data-field="sanity" type="number" min="-45" max="45" value="0" /></label>
      <label>Offense<input data-field="offense_level" type="number" value="40" /></label>
      <label>Modifier<input data-field="final_clash_power_modifier" type="number" value="0" /></label>
      <label>Paralyze<input data-field="paralyze_count" type="number" min="0" value="0" /></label>
    </div>
  </div>

  <button id="clash-btn">POST /api/clash</button>
  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');

    function readSide(id) {
      const side = {};
      document.querySelectorAll('#' + id + ' input').forEach(input => {
        side[input.dataset.field] = Number(input.value) || 0;
      });
      return side;
    }

    document.getElementById('clash-btn').addEventListener('click', async () => {
      output.textContent = 'Loading…';
      const response = await fetch('/api/clash', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ p1: readSide('p1'), p2: readSide('p2') }),
      });
      const text = await response.text();
      try {
        const j = JSON.parse(text);
        if (j.status === 'ok') {
          output.textContent = 'Win: ' + (j.win_rate * 100).toFixed(2) + '%  Lose: ' + (j.lose_rate * 100).toFixed(2) + '%  (' + j.state_count + ' states)';
          return;
        }
      } catch (e) {}
      output.textContent = 'HTTP ' + response.status + '\n' + text;
    });
  </script>
</body>
</html>
"#
    .to_string()
}
