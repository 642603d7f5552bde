use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use limbus_clash::server::request::MAX_BODY_BYTES;
use limbus_clash::server::routes::route_request;
use limbus_clash::server::serve;

fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("should bind an ephemeral port");
    let addr = listener.local_addr().expect("listener should have an address");
    thread::spawn(move || serve(listener));
    addr
}

fn read_response(stream: &mut TcpStream) -> String {
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .expect("server should answer and close");
    response
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request("GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
}

#[test]
fn index_page_is_html() {
    let response = route_request("GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("/api/clash"));
}

#[test]
fn clash_endpoint_returns_rates_and_chain() {
    let body = r#"{
        "p1": {"base_power": 6, "num_coins": 3, "coin_power": 4, "sanity": 40, "offense_level": 40},
        "p2": {"base_power": 13, "num_coins": 3, "coin_power": 2, "offense_level": 40}
    }"#;
    let response = route_request("POST", "/api/clash", body);
    assert_eq!(response.status_code, 200);

    let payload: serde_json::Value =
        serde_json::from_str(&response.body).expect("response should be valid json");
    assert_eq!(payload["status"], "ok");
    let win = payload["win_rate"].as_f64().expect("win_rate");
    let lose = payload["lose_rate"].as_f64().expect("lose_rate");
    assert!((win + lose - 1.0).abs() < 1e-9);

    let states = payload["states"].as_array().expect("states should be an array");
    let matrix = payload["transition_matrix"].as_array().expect("matrix");
    assert_eq!(states.len(), matrix.len());
    assert_eq!(payload["state_count"].as_u64(), Some(states.len() as u64));
    assert_eq!(
        payload["absorption"].as_array().map(Vec::len),
        Some(states.len() - 2)
    );
}

#[test]
fn clash_endpoint_rejects_malformed_json() {
    let response = route_request("POST", "/api/clash", "{not json");
    assert_eq!(response.status_code, 400);
    let payload: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(payload["status"], "error");
    assert!(payload["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[test]
fn clash_endpoint_lists_validation_errors() {
    let body = r#"{
        "p1": {"base_power": 6, "num_coins": 0, "coin_power": 4},
        "p2": {"base_power": 13, "num_coins": 3, "coin_power": 2, "sanity": -70}
    }"#;
    let response = route_request("POST", "/api/clash", body);
    assert_eq!(response.status_code, 400);

    let payload: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    let fields: Vec<&str> = payload["errors"]
        .as_array()
        .expect("errors should be an array")
        .iter()
        .filter_map(|issue| issue["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["p1.num_coins", "p2.sanity"]);
}

#[test]
fn clash_endpoint_reports_unresolvable_clash() {
    // Both sides always flip tails and roll the same power.
    let side = r#"{"base_power": 5, "num_coins": 2, "coin_power": 3, "sanity": -50}"#;
    let body = format!(r#"{{"p1": {side}, "p2": {side}}}"#);
    let response = route_request("POST", "/api/clash", &body);
    assert_eq!(response.status_code, 422);
    assert!(response.body.contains("singular"));
}

#[test]
fn matchup_endpoint_ranks_by_win_rate() {
    let body = r#"{
        "opponent": {"base_power": 8, "num_coins": 2, "coin_power": 3},
        "workers": 2,
        "skills": [
            {"id": "weak", "base_power": 3, "num_coins": 2, "coin_power": 2},
            {"id": "mid", "base_power": 8, "num_coins": 2, "coin_power": 3},
            {"id": "strong", "base_power": 12, "num_coins": 2, "coin_power": 4}
        ]
    }"#;
    let response = route_request("POST", "/api/matchup", body);
    assert_eq!(response.status_code, 200);

    let payload: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    let ids: Vec<&str> = payload["results"]
        .as_array()
        .expect("results should be an array")
        .iter()
        .filter_map(|row| row["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["strong", "mid", "weak"]);
    assert!(payload["failed"].as_array().unwrap().is_empty());
}

#[test]
fn matchup_endpoint_rejects_empty_skill_list() {
    let body = r#"{"opponent": {"base_power": 8, "num_coins": 2, "coin_power": 3}, "skills": []}"#;
    let response = route_request("POST", "/api/matchup", body);
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("expected at least one skill"));
}

#[test]
fn unknown_route_is_not_found() {
    let response = route_request("GET", "/api/officers", "");
    assert_eq!(response.status_code, 404);
}

#[test]
fn clash_endpoint_rejects_oversized_paralysis() {
    let side = r#"{"base_power": 5, "num_coins": 5, "coin_power": 2, "paralyze_count": 400}"#;
    let body = format!(r#"{{"p1": {side}, "p2": {side}}}"#);
    let response = route_request("POST", "/api/clash", &body);
    assert_eq!(response.status_code, 400);

    let payload: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    let issue = payload["errors"]
        .as_array()
        .expect("errors should be an array")
        .iter()
        .find(|issue| issue["field"] == "scenario")
        .expect("state-space error should be reported");
    assert!(issue["messages"][0].as_str().unwrap().contains("states"));
}

#[test]
fn server_reads_body_sent_after_headers() {
    let addr = spawn_server();
    let body = serde_json::json!({
        "p1": {"base_power": 6, "num_coins": 3, "coin_power": 4, "sanity": 40, "offense_level": 40},
        "p2": {"base_power": 13, "num_coins": 3, "coin_power": 2, "offense_level": 40}
    })
    .to_string();

    let mut stream = TcpStream::connect(addr).expect("should connect");
    let head = format!(
        "POST /api/clash HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).unwrap();
    stream.flush().unwrap();
    thread::sleep(Duration::from_millis(200));
    stream.write_all(body.as_bytes()).unwrap();
    stream.flush().unwrap();

    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.contains("\"win_rate\""));
}

#[test]
fn server_answers_expect_continue_before_body() {
    let addr = spawn_server();
    let body = r#"{"opponent": {"base_power": 8, "num_coins": 2, "coin_power": 3},
        "skills": [{"id": "s1", "base_power": 9, "num_coins": 2, "coin_power": 3}]}"#;

    let mut stream = TcpStream::connect(addr).expect("should connect");
    let head = format!(
        "POST /api/matchup HTTP/1.1\r\nHost: localhost\r\nExpect: 100-continue\r\nContent-Length: {}\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).unwrap();

    let mut interim = [0_u8; 25];
    stream.read_exact(&mut interim).unwrap();
    assert_eq!(&interim, b"HTTP/1.1 100 Continue\r\n\r\n");

    stream.write_all(body.as_bytes()).unwrap();
    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.contains("\"s1\""));
}

#[test]
fn server_refuses_oversized_body() {
    let addr = spawn_server();
    let mut stream = TcpStream::connect(addr).expect("should connect");
    let head = format!(
        "POST /api/clash HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n",
        MAX_BODY_BYTES + 1
    );
    stream.write_all(head.as_bytes()).unwrap();

    let response = read_response(&mut stream);
    assert!(response.starts_with("HTTP/1.1 413 Payload Too Large"), "{response}");
}
