//! Minimal HTTP/1.1 request reader for the blocking server. Reads the header
//! block, then exactly `Content-Length` body bytes, however the client splits
//! its writes.

use std::io::{Read, Write};

use thiserror::Error;

pub const MAX_HEADER_BYTES: usize = 16 * 1024;
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed before the request was complete")]
    Incomplete,

    #[error("request headers exceed {} bytes", MAX_HEADER_BYTES)]
    HeadersTooLarge,

    #[error("invalid Content-Length '{0}'")]
    InvalidContentLength(String),

    #[error("request body of {length} bytes exceeds the {limit}-byte limit")]
    BodyTooLarge { length: usize, limit: usize },
}

/// Offset where the header block ends and the length of its terminator.
fn header_end(buffer: &[u8]) -> Option<(usize, usize)> {
    if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
        return Some((pos, 4));
    }
    buffer.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2))
}

struct RequestHead {
    method: String,
    path: String,
    content_length: Option<usize>,
    expects_continue: bool,
}

fn parse_head(head: &str) -> Result<RequestHead, RequestError> {
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET").to_string();
    let path = request_parts.next().unwrap_or("/").to_string();

    let mut content_length = None;
    let mut expects_continue = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.eq_ignore_ascii_case("content-length") {
            let length = value
                .parse::<usize>()
                .map_err(|_| RequestError::InvalidContentLength(value.to_string()))?;
            content_length = Some(length);
        } else if name.eq_ignore_ascii_case("expect") && value.eq_ignore_ascii_case("100-continue") {
            expects_continue = true;
        }
    }

    Ok(RequestHead {
        method,
        path,
        content_length,
        expects_continue,
    })
}

/// Read one request from `stream`. `Ok(None)` means the peer closed the
/// connection without sending anything.
pub fn read_request<S: Read + Write>(stream: &mut S) -> Result<Option<HttpRequest>, RequestError> {
    let mut buffer = Vec::with_capacity(4096);
    let mut chunk = [0_u8; 4096];

    let (head_len, terminator) = loop {
        if let Some(end) = header_end(&buffer) {
            break end;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(RequestError::HeadersTooLarge);
        }
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            return Err(RequestError::Incomplete);
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
    };

    let head = parse_head(&String::from_utf8_lossy(&buffer[..head_len]))?;
    let mut body = buffer.split_off(head_len + terminator);

    // Without a length, keep whatever arrived alongside the headers.
    if let Some(length) = head.content_length {
        if length > MAX_BODY_BYTES {
            return Err(RequestError::BodyTooLarge {
                length,
                limit: MAX_BODY_BYTES,
            });
        }
        if body.len() < length && head.expects_continue {
            stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n")?;
            stream.flush()?;
        }
        while body.len() < length {
            let bytes_read = stream.read(&mut chunk)?;
            if bytes_read == 0 {
                return Err(RequestError::Incomplete);
            }
            body.extend_from_slice(&chunk[..bytes_read]);
        }
        body.truncate(length);
    }

    Ok(Some(HttpRequest {
        method: head.method,
        path: head.path,
        body: String::from_utf8_lossy(&body).into_owned(),
    }))
}
