use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use tracing::{debug, info, warn};

pub mod api;
pub mod request;
pub mod routes;

use request::{read_request, RequestError};

/// A stalled client is dropped after this long without sending data.
const READ_TIMEOUT: Duration = Duration::from_secs(10);

pub fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!("limbus-clash server listening on http://{bind_addr}");
    serve(listener)
}

/// Handle connections on an already bound listener, one at a time.
pub fn serve(listener: TcpListener) -> std::io::Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream) {
                    warn!(error = %err, "request error");
                }
            }
            Err(err) => warn!(error = %err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &mut TcpStream) -> std::io::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;

    let response = match read_request(stream) {
        Ok(Some(request)) => {
            let response = routes::route_request(&request.method, &request.path, &request.body);
            debug!(
                method = %request.method,
                path = %request.path,
                body_bytes = request.body.len(),
                status = response.status_code,
                "handled request"
            );
            response
        }
        Ok(None) => return Ok(()),
        Err(RequestError::Io(err)) => return Err(err),
        Err(err) => {
            debug!(error = %err, "rejected malformed request");
            routes::request_error_response(&err)
        }
    };

    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}
