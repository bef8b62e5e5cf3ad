//! Minimal blocking HTTP front for the query API. Every endpoint is a GET
//! over a short query path, so only the request line is read; headers and
//! bodies are ignored and each connection serves exactly one request.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};

pub mod api;
pub mod routes;

pub fn run_server(bind_addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    println!("grimoire server listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(err) = handle_connection(stream) {
                    eprintln!("request error: {err}");
                }
            }
            Err(err) => eprintln!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn handle_connection(mut stream: TcpStream) -> std::io::Result<()> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line)?;

    let response = match parse_request_line(&request_line) {
        Some((method, path)) => routes::route_request(method, path),
        None => routes::bad_request("malformed request line"),
    };
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()
}

/// `(method, path)` from an HTTP request line, or `None` when either part
/// is missing.
fn parse_request_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split_whitespace();
    Some((parts.next()?, parts.next()?))
}

#[cfg(test)]
mod tests {
    use super::parse_request_line;

    #[test]
    fn request_line_splits_into_method_and_path() {
        assert_eq!(
            parse_request_line("GET /api/health HTTP/1.1\r\n"),
            Some(("GET", "/api/health"))
        );
    }

    #[test]
    fn empty_or_truncated_request_lines_are_rejected() {
        assert_eq!(parse_request_line(""), None);
        assert_eq!(parse_request_line("GET"), None);
    }
}
