//! Blocking HTTP seam used for description fetches and SOAP calls.
//!
//! [`UreqTransport`] builds a fresh agent per request, so no connection is
//! reused between calls and every request is bounded by its own timeout.

use std::io;
use std::time::Duration;

use tracing::trace;
use ureq::Agent;

use crate::errors::ControlError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ControlError>;

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, ControlError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    // 4xx/5xx must not become errors: the status is the command outcome and
    // fault bodies are still read for diagnostics.
    fn agent(timeout: Duration) -> Agent {
        Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into()
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, ControlError> {
        trace!("GET {}", url);
        let mut response = Self::agent(timeout)
            .get(url)
            .call()
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| classify_error(url, e))?;

        Ok(HttpResponse { status, body })
    }

    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, ControlError> {
        trace!("POST {}", url);
        let mut request = Self::agent(timeout).post(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let mut response = request
            .send(body.to_string())
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| classify_error(url, e))?;

        Ok(HttpResponse { status, body })
    }
}

fn classify_error(url: &str, err: ureq::Error) -> ControlError {
    match err {
        ureq::Error::Timeout(_) => ControlError::Timeout(url.to_string()),
        ureq::Error::HostNotFound => ControlError::HostNotFound(url.to_string()),
        ureq::Error::ConnectionFailed => ControlError::ConnectionRefused(url.to_string()),
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
            ControlError::ConnectionRefused(url.to_string())
        }
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => {
            ControlError::Timeout(url.to_string())
        }
        other => ControlError::Transport(format!("{}: {}", url, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serves a single canned response and hands back the raw request.
    fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (base, handle)
    }

    #[test]
    fn get_returns_status_and_body() {
        let (base, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 45\r\nConnection: close\r\n\r\n<root><friendlyName>Den</friendlyName></root>",
        );

        let response = UreqTransport
            .get(&format!("{}/xml/device_description.xml", base), Duration::from_secs(5))
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<root><friendlyName>Den</friendlyName></root>");
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /xml/device_description.xml HTTP/1.1"));
    }

    #[test]
    fn post_sends_headers_and_keeps_error_status() {
        let (base, server) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 5\r\nConnection: close\r\n\r\nfault",
        );

        let response = UreqTransport
            .post(
                &format!("{}/MediaRenderer/AVTransport/Control", base),
                &[("Content-Type", "text/xml; charset=utf-8")],
                "<body/>",
                Duration::from_secs(5),
            )
            .unwrap();

        assert_eq!(response.status, 500);
        assert_eq!(response.body, "fault");
        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("post /mediarenderer/avtransport/control http/1.1"));
        assert!(request.contains("content-type: text/xml; charset=utf-8"));
        assert!(request.ends_with("<body/>"));
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }

    #[test]
    fn refused_connection_is_an_error() {
        // Bind then drop to get a local port with no listener.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/xml/device_description.xml", port);

        let result = UreqTransport.get(&url, Duration::from_secs(2));
        assert!(result.is_err());
    }
}
