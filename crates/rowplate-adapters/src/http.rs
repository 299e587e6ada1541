//! HTTP transport backed by the blocking reqwest client.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use tracing::{debug, instrument};

use rowplate_core::{
    application::{ApplicationError, ports::HttpTransport},
    domain::{Request, Response},
    error::{RowplateError, RowplateResult},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client settings for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Connect and read timeout for one request.
    pub timeout: Duration,
    /// Proxy for every scheme, e.g. `http://proxy.local:3128`.
    pub proxy: Option<String>,
    /// Accept invalid TLS certificates.
    pub insecure: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            insecure: false,
        }
    }
}

/// Sends requests one at a time; redirects are not followed so the log
/// shows exactly what the server answered.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> RowplateResult<Self> {
        let mut builder = Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(options.insecure);
        if let Some(proxy) = &options.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
                RowplateError::Configuration {
                    message: format!("invalid proxy '{proxy}': {e}"),
                }
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(transport_error)?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(skip_all, fields(method = %request.method, uri = %request.uri))]
    fn execute(&self, request: &Request) -> RowplateResult<Response> {
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(transport_error)?;

        let mut builder = self.client.request(method, request.uri.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().map_err(transport_error)?;
        let status = response.status();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().map_err(transport_error)?;

        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(Response {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn transport_error(e: impl std::fmt::Display) -> RowplateError {
    ApplicationError::Transport {
        reason: e.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use rowplate_core::domain::HttpMethod;
    use url::Url;

    use super::*;

    /// Serves one canned response and returns the raw request it received.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
                head.push_str(&line);
                if line == "\r\n" {
                    break;
                }
            }
            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
            head + &String::from_utf8(body).unwrap()
        });
        (format!("http://{addr}/items"), handle)
    }

    fn request(uri: &str) -> Request {
        Request {
            method: HttpMethod::Post,
            uri: Url::parse(uri).unwrap(),
            headers: BTreeMap::from([("X-Test".to_string(), "yes".to_string())]),
            body: "{\"a\":1}".into(),
        }
    }

    #[test]
    fn sends_headers_and_body() {
        let (uri, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Length: 2\r\nX-Reply: ok\r\nConnection: close\r\n\r\nhi",
        );
        let transport = ReqwestTransport::new(&TransportOptions::default()).unwrap();
        let response = transport.execute(&request(&uri)).unwrap();

        assert_eq!(response.status_line(), "201 Created");
        assert_eq!(response.body, "hi");
        assert_eq!(response.headers.get("x-reply").map(String::as_str), Some("ok"));

        let raw = server.join().unwrap();
        assert!(raw.starts_with("POST /items HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("x-test: yes"));
        assert!(raw.ends_with("{\"a\":1}"));
    }

    #[test]
    fn error_status_is_still_a_response() {
        let (uri, server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let transport = ReqwestTransport::new(&TransportOptions::default()).unwrap();
        let response = transport.execute(&request(&uri)).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.status, 503);
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = ReqwestTransport::new(&TransportOptions::default()).unwrap();
        let err = transport
            .execute(&request(&format!("http://127.0.0.1:{port}/")))
            .unwrap_err();
        assert!(matches!(
            err,
            RowplateError::Application(ApplicationError::Transport { .. })
        ));
    }

    #[test]
    fn invalid_proxy_is_a_configuration_error() {
        let options = TransportOptions {
            proxy: Some("http://[::1".into()),
            ..TransportOptions::default()
        };
        assert!(matches!(
            ReqwestTransport::new(&options),
            Err(RowplateError::Configuration { .. })
        ));
    }
}
