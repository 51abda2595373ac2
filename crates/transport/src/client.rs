//! ureq-backed `Transport`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rustls::ClientConfig;
use splunkd_core::{
    Connection, ContextConfig, Error, Header, Method, Request, Response, ResponseReader, Result,
    Transport,
};
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, RequestBuilder};
use url::Url;

use crate::stream::Stream;
use crate::tls::{self, ClientIdentity};

const USER_AGENT: &str = concat!("splunkd-rs/", env!("CARGO_PKG_VERSION"));

/// Settings that shape how requests reach the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// PEM private key; defaults to `cert_file`
    pub key_file: Option<PathBuf>,
    /// PEM client certificate chain
    pub cert_file: Option<PathBuf>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Verify the server certificate
    pub verify: bool,
}

impl From<&ContextConfig> for TransportOptions {
    fn from(config: &ContextConfig) -> Self {
        Self {
            key_file: config.key_file.clone(),
            cert_file: config.cert_file.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            verify: config.verify,
        }
    }
}

/// Default transport: HTTP/1.1 through a `ureq::Agent`
///
/// Each `handle` call is exactly one round trip: redirects are returned, not
/// followed. `Response::reason` is the canonical phrase for the status code
/// (ureq does not expose the phrase the server sent), so nonstandard codes
/// come back with an empty reason.
pub struct UreqTransport {
    agent: Agent,
    tls: Arc<ClientConfig>,
    timeout: Option<Duration>,
}

impl UreqTransport {
    /// Build the agent, reading any client certificate from disk.
    pub fn new(options: TransportOptions) -> Result<Self> {
        let identity =
            ClientIdentity::load(options.cert_file.as_deref(), options.key_file.as_deref())?;

        let client_cert = identity.as_ref().map(ClientIdentity::ureq_cert).transpose()?;
        let tls_config = ureq::tls::TlsConfig::builder()
            .client_cert(client_cert)
            .disable_verification(!options.verify)
            .build();

        // 3xx answers go back to the caller unfollowed.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .max_redirects_will_error(false)
            .timeout_global(options.timeout)
            .tls_config(tls_config)
            .build()
            .new_agent();

        Ok(Self {
            agent,
            tls: tls::client_config(identity.as_ref(), options.verify)?,
            timeout: options.timeout,
        })
    }
}

impl Transport for UreqTransport {
    fn handle(&self, url: &str, request: &Request) -> Result<Response> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidArgument(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let mut headers = request.headers.clone();
        if !request.has_header("User-Agent") {
            headers.push(("User-Agent".to_string(), USER_AGENT.to_string()));
        }
        if !request.has_header("Accept") {
            headers.push(("Accept".to_string(), "*/*".to_string()));
        }

        let body = request.body.as_slice();
        let result = match request.method {
            Method::Get => send_without_body(self.agent.get(url), &headers, body),
            Method::Head => send_without_body(self.agent.head(url), &headers, body),
            Method::Delete => send_without_body(self.agent.delete(url), &headers, body),
            Method::Post => send_with_body(self.agent.post(url), &headers, body),
            Method::Put => send_with_body(self.agent.put(url), &headers, body),
            Method::Patch => send_with_body(self.agent.patch(url), &headers, body),
        };
        let response = result.map_err(|e| Error::Network(e.to_string()))?;

        Ok(into_response(response))
    }

    fn connect(&self, scheme: &str, host: &str, port: u16) -> Result<Box<dyn Connection>> {
        let tls = match scheme {
            "https" => Some(self.tls.clone()),
            "http" => None,
            other => {
                return Err(Error::InvalidArgument(format!("unsupported scheme: {other}")));
            }
        };
        let stream = Stream::open(host, port, self.timeout, tls)?;
        Ok(Box::new(stream))
    }
}

fn send_without_body(
    mut builder: RequestBuilder<WithoutBody>,
    headers: &[Header],
    body: &[u8],
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if body.is_empty() {
        builder.call()
    } else {
        builder.force_send_body().send(body)
    }
}

fn send_with_body(
    mut builder: RequestBuilder<WithBody>,
    headers: &[Header],
    body: &[u8],
) -> std::result::Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.send(body)
}

fn into_response(response: ureq::http::Response<ureq::Body>) -> Response {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let body = ResponseReader::new(response.into_body().into_reader());
    Response::new(status.as_u16(), reason, headers, body)
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::thread::{self, JoinHandle};

    use super::*;

    /// What the loopback server saw: request head (lowercased) and body
    type Seen = (String, Vec<u8>);

    /// Read one request off `reader`: its head (lowercased) and body.
    fn read_request(reader: &mut impl BufRead) -> Seen {
        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            head.push_str(&lower);
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        (head, body)
    }

    /// Serve one request on a loopback port, answering with `reply`.
    fn serve_once(status_line: &'static str, reply: &'static str) -> (SocketAddr, JoinHandle<Seen>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (socket, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(socket.try_clone().unwrap());
            let seen = read_request(&mut reader);

            let mut socket = socket;
            write!(
                socket,
                "HTTP/1.1 {status_line}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            )
            .unwrap();
            socket.flush().unwrap();
            seen
        });

        (addr, handle)
    }

    fn transport() -> UreqTransport {
        UreqTransport::new(TransportOptions::default()).unwrap()
    }

    #[test]
    fn test_get_round_trip() {
        let (addr, server) = serve_once("200 OK", "<response>ok</response>");
        let url = format!("http://{addr}/services/server/info?count=1");

        let mut response = transport().handle(&url, &Request::new(Method::Get)).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.reason, "OK");
        assert_eq!(response.header("Content-Type"), Some("text/xml"));
        assert_eq!(response.body.read_text().unwrap(), "<response>ok</response>");

        let (head, body) = server.join().unwrap();
        assert!(head.starts_with("get /services/server/info?count=1 http/1.1"));
        assert!(head.contains("user-agent: splunkd-rs/"));
        assert!(head.contains("accept: */*"));
        assert!(body.is_empty());
    }

    #[test]
    fn test_error_status_is_returned_as_response() {
        let (addr, server) = serve_once("404 Not Found", "<response/>");
        let url = format!("http://{addr}/services/nope");

        let response = transport().handle(&url, &Request::new(Method::Get)).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.reason, "Not Found");
        server.join().unwrap();
    }

    #[test]
    fn test_redirect_is_returned_not_followed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(socket.try_clone().unwrap());
            let (head, _) = read_request(&mut reader);
            write!(
                socket,
                "HTTP/1.1 303 See Other\r\nLocation: /services/other\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            )
            .unwrap();
            socket.flush().unwrap();
            drop(reader);
            drop(socket);

            // A followed redirect would connect again within this window.
            listener.set_nonblocking(true).unwrap();
            thread::sleep(Duration::from_millis(300));
            let connections = 1 + usize::from(listener.accept().is_ok());
            (head, connections)
        });

        let url = format!("http://{addr}/services/saved/searches");
        let request = Request::new(Method::Get).header("Authorization", "Splunk abc");
        let response = transport().handle(&url, &request).unwrap();
        assert_eq!(response.status, 303);
        assert_eq!(response.header("Location"), Some("/services/other"));

        let (head, connections) = server.join().unwrap();
        assert!(head.contains("authorization: splunk abc"));
        assert_eq!(connections, 1);
    }

    #[test]
    fn test_post_sends_body_and_headers() {
        let (addr, server) = serve_once("201 Created", "");
        let url = format!("http://{addr}/services/saved/searches");
        let request = Request::new(Method::Post)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Authorization", "Splunk abc")
            .header("User-Agent", "custom/1.0")
            .body("name=test&search=search+*");

        let response = transport().handle(&url, &request).unwrap();
        assert_eq!(response.status, 201);

        let (head, body) = server.join().unwrap();
        assert!(head.starts_with("post /services/saved/searches http/1.1"));
        assert!(head.contains("authorization: splunk abc"));
        assert!(head.contains("user-agent: custom/1.0"));
        assert!(!head.contains("splunkd-rs/"));
        assert_eq!(body, b"name=test&search=search+*");
    }

    #[test]
    fn test_unsupported_url_scheme() {
        let result = transport().handle("ftp://localhost/x", &Request::new(Method::Get));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = transport().handle("not a url", &Request::new(Method::Get));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_refused_connection_is_network_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let url = format!("http://{addr}/services");

        let result = transport().handle(&url, &Request::new(Method::Get));
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[test]
    fn test_raw_plain_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            socket.read_exact(&mut buf).unwrap();
            socket.write_all(&buf).unwrap();
        });

        let mut connection = transport()
            .connect("http", &addr.ip().to_string(), addr.port())
            .unwrap();
        connection.write_all(b"hello").unwrap();
        connection.flush().unwrap();
        let mut echoed = [0u8; 5];
        connection.read_exact(&mut echoed).unwrap();
        assert_eq!(&echoed, b"hello");
        server.join().unwrap();
    }

    #[test]
    fn test_raw_connection_rejects_unknown_scheme() {
        let result = transport().connect("gopher", "localhost", 70);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_options_from_context_config() {
        let config = ContextConfig {
            cert_file: Some(PathBuf::from("client.pem")),
            timeout_secs: Some(30),
            verify: true,
            ..ContextConfig::default()
        };
        let options = TransportOptions::from(&config);
        assert_eq!(options.cert_file, Some(PathBuf::from("client.pem")));
        assert!(options.key_file.is_none());
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert!(options.verify);
    }

    #[test]
    fn test_key_without_certificate_is_rejected() {
        let options = TransportOptions {
            key_file: Some(PathBuf::from("client.key")),
            ..TransportOptions::default()
        };
        assert!(matches!(UreqTransport::new(options), Err(Error::InvalidArgument(_))));
    }
}
