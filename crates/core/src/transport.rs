//! Transport trait definition
//!
//! This trait is the only way requests leave the process. It decouples the
//! binding from any specific HTTP library: the default implementation lives
//! in `splunkd-transport`, and tests substitute a mock.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::http::{Request, Response};

/// A raw bidirectional stream to splunkd
pub trait Connection: Read + Write {}

impl<T: Read + Write> Connection for T {}

/// Trait for carrying a request to splunkd and bringing back the response
///
/// Implementations return every response, including 4xx/5xx ones, as `Ok`;
/// status checking happens in `HttpClient`. Errors are reserved for failures
/// to talk to the server at all.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Issue `request` against `url` (which includes any query string).
    fn handle(&self, url: &str, request: &Request) -> Result<Response>;

    /// Open a raw connection to `host:port`, e.g. for streaming event input.
    ///
    /// Such a connection is managed by the caller and is not covered by the
    /// autologin protocol.
    fn connect(&self, scheme: &str, _host: &str, _port: u16) -> Result<Box<dyn Connection>> {
        Err(Error::UnsupportedFeature(format!(
            "raw {scheme} connections are not offered by this transport"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ResponseReader;

    /// Implements only `handle`
    struct RequestsOnly;

    impl Transport for RequestsOnly {
        fn handle(&self, _url: &str, _request: &Request) -> Result<Response> {
            Ok(Response::new(200, "OK", Vec::new(), ResponseReader::empty()))
        }
    }

    #[test]
    fn test_raw_connections_unsupported_by_default() {
        match RequestsOnly.connect("https", "localhost", 8089) {
            Err(Error::UnsupportedFeature(msg)) => assert!(msg.contains("https")),
            Err(other) => panic!("expected unsupported feature, got {other:?}"),
            Ok(_) => panic!("expected unsupported feature, got a connection"),
        }
    }
}
