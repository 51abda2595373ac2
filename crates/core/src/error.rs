//! Error types for splunkd-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::http::{Header, Response};
use crate::xml;

/// Result type alias for splunkd-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for splunkd-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Login rejected, not logged in, or autologin exhausted its retry
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The server answered with a 4xx/5xx status
    #[error(transparent)]
    Http(Box<HttpError>),

    /// Malformed sharing mode, header, scheme, or similar caller input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level failure: refused connection, DNS, TLS handshake
    #[error("Network error: {0}")]
    Network(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered successfully but not in the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Operation not offered by the configured transport
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),
}

impl Error {
    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(e) => Some(e.status),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) | Error::Config(_) | Error::InvalidUrl(_) => 2, // UsageError
            Error::Network(_) | Error::Io(_) => 3, // NetworkError
            Error::Authentication(_) => 4,         // AuthError
            Error::ProfileNotFound(_) => 5,        // NotFound
            Error::UnsupportedFeature(_) => 7,     // UnsupportedFeature
            Error::Http(e) => match e.status {
                401 | 403 => 4,
                404 => 5,
                409 => 6,
                502..=504 => 3,
                _ => 1,
            },
            _ => 1, // GeneralError
        }
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        Error::Http(Box::new(err))
    }
}

/// A response with status >= 400, with its body fully drained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
    /// Text of the first `messages/msg` element of an XML body
    pub detail: Option<String>,
}

impl HttpError {
    /// Drain the response body and pick out the server's message, if any.
    pub fn from_response(mut response: Response) -> Result<Self> {
        let body = response.body.read_all()?;
        let detail = xml::find_text(&body, &["messages", "msg"]).filter(|d| !d.is_empty());
        Ok(Self {
            status: response.status,
            reason: response.reason,
            headers: response.headers,
            body,
            detail,
        })
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} {}", self.status, self.reason)?;
        if let Some(detail) = &self.detail {
            write!(f, " -- {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for HttpError {}
