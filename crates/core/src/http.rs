//! Request and response descriptors
//!
//! These are the only shapes that cross the `Transport` boundary. A
//! transport receives a `Request` and hands back a `Response` whose body has
//! not been read yet; everything above the transport works with these types
//! and never with a concrete HTTP library.

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use crate::error::Error;

/// A header as sent or received: name and value, order preserved
pub type Header = (String, String);

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "PATCH" => Ok(Method::Patch),
            _ => Err(Error::InvalidArgument(format!("unsupported HTTP method: {s}"))),
        }
    }
}

/// An HTTP request described as plain data
///
/// The URL travels separately so the same descriptor can be reissued
/// against a freshly computed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Whether a header with this name is present (case-insensitive)
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

/// An HTTP response as returned by a transport
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<Header>,
    pub body: ResponseReader,
}

impl Response {
    pub fn new(
        status: u16,
        reason: impl Into<String>,
        headers: Vec<Header>,
        body: ResponseReader,
    ) -> Self {
        Self {
            status,
            reason: reason.into(),
            headers,
            body,
        }
    }

    /// First value of the named header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// A lazily-read response body
///
/// Wraps whatever stream the transport produced. `peek` looks ahead without
/// consuming: the next `read` returns the peeked bytes first.
pub struct ResponseReader {
    inner: Option<Box<dyn Read>>,
    buffer: Vec<u8>,
}

impl ResponseReader {
    pub fn new(inner: impl Read + 'static) -> Self {
        Self {
            inner: Some(Box::new(inner)),
            buffer: Vec::new(),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(io::Cursor::new(bytes.into()))
    }

    pub fn empty() -> Self {
        Self {
            inner: None,
            buffer: Vec::new(),
        }
    }

    /// Look at up to `size` upcoming bytes without consuming them.
    ///
    /// Fewer bytes are returned only when the stream ends first.
    pub fn peek(&mut self, size: usize) -> io::Result<&[u8]> {
        if let Some(inner) = self.inner.as_mut() {
            let mut chunk = [0u8; 8192];
            while self.buffer.len() < size {
                let want = (size - self.buffer.len()).min(chunk.len());
                let n = inner.read(&mut chunk[..want])?;
                if n == 0 {
                    break;
                }
                self.buffer.extend_from_slice(&chunk[..n]);
            }
        }
        let end = size.min(self.buffer.len());
        Ok(&self.buffer[..end])
    }

    /// Whether the stream has no more data
    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.peek(1)?.is_empty())
    }

    /// Read everything that is left.
    pub fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out)?;
        Ok(out)
    }

    /// Read everything that is left as text, replacing invalid UTF-8.
    pub fn read_text(&mut self) -> io::Result<String> {
        let bytes = self.read_all()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Drop the underlying stream; later reads see end of stream.
    pub fn close(&mut self) {
        self.inner = None;
        self.buffer.clear();
    }
}

impl Read for ResponseReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.buffer.is_empty() {
            let n = buf.len().min(self.buffer.len());
            buf[..n].copy_from_slice(&self.buffer[..n]);
            self.buffer.drain(..n);
            return Ok(n);
        }
        match self.inner.as_mut() {
            Some(inner) => inner.read(buf),
            None => Ok(0),
        }
    }
}

impl fmt::Debug for ResponseReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseReader")
            .field("open", &self.inner.is_some())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}
