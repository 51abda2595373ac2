//! HttpClient: GET/POST/DELETE over a `Transport`
//!
//! Builds query strings and form bodies, hands requests to the transport,
//! reports each round trip to the observer, and turns every status >= 400
//! into `Error::Http`. This is the single place that looks at status codes.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::encoding::UrlEncoded;
use crate::error::{Error, HttpError, Result};
use crate::http::{Header, Method, Request, Response};
use crate::observer::{RequestEvent, RequestObserver, TracingObserver};
use crate::params::Params;
use crate::transport::Transport;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Convenience methods for the HTTP verbs splunkd uses
pub struct HttpClient {
    transport: Box<dyn Transport>,
    observer: Arc<dyn RequestObserver>,
}

impl HttpClient {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the request observer
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn set_observer(&mut self, observer: Arc<dyn RequestObserver>) {
        self.observer = observer;
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Issue a GET; `params` go into the query string.
    pub fn get(&self, url: &UrlEncoded, headers: &[Header], params: &Params) -> Result<Response> {
        reject_body(Method::Get, params)?;
        let request = Request {
            method: Method::Get,
            headers: headers.to_vec(),
            body: Vec::new(),
        };
        self.request(&with_query(url, params), request)
    }

    /// Issue a DELETE; `params` go into the query string.
    pub fn delete(&self, url: &UrlEncoded, headers: &[Header], params: &Params) -> Result<Response> {
        reject_body(Method::Delete, params)?;
        let request = Request {
            method: Method::Delete,
            headers: headers.to_vec(),
            body: Vec::new(),
        };
        self.request(&with_query(url, params), request)
    }

    /// Issue a POST.
    ///
    /// When `params` carries a body, it is sent verbatim and the arguments go
    /// into the query string (endpoints such as `receivers/simple` want raw
    /// data in the body and metadata in the URL). Otherwise the arguments
    /// are form-encoded into the body.
    pub fn post(&self, url: &UrlEncoded, headers: &[Header], params: &Params) -> Result<Response> {
        let mut headers = headers.to_vec();
        if !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("content-type")) {
            headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
        }

        let (url, body) = match params.body_bytes() {
            Some(body) => (with_query(url, params), body.to_vec()),
            None => (url.clone(), params.encode().into_bytes()),
        };

        let request = Request {
            method: Method::Post,
            headers,
            body,
        };
        self.request(&url, request)
    }

    /// Issue an arbitrary request against `url`.
    pub fn request(&self, url: &UrlEncoded, request: Request) -> Result<Response> {
        validate_headers(&request.headers)?;

        let started = Instant::now();
        let result = self.transport.handle(url.as_str(), &request);
        self.observer.observe(&RequestEvent {
            method: request.method,
            url: url.as_str(),
            status: result.as_ref().ok().map(|r| r.status),
            elapsed: started.elapsed(),
        });

        let response = result?;
        if response.is_error() {
            return Err(HttpError::from_response(response)?.into());
        }
        Ok(response)
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

fn with_query(url: &UrlEncoded, params: &Params) -> UrlEncoded {
    if params.is_empty() {
        return url.clone();
    }
    url.clone() + UrlEncoded::skip_encode(format!("?{}", params.encode()))
}

fn reject_body(method: Method, params: &Params) -> Result<()> {
    if params.has_body() {
        return Err(Error::InvalidArgument(format!(
            "{method} requests do not take a body"
        )));
    }
    Ok(())
}

fn validate_headers(headers: &[Header]) -> Result<()> {
    for (name, value) in headers {
        let valid_name = !name.is_empty()
            && name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
        if !valid_name {
            return Err(Error::InvalidArgument(format!("invalid header name: {name:?}")));
        }
        if value.contains(['\r', '\n']) {
            return Err(Error::InvalidArgument(format!(
                "header {name} contains a line break"
            )));
        }
    }
    Ok(())
}
