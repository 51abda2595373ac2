//! Session context: a splunkd endpoint plus the credentials to talk to it
//!
//! A `Context` turns path segments into URLs, attaches the session token to
//! every request, and runs the autologin protocol: log in before the first
//! request when no token is held, and log in again (once) when the server
//! reports the session as expired.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::client::HttpClient;
use crate::config::ContextConfig;
use crate::encoding::UrlEncoded;
use crate::error::{Error, Result};
use crate::http::{Header, Request, Response};
use crate::namespace::{render_path, Namespace, Segment};
use crate::observer::RequestObserver;
use crate::params::Params;
use crate::transport::{Connection, Transport};
use crate::xml;

/// Endpoint that trades a username and password for a session key
pub const LOGIN_PATH: &str = "/services/auth/login";

const UNAUTHORIZED: u16 = 401;

/// URL scheme of a splunkd endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(Error::InvalidArgument(format!("unsupported scheme: {s}"))),
        }
    }
}

/// Session token held by a `Context`
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Token {
    #[default]
    NoToken,
    /// Value sent in the `Authorization` header, usually `Splunk <key>`
    Session(String),
}

impl Token {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::NoToken => None,
            Token::Session(token) => Some(token),
        }
    }

    pub fn is_some(&self) -> bool {
        matches!(self, Token::Session(_))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::NoToken => f.write_str("NoToken"),
            Token::Session(_) => f.write_str("Session(<redacted>)"),
        }
    }
}

/// `scheme://host:port`, with IPv6 literals bracketed
pub fn authority(scheme: Scheme, host: &str, port: u16) -> UrlEncoded {
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_string()
    };
    UrlEncoded::skip_encode(format!("{scheme}://{host}:{port}"))
}

/// An authenticated (or authenticatable) connection to one splunkd instance
///
/// Request methods take `&mut self`: the autologin protocol may replace the
/// token in the middle of a call.
pub struct Context {
    http: HttpClient,
    scheme: Scheme,
    host: String,
    port: u16,
    authority: UrlEncoded,
    namespace: Namespace,
    username: String,
    password: String,
    token: Token,
    autologin: bool,
}

impl Context {
    /// Build a context from settings; no network activity.
    pub fn new(config: ContextConfig, transport: Box<dyn Transport>) -> Result<Self> {
        let scheme: Scheme = config.scheme.parse()?;
        let namespace = Namespace::resolve(
            config.sharing.as_deref(),
            config.owner.as_deref(),
            config.app.as_deref(),
        )?;
        let token = config
            .token
            .filter(|t| !t.is_empty())
            .map(Token::Session)
            .unwrap_or_default();

        Ok(Self {
            http: HttpClient::new(transport),
            scheme,
            authority: authority(scheme, &config.host, config.port),
            host: config.host,
            port: config.port,
            namespace,
            username: config.username.unwrap_or_default(),
            password: config.password.unwrap_or_default(),
            token,
            autologin: config.autologin,
        })
    }

    /// Report round trips to `observer` instead of the tracing default
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.http.set_observer(observer);
        self
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn authority(&self) -> &UrlEncoded {
        &self.authority
    }

    /// Default namespace for relative paths
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn autologin(&self) -> bool {
        self.autologin
    }

    pub fn set_autologin(&mut self, autologin: bool) {
        self.autologin = autologin;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Both a username and a password are configured
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    /// Log in and store the session token.
    ///
    /// Does nothing when a token was supplied and no credentials were: such
    /// a context is already as logged in as it can be. Makes one round trip
    /// otherwise.
    pub fn login(&mut self) -> Result<&mut Self> {
        if self.token.is_some() && self.username.is_empty() && self.password.is_empty() {
            return Ok(self);
        }

        let url = self.authority.clone() + UrlEncoded::skip_encode(LOGIN_PATH);
        let params = Params::new()
            .arg("username", &self.username)
            .arg("password", &self.password);

        tracing::debug!(host = %self.host, username = %self.username, "logging in");
        let mut response = match self.http.post(&url, &[], &params) {
            Ok(response) => response,
            Err(Error::Http(e)) if e.status == UNAUTHORIZED => {
                return Err(Error::Authentication("Login failed.".into()));
            }
            Err(e) => return Err(e),
        };

        let body = response.body.read_all()?;
        let key = xml::find_text(&body, &["sessionKey"])
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::InvalidResponse("login response carries no sessionKey".into())
            })?;

        self.token = Token::Session(format!("Splunk {key}"));
        Ok(self)
    }

    /// Forget the session token; no network activity.
    pub fn logout(&mut self) -> &mut Self {
        self.token = Token::NoToken;
        self
    }

    /// Qualify `segment` into an absolute path.
    ///
    /// A namespace given here replaces the context's default as a whole;
    /// `None` or an empty namespace keeps the default.
    pub fn abspath<'a>(
        &self,
        segment: impl Into<Segment<'a>>,
        namespace: Option<&Namespace>,
    ) -> UrlEncoded {
        let namespace = match namespace {
            Some(ns) if !ns.is_unset() => ns,
            _ => &self.namespace,
        };
        render_path(segment.into(), namespace)
    }

    /// Full URL for `segment`
    pub fn url<'a>(&self, segment: impl Into<Segment<'a>>, namespace: Option<&Namespace>) -> UrlEncoded {
        self.authority.clone() + self.abspath(segment, namespace)
    }

    /// GET a resource; `params` go into the query string.
    pub fn get<'a>(
        &mut self,
        path: impl Into<Segment<'a>>,
        namespace: Option<&Namespace>,
        params: &Params,
    ) -> Result<Response> {
        let path = path.into();
        self.with_authentication(|ctx| {
            let url = ctx.url(path, namespace);
            tracing::debug!(url = %url, "GET request");
            ctx.http.get(&url, &ctx.auth_headers(), params)
        })
    }

    /// POST to a resource; `params` are form-encoded unless a body is set.
    pub fn post<'a>(
        &mut self,
        path: impl Into<Segment<'a>>,
        namespace: Option<&Namespace>,
        headers: &[Header],
        params: &Params,
    ) -> Result<Response> {
        let path = path.into();
        self.with_authentication(|ctx| {
            let url = ctx.url(path, namespace);
            tracing::debug!(url = %url, "POST request");
            let mut all_headers = headers.to_vec();
            all_headers.extend(ctx.auth_headers());
            ctx.http.post(&url, &all_headers, params)
        })
    }

    /// DELETE a resource; `params` go into the query string.
    pub fn delete<'a>(
        &mut self,
        path: impl Into<Segment<'a>>,
        namespace: Option<&Namespace>,
        params: &Params,
    ) -> Result<Response> {
        let path = path.into();
        self.with_authentication(|ctx| {
            let url = ctx.url(path, namespace);
            tracing::debug!(url = %url, "DELETE request");
            ctx.http.delete(&url, &ctx.auth_headers(), params)
        })
    }

    /// Issue an arbitrary request; the auth header is appended to its headers.
    pub fn request<'a>(
        &mut self,
        path: impl Into<Segment<'a>>,
        namespace: Option<&Namespace>,
        request: Request,
    ) -> Result<Response> {
        let path = path.into();
        self.with_authentication(|ctx| {
            let url = ctx.url(path, namespace);
            tracing::debug!(url = %url, method = %request.method, "request");
            let mut request = request.clone();
            request.headers.extend(ctx.auth_headers());
            ctx.http.request(&url, request)
        })
    }

    /// Open a raw stream to the server, e.g. for bulk event input.
    ///
    /// The caller writes the HTTP preamble (including the auth header from
    /// [`Context::token`]); the stream is outside the autologin protocol.
    pub fn connect(&self) -> Result<Box<dyn Connection>> {
        self.http
            .transport()
            .connect(self.scheme.as_str(), &self.host, self.port)
    }

    fn auth_headers(&self) -> Vec<Header> {
        match &self.token {
            Token::NoToken => Vec::new(),
            Token::Session(token) if token.starts_with("Splunk") => {
                vec![("Authorization".to_string(), token.clone())]
            }
            Token::Session(token) => {
                vec![("Authorization".to_string(), format!("Splunk {token}"))]
            }
        }
    }

    /// Run `op` logged in, re-authenticating at most once.
    fn with_authentication<F>(&mut self, op: F) -> Result<Response>
    where
        F: Fn(&Self) -> Result<Response>,
    {
        if !self.is_authenticated() {
            if !(self.autologin && self.has_credentials()) {
                return Err(Error::Authentication("Request aborted: not logged in.".into()));
            }
            tracing::info!(host = %self.host, "not logged in, logging in automatically");
            self.login()?;
        }

        match op(self) {
            Err(Error::Http(e)) if e.status == UNAUTHORIZED => {
                if !self.autologin {
                    return Err(Error::Authentication(
                        "Request failed: session is not logged in.".into(),
                    ));
                }

                tracing::info!(host = %self.host, "session rejected, logging in again");
                match self.login() {
                    Ok(_) => {}
                    Err(Error::Authentication(_)) => {
                        return Err(Error::Authentication("Autologin failed.".into()));
                    }
                    Err(e) => return Err(e),
                }

                match op(self) {
                    Err(Error::Http(e)) if e.status == UNAUTHORIZED => Err(Error::Authentication(
                        "Autologin succeeded, but there was an auth error on next request.".into(),
                    )),
                    other => other,
                }
            }
            other => other,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("authority", &self.authority)
            .field("namespace", &self.namespace)
            .field("username", &self.username)
            .field("token", &self.token)
            .field("autologin", &self.autologin)
            .finish_non_exhaustive()
    }
}

/// Build a context and log in (one round trip).
pub fn connect(config: ContextConfig, transport: Box<dyn Transport>) -> Result<Context> {
    let mut context = Context::new(config, transport)?;
    context.login()?;
    Ok(context)
}
