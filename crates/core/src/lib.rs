//! splunkd-core: Core binding layer for the splunkd REST API
//!
//! This crate provides the wire-level plumbing every splunkd request goes
//! through, including:
//! - URL encoding that never encodes twice (`UrlEncoded`)
//! - Namespace resolution and path rendering
//! - Request/response descriptors and the `Transport` boundary
//! - `HttpClient`, the single place HTTP status codes are checked
//! - `Context`, which owns the session token and the autologin protocol
//! - Configuration and profile management
//!
//! This crate never opens a socket itself. The default network stack lives
//! in `splunkd-transport`; tests and alternate stacks plug in their own
//! `Transport`.

pub mod client;
pub mod config;
pub mod context;
pub mod encoding;
pub mod error;
pub mod http;
pub mod namespace;
pub mod observer;
pub mod params;
pub mod profile;
pub mod transport;

mod xml;

pub use client::HttpClient;
pub use config::{Config, ConfigManager, ContextConfig};
pub use context::{authority, connect, Context, Scheme, Token, LOGIN_PATH};
pub use encoding::UrlEncoded;
pub use error::{Error, HttpError, Result};
pub use http::{Header, Method, Request, Response, ResponseReader};
pub use namespace::{render_path, Namespace, Segment, Sharing};
pub use observer::{RequestEvent, RequestObserver, TracingObserver};
pub use params::{ParamValue, Params};
pub use profile::{Profile, ProfileManager};
pub use transport::{Connection, Transport};
