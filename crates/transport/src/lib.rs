//! splunkd-transport: default network transport for splunkd-core
//!
//! This crate provides the implementation of the `Transport` trait using
//! `ureq` for requests and `rustls` for raw TLS streams. It is the only
//! crate in the workspace that opens sockets.

pub mod client;
pub mod stream;
mod tls;

pub use client::{TransportOptions, UreqTransport};
pub use stream::Stream;

use splunkd_core::{Context, ContextConfig, Result};

/// Build a `Context` over the default transport; no network activity.
pub fn context(config: &ContextConfig) -> Result<Context> {
    let transport = UreqTransport::new(TransportOptions::from(config))?;
    Context::new(config.clone(), Box::new(transport))
}

/// Build a `Context` over the default transport and log in.
pub fn connect(config: &ContextConfig) -> Result<Context> {
    let transport = UreqTransport::new(TransportOptions::from(config))?;
    splunkd_core::connect(config.clone(), Box::new(transport))
}
