//! Request observation
//!
//! Every round trip made by `HttpClient` is reported to a `RequestObserver`.
//! The default observer writes a `tracing` event; applications can install
//! their own to collect timings or count requests.

use std::time::Duration;

use crate::http::Method;

/// One completed round trip
#[derive(Debug, Clone)]
pub struct RequestEvent<'a> {
    pub method: Method,
    pub url: &'a str,
    /// `None` when the transport failed before a response arrived
    pub status: Option<u16>,
    pub elapsed: Duration,
}

/// Hook invoked after every round trip
pub trait RequestObserver: Send + Sync {
    fn observe(&self, event: &RequestEvent<'_>);
}

/// Emits a debug-level `tracing` event per request
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn observe(&self, event: &RequestEvent<'_>) {
        tracing::debug!(
            method = %event.method,
            url = event.url,
            status = ?event.status,
            elapsed_ms = event.elapsed.as_millis() as u64,
            "Operation took {:?}",
            event.elapsed
        );
    }
}
