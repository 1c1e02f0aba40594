//! Transport and logger collaborators
//!
//! The resolver never talks to the network directly. It sends
//! [`TransportRequest`]s through an injected [`Transport`] and reports
//! what it is doing through an injected [`Logger`].
//!
//! - `Transport` - async request/response seam; cancel by dropping the future
//! - `Logger` - observational sink, never consulted by the core logic
//! - `TracingLogger` - forwards log lines to `tracing`

mod types;

pub use types::{TransportRequest, TransportResponse};

use crate::error::Result;
use crate::types::LogLevel;
use async_trait::async_trait;
use std::sync::Arc;

/// Async request/response seam used for every metadata and row fetch
///
/// Implementations must not cache: two calls with the same path are two
/// independent requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the status code and raw body
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        (**self).send(request).await
    }
}

/// Observational log sink
pub trait Logger: Send + Sync {
    /// Record a message
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }
}

/// Logger that forwards to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "cdp_tabular", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "cdp_tabular", "{message}"),
            LogLevel::Info => tracing::info!(target: "cdp_tabular", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "cdp_tabular", "{message}"),
            LogLevel::Error => tracing::error!(target: "cdp_tabular", "{message}"),
        }
    }
}
