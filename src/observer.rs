//! Gateway notification channels.
//!
//! Observers are registered at construction and notified fire-and-forget: no
//! return value, no acknowledgment, no backpressure. The immediate caller
//! always gets a precise [`GatewayError`](crate::GatewayError); observers get
//! a coarse notification (e.g. a UI layer that redirects on unauthorized).

use reqwest::Method;
use std::time::Duration;

/// Context describing the call an observer is being notified about.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub method: Method,
    pub url: String,
}

/// Generate a unique request id for observer correlation.
pub(crate) fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Cross-cutting observer for classified request failures.
///
/// All hooks default to no-ops; implement only the channels you care about.
pub trait GatewayObserver: Send + Sync {
    /// First Unauthorized classification in the gateway's lifetime.
    /// Suppressed for every subsequent Unauthorized classification.
    fn on_unauthorized(&self, _ctx: &RequestContext, _body: &serde_json::Value) {}

    /// Unauthorized classification whose message names an invalid token.
    /// Fires on every such classification, latch or not.
    fn on_invalid_token(&self, _ctx: &RequestContext, _body: &serde_json::Value) {}

    /// The call exceeded its effective timeout.
    fn on_timeout(&self, _ctx: &RequestContext, _timeout: Option<Duration>) {}

    /// Reserved. The gateway does not currently invoke this hook.
    fn on_server_error(&self, _ctx: &RequestContext, _body: &serde_json::Value) {}
}

/// A simple logging observer backed by `tracing` (no sensitive data).
#[derive(Clone, Default)]
pub struct LoggingObserver;

impl GatewayObserver for LoggingObserver {
    fn on_unauthorized(&self, ctx: &RequestContext, _body: &serde_json::Value) {
        tracing::debug!(target: "reqgate::http", request_id = %ctx.request_id, method = %ctx.method, url = %ctx.url, "unauthorized response");
    }

    fn on_invalid_token(&self, ctx: &RequestContext, _body: &serde_json::Value) {
        tracing::debug!(target: "reqgate::http", request_id = %ctx.request_id, method = %ctx.method, url = %ctx.url, "invalid token response");
    }

    fn on_timeout(&self, ctx: &RequestContext, timeout: Option<Duration>) {
        tracing::debug!(target: "reqgate::http", request_id = %ctx.request_id, method = %ctx.method, url = %ctx.url, timeout = ?timeout, "request timed out");
    }

    fn on_server_error(&self, ctx: &RequestContext, _body: &serde_json::Value) {
        tracing::debug!(target: "reqgate::http", request_id = %ctx.request_id, method = %ctx.method, url = %ctx.url, "server error response");
    }
}
