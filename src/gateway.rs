//! The request gateway facade.

use crate::auth::{AuthError, AuthProvider, AuthStatus};
use crate::error::{GatewayError, classify};
use crate::observer::{GatewayObserver, RequestContext, generate_request_id};
use crate::request::{PreparedRequest, QueryParams, build_header_map};
use crate::transport::{HttpTransport, TransportError, TransportRequest, TransportResponse};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the gateway default. With neither set, the call never
    /// times out.
    pub timeout: Option<Duration>,
    pub query: Option<QueryParams>,
    pub headers: Option<HashMap<String, String>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = Some(query);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }
}

/// Builder for [`RequestGateway`].
pub struct RequestGatewayBuilder {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
    base_url: Option<String>,
    default_timeout: Option<Duration>,
    observers: Vec<Arc<dyn GatewayObserver>>,
}

impl RequestGatewayBuilder {
    /// Prefix joined to relative request paths. Absolute URLs bypass it.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Timeout applied to every call that does not carry its own.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Register an observer. Repeatable.
    pub fn observer(mut self, observer: Arc<dyn GatewayObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> RequestGateway {
        RequestGateway {
            transport: self.transport,
            auth: self.auth,
            base_url: self.base_url,
            default_timeout: self.default_timeout,
            observers: self.observers,
            unauthorized_notified: AtomicBool::new(false),
        }
    }
}

/// Stateful facade over an injected transport and auth provider.
///
/// Calls are fully independent and may run concurrently; the only persistent
/// state is the one-way unauthorized-notification latch, guarded by
/// compare-and-set so at most one `on_unauthorized` fires per gateway
/// lifetime.
pub struct RequestGateway {
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
    base_url: Option<String>,
    default_timeout: Option<Duration>,
    observers: Vec<Arc<dyn GatewayObserver>>,
    unauthorized_notified: AtomicBool,
}

impl RequestGateway {
    pub fn builder(
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> RequestGatewayBuilder {
        RequestGatewayBuilder {
            transport,
            auth,
            base_url: None,
            default_timeout: None,
            observers: Vec::new(),
        }
    }

    /// The gateway-wide default timeout, if one was configured.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Shape a request: resolve auth state, build the query string and
    /// headers. Never fails — an auth lookup or token-fetch failure is
    /// swallowed and the request falls back to a fresh, empty header map
    /// (caller-supplied headers included).
    pub async fn prepare(
        &self,
        url: &str,
        query: Option<&QueryParams>,
        headers: Option<&HashMap<String, String>>,
    ) -> PreparedRequest {
        let url = self.resolve_url(url, query);
        match self.authorized_headers(headers).await {
            Ok(headers) => PreparedRequest { url, headers },
            Err(err) => {
                tracing::debug!(target: "reqgate::auth", error = %err, "auth lookup failed, proceeding unauthenticated");
                PreparedRequest {
                    url,
                    headers: HeaderMap::new(),
                }
            }
        }
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Value, GatewayError> {
        self.execute(Method::GET, url, None, options).await
    }

    pub async fn put(
        &self,
        url: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.execute(Method::PUT, url, Some(body), options).await
    }

    pub async fn post(
        &self,
        url: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.execute(Method::POST, url, Some(body), options).await
    }

    pub async fn patch(
        &self,
        url: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.execute(Method::PATCH, url, Some(body), options).await
    }

    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Value, GatewayError> {
        self.execute(Method::DELETE, url, None, options).await
    }

    /// Shared pipeline for all five verbs.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        let prepared = self
            .prepare(url, options.query.as_ref(), options.headers.as_ref())
            .await;
        let ctx = RequestContext {
            request_id: generate_request_id(),
            method: method.clone(),
            url: prepared.url.clone(),
        };
        let effective_timeout = options.timeout.or(self.default_timeout);
        tracing::debug!(target: "reqgate::http", request_id = %ctx.request_id, method = %ctx.method, url = %ctx.url, timeout = ?effective_timeout, "sending request");

        let request = TransportRequest {
            method,
            url: prepared.url,
            headers: prepared.headers,
            body,
        };
        match self.dispatch(request, effective_timeout).await {
            Ok(response) => {
                tracing::debug!(target: "reqgate::http", request_id = %ctx.request_id, status = response.status, "response received");
                map_response(response)
            }
            Err(raw) => Err(self.classify_and_notify(&ctx, raw, effective_timeout)),
        }
    }

    /// Race the transport against the effective timeout. The underlying
    /// connection is not cancelled when the timer wins.
    async fn dispatch(
        &self,
        request: TransportRequest,
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, TransportError> {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.transport.execute(request)).await
            {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout),
            },
            None => self.transport.execute(request).await,
        }
    }

    fn classify_and_notify(
        &self,
        ctx: &RequestContext,
        raw: TransportError,
        effective_timeout: Option<Duration>,
    ) -> GatewayError {
        let error = classify(raw, effective_timeout);
        tracing::debug!(target: "reqgate::http", request_id = %ctx.request_id, url = %ctx.url, error = %error, "request failed");
        match &error {
            GatewayError::Timeout { timeout } => {
                for observer in &self.observers {
                    observer.on_timeout(ctx, *timeout);
                }
            }
            GatewayError::Unauthorized { body, .. } | GatewayError::InvalidToken { body, .. } => {
                if matches!(&error, GatewayError::InvalidToken { .. }) {
                    for observer in &self.observers {
                        observer.on_invalid_token(ctx, body);
                    }
                }
                if self
                    .unauthorized_notified
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    for observer in &self.observers {
                        observer.on_unauthorized(ctx, body);
                    }
                }
            }
            GatewayError::Server { .. } => {}
        }
        error
    }

    fn resolve_url(&self, url: &str, query: Option<&QueryParams>) -> String {
        let query_string = query.map(QueryParams::to_query_string).unwrap_or_default();
        match &self.base_url {
            Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => {
                format!("{}{}{}", base.trim_end_matches('/'), url, query_string)
            }
            _ => format!("{url}{query_string}"),
        }
    }

    async fn authorized_headers(
        &self,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<HeaderMap, AuthError> {
        let mut map = headers.map(build_header_map).unwrap_or_default();
        if self.auth.status().await? == AuthStatus::Authenticated {
            let token = self.auth.access_token().await?;
            match HeaderValue::from_str(token.expose()) {
                Ok(value) => {
                    map.insert(AUTHORIZATION, value);
                }
                Err(err) => {
                    tracing::debug!(target: "reqgate::auth", error = %err, "access token is not a valid header value, skipping Authorization");
                }
            }
        }
        Ok(map)
    }
}

/// Map a success response: 204 resolves to an empty string, anything else
/// parses as JSON (empty body → `{}`).
fn map_response(response: TransportResponse) -> Result<Value, GatewayError> {
    if response.status == 204 {
        return Ok(Value::String(String::new()));
    }
    let text = response.text();
    if text.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(&text)
        .map_err(|e| classify(TransportError::Decode(e.to_string()), None))
}
