//! HTTP transport abstraction.
//!
//! The gateway never talks to the network directly; it dispatches through an
//! injectable transport that can observe the final URL/headers/body and can be
//! replaced with a synthetic implementation in tests. Non-success HTTP
//! statuses surface as [`TransportError::Status`] carrying the serialized
//! body, which is what the gateway's classification step inspects.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Transport-level request data.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// JSON body for PUT/POST/PATCH; `None` for GET/DELETE.
    pub body: Option<serde_json::Value>,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response body as text (lossy UTF-8).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Errors raised by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-success HTTP status. Carries the serialized response body.
    #[error("http status {status}")]
    Status { status: u16, body: String },

    /// The transport's own deadline elapsed before a response arrived.
    #[error("transport timeout")]
    Timeout,

    /// Connection-level failure (DNS, TLS, refused, reset).
    #[error("connection error: {0}")]
    Connect(String),

    /// The response body could not be read.
    #[error("undecodable response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Connect(err.to_string())
        }
    }
}

/// Injectable HTTP transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Default transport over a shared `reqwest::Client`.
///
/// Pooling, TLS and keep-alive behavior are whatever the supplied client is
/// configured with.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap a pre-configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(TransportResponse {
            status: status.as_u16(),
            headers,
            body: body.to_vec(),
        })
    }
}
