//! reqgate
//!
//! A thin async request gateway over an injectable HTTP transport. Before
//! every call it resolves auth state through an [`AuthProvider`], shapes the
//! URL and headers, races the transport against a configurable timeout,
//! normalizes JSON responses, and classifies a narrow set of failures
//! (timeout, unauthorized, invalid token) into observer notifications.
//!
//! Retry, pooling, caching and transport-level concerns are out of scope;
//! they belong to the injected [`HttpTransport`].
//!
//! # Example
//!
//! ```rust,no_run
//! use reqgate::{RequestGateway, RequestOptions, ReqwestTransport, StaticAuthProvider};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), reqgate::GatewayError> {
//! let gateway = RequestGateway::builder(
//!     Arc::new(ReqwestTransport::default()),
//!     Arc::new(StaticAuthProvider::new("token-123")),
//! )
//! .base_url("https://api.example.com")
//! .default_timeout(Duration::from_secs(8))
//! .build();
//!
//! let items = gateway.get("/items", RequestOptions::new()).await?;
//! println!("{items}");
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod gateway;
pub mod observer;
pub mod request;
pub mod transport;

pub use auth::{AccessToken, AuthError, AuthProvider, AuthStatus, StaticAuthProvider};
pub use error::{ErrorKind, GatewayError};
pub use gateway::{RequestGateway, RequestGatewayBuilder, RequestOptions};
pub use observer::{GatewayObserver, LoggingObserver, RequestContext};
pub use request::{PreparedRequest, QueryParams};
pub use transport::{
    HttpTransport, ReqwestTransport, TransportError, TransportRequest, TransportResponse,
};
