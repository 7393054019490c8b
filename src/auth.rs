//! Authentication collaborator seam.
//!
//! The gateway queries an [`AuthProvider`] before every call. Provider
//! failures never fail the call: `prepare` swallows them and downgrades the
//! request to unauthenticated.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Result of an auth-state lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    Anonymous,
}

/// An access token as handed out by an [`AuthProvider`].
///
/// The raw value is sent verbatim as the `Authorization` header, scheme
/// included if the provider supplies one. `Debug` output is redacted.
#[derive(Clone)]
pub struct AccessToken {
    access_token: SecretString,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
        }
    }

    /// The raw access-token value.
    pub fn expose(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Auth lookup failure.
#[derive(Debug, Error)]
#[error("auth provider error: {0}")]
pub struct AuthError(pub String);

/// External authentication collaborator.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current auth state.
    async fn status(&self) -> Result<AuthStatus, AuthError>;

    /// Access token for the current session.
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

/// Fixed-token provider for tests and simple setups.
pub struct StaticAuthProvider {
    token: AccessToken,
}

impl StaticAuthProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn status(&self) -> Result<AuthStatus, AuthError> {
        Ok(AuthStatus::Authenticated)
    }

    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}
