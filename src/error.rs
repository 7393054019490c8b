//! Gateway error taxonomy and classification.
//!
//! Classification looks only at what the transport raised: a timeout maps to
//! [`GatewayError::Timeout`]; anything else has its body parsed as JSON
//! (falling back to `{"message": "Server Error"}`) and is sorted by the
//! body's `status`/`message` fields. The HTTP status code itself plays no
//! part in the sort.

use crate::request::is_truthy;
use crate::transport::TransportError;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Classification kinds for gateway failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Unauthorized,
    InvalidToken,
    Server,
}

/// Classified gateway failure.
///
/// Non-timeout variants carry the parsed response body alongside the raw
/// transport error.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The transport did not produce a response within the effective timeout.
    #[error("request timed out{}", format_timeout(.timeout))]
    Timeout { timeout: Option<Duration> },

    /// The response body signalled `status: "Unauthorized"`.
    #[error("unauthorized: {body}")]
    Unauthorized {
        body: Value,
        #[source]
        raw: TransportError,
    },

    /// Unauthorized response whose message names an invalid token.
    #[error("invalid token: {body}")]
    InvalidToken {
        body: Value,
        #[source]
        raw: TransportError,
    },

    /// Any other failure, including unparseable bodies.
    #[error("server error: {body}")]
    Server {
        body: Value,
        #[source]
        raw: TransportError,
    },
}

fn format_timeout(timeout: &Option<Duration>) -> String {
    match timeout {
        Some(limit) => format!(" after {limit:?}"),
        None => String::new(),
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidToken { .. } => ErrorKind::InvalidToken,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind(), ErrorKind::Timeout)
    }

    /// True for both Unauthorized and its invalid-token subtype.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unauthorized | ErrorKind::InvalidToken)
    }

    /// The classified response body, when one was parsed.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Timeout { .. } => None,
            Self::Unauthorized { body, .. }
            | Self::InvalidToken { body, .. }
            | Self::Server { body, .. } => Some(body),
        }
    }

    /// The original transport error, when one was carried.
    pub fn raw(&self) -> Option<&TransportError> {
        match self {
            Self::Timeout { .. } => None,
            Self::Unauthorized { raw, .. }
            | Self::InvalidToken { raw, .. }
            | Self::Server { raw, .. } => Some(raw),
        }
    }
}

/// The fields classification reads from an error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Classify a transport failure.
pub(crate) fn classify(raw: TransportError, effective_timeout: Option<Duration>) -> GatewayError {
    match raw {
        TransportError::Timeout => GatewayError::Timeout {
            timeout: effective_timeout,
        },
        TransportError::Status { ref body, .. } => {
            let parsed = parse_error_body(body);
            let envelope: ErrorEnvelope =
                serde_json::from_value(parsed.clone()).unwrap_or_default();
            if envelope.status.as_deref() == Some("Unauthorized") {
                let invalid_token = envelope
                    .message
                    .as_deref()
                    .is_some_and(|m| m.contains("Invalid token"));
                if invalid_token {
                    GatewayError::InvalidToken { body: parsed, raw }
                } else {
                    GatewayError::Unauthorized { body: parsed, raw }
                }
            } else {
                GatewayError::Server { body: parsed, raw }
            }
        }
        other => GatewayError::Server {
            body: generic_body(),
            raw: other,
        },
    }
}

/// Parse an error body, falling back to the generic envelope when the body is
/// absent, unparseable, or a falsy JSON value.
fn parse_error_body(body: &str) -> Value {
    serde_json::from_str::<Value>(body)
        .ok()
        .filter(is_truthy)
        .unwrap_or_else(generic_body)
}

fn generic_body() -> Value {
    serde_json::json!({"message": "Server Error"})
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(body: &str) -> TransportError {
        TransportError::Status {
            status: 500,
            body: body.to_string(),
        }
    }

    #[test]
    fn timeout_carries_the_effective_duration() {
        let err = classify(TransportError::Timeout, Some(Duration::from_millis(50)));
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("50ms"));
    }

    #[test]
    fn unauthorized_body_classifies_as_unauthorized() {
        let err = classify(
            status_error(r#"{"status":"Unauthorized","message":"expired"}"#),
            None,
        );
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.body().unwrap()["message"], json!("expired"));
    }

    #[test]
    fn invalid_token_message_classifies_as_invalid_token() {
        let err = classify(
            status_error(r#"{"status":"Unauthorized","message":"Invalid token here"}"#),
            None,
        );
        assert_eq!(err.kind(), ErrorKind::InvalidToken);
        assert!(err.is_auth_error());
    }

    #[test]
    fn other_bodies_classify_as_server() {
        let err = classify(status_error(r#"{"status":"Conflict"}"#), None);
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn unparseable_bodies_fall_back_to_generic_envelope() {
        let err = classify(status_error("<html>bad gateway</html>"), None);
        assert_eq!(err.body().unwrap(), &json!({"message": "Server Error"}));
    }

    #[test]
    fn falsy_json_bodies_fall_back_to_generic_envelope() {
        for body in ["null", "0", "\"\"", "false"] {
            let err = classify(status_error(body), None);
            assert_eq!(err.body().unwrap(), &json!({"message": "Server Error"}));
        }
    }

    #[test]
    fn connect_errors_classify_as_server_with_generic_body() {
        let err = classify(TransportError::Connect("refused".into()), None);
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.body().unwrap(), &json!({"message": "Server Error"}));
        assert!(matches!(err.raw(), Some(TransportError::Connect(_))));
    }
}
