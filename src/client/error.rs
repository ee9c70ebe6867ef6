//! Client error taxonomy
//!
//! Every failure surfaced by the transport, the message functions and the
//! controllers is a [`ClientError`]. Only [`ClientError::is_transient`]
//! failures are retried automatically.

use thiserror::Error;

use crate::shared::{ConfigError, SharedError};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally; never reaches the network
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// No response from the server
    #[error("{}", network_message(.message, .timeout))]
    Network { message: String, timeout: bool },

    /// Non-2xx response
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// 2xx response with a body that does not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// A send is already outstanding
    #[error("a message is already being sent")]
    Busy,

    /// The operation was cancelled by a peer change or teardown
    #[error("operation cancelled")]
    Cancelled,

    #[error("not logged in")]
    NotAuthenticated,

    /// Local session file could not be read or written
    #[error("session storage error: {0}")]
    Session(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn network_message(message: &str, timeout: &bool) -> String {
    if *timeout {
        format!("request timed out: {}", message)
    } else {
        format!("network error: {}", message)
    }
}

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Network failures, timeouts and 5xx responses
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of the failure; 0 when no response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network { .. } => Some(0),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Http { status: 401, .. } | Self::NotAuthenticated)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::network("connection refused").is_transient());
        assert!(ClientError::timeout("30s").is_transient());
        assert!(ClientError::http(500, "boom").is_transient());
        assert!(ClientError::http(503, "down").is_transient());
        assert!(!ClientError::http(400, "bad").is_transient());
        assert!(!ClientError::http(404, "missing").is_transient());
        assert!(!ClientError::Busy.is_transient());
        assert!(!ClientError::Validation(SharedError::validation("message", "empty")).is_transient());
    }

    #[test]
    fn test_display() {
        assert_eq!(ClientError::http(400, "Invalid credentials").to_string(), "Invalid credentials");
        assert_eq!(
            ClientError::timeout("deadline elapsed").to_string(),
            "request timed out: deadline elapsed"
        );
        assert_eq!(
            ClientError::Validation(SharedError::validation(
                "message",
                "Message must contain either text or image"
            ))
            .to_string(),
            "Message must contain either text or image"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(ClientError::network("x").status(), Some(0));
        assert_eq!(ClientError::http(502, "x").status(), Some(502));
        assert_eq!(ClientError::Busy.status(), None);
        assert!(ClientError::http(401, "x").is_unauthorized());
    }
}
