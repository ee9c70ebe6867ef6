//! Shared Error Types
//!
//! This module defines error types that are shared between the client and backend.
//! These errors represent failures that both sides detect the same way, such as
//! an empty message draft or a malformed image data URI.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - Data validation failures
//! - `MediaError` - Embedded image payload failures
//!
//! # Usage
//!
//! ```rust
//! use parley::shared::error::SharedError;
//!
//! let error = SharedError::validation("message", "Message must contain either text or image");
//! ```
use thiserror::Error;

/// Shared error types that can occur in both client and backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("{message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Image payload could not be encoded or decoded
    #[error("Invalid image: {message}")]
    MediaError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new media error
    pub fn media(message: impl Into<String>) -> Self {
        Self::MediaError {
            message: message.into(),
        }
    }

    /// Field name for validation errors, `None` for the other kinds
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = SharedError::validation("email", "Invalid email format");
        match &error {
            SharedError::ValidationError { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Invalid email format");
            }
            _ => panic!("Expected ValidationError"),
        }
        assert_eq!(error.field(), Some("email"));
    }

    #[test]
    fn test_validation_display_is_bare_message() {
        let error = SharedError::validation("password", "Password should be at least 6 characters");
        assert_eq!(error.to_string(), "Password should be at least 6 characters");
    }

    #[test]
    fn test_media_error_display() {
        let error = SharedError::media("not base64");
        assert_eq!(error.to_string(), "Invalid image: not base64");
        assert!(error.field().is_none());
    }

    #[test]
    fn test_from_serde_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ invalid json }");
        let shared_error: SharedError = result.unwrap_err().into();

        match shared_error {
            SharedError::SerializationError { .. } => {}
            _ => panic!("Expected SerializationError from serde error"),
        }
    }
}
