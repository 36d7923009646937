//! Error types for the order model

use thiserror::Error;

/// Errors raised while turning raw store data into orders
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KdsError {
    /// Document body is not usable at all (not a JSON object, empty id)
    #[error("Malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    /// Failed to parse a JSON payload
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String, raw: Option<String> },

    /// Invalid state transition
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl KdsError {
    /// Create a malformed document error
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if processing can continue with the remaining documents
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. })
    }
}

/// Result type alias for order model operations
pub type KdsResult<T> = Result<T, KdsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_skippable() {
        let err = KdsError::malformed("abc", "not an object");
        assert!(err.is_skippable());
        assert_eq!(err.to_string(), "Malformed document abc: not an object");

        let err = KdsError::Configuration("missing project".into());
        assert!(!err.is_skippable());
    }
}
