//! Error types for feed subscriptions and writes

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a document store
///
/// Cloneable so the same failure can be pushed to every watcher of a feed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    /// Could not reach the store
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Store answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Document does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Store refused a write
    #[error("Write rejected: {0}")]
    WriteRejected(String),

    /// The feed or store was shut down
    #[error("Feed closed")]
    Closed,

    /// Invalid store configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FeedError {
    /// Create a not-found error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Returns true if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Decode(_)
            | Self::NotFound { .. }
            | Self::WriteRejected(_)
            | Self::Closed
            | Self::Configuration(_) => false,
        }
    }

    /// Map a transport error from the HTTP client
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(FeedError::Connection("dns".into()).is_retryable());
        assert!(FeedError::Timeout(Duration::from_secs(5)).is_retryable());
        assert!(FeedError::Http { status: 503, message: String::new() }.is_retryable());
        assert!(FeedError::Http { status: 429, message: String::new() }.is_retryable());
        assert!(!FeedError::Http { status: 403, message: String::new() }.is_retryable());
        assert!(!FeedError::not_found("config", "tienda").is_retryable());
        assert!(!FeedError::Closed.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FeedError::not_found("pedidos", "abc").to_string(),
            "Document not found: pedidos/abc"
        );
    }
}
