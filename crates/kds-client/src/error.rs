//! Client error types

use crate::builder::ConfigError;
use kds_feed::FeedError;
use thiserror::Error;

/// Errors returned by [`KitchenClient`](crate::KitchenClient) operations
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The document store rejected or failed an operation
    #[error("store error: {0}")]
    Feed(#[from] FeedError),

    /// Builder validation failed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Order id not present in the current working set
    #[error("unknown order: {id}")]
    UnknownOrder { id: String },

    /// The store gate is disabled for this client
    #[error("store gate is not enabled")]
    GateDisabled,

    /// The client has been shut down
    #[error("client is shut down")]
    ShutDown,
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
