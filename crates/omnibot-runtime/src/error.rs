//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use omnibot_core::RouterError;

/// Errors returned by a [`Receiver`](crate::Receiver).
#[derive(Error, Debug)]
pub enum ReceiverError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The request body is not JSON, or the reply could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Routing failed.
    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Result type for receiver operations.
pub type ReceiverResult<T> = Result<T, ReceiverError>;
