//! Object storage error types.

use thiserror::Error;

/// Result type for object storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur when talking to the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    #[error("delete batch of {requested} keys exceeds the {max} key limit")]
    BatchTooLarge { requested: usize, max: usize },

    #[error("S3 operation failed: {0}")]
    S3(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
