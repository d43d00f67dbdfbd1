//! Storage layer error types.

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Collection not found: {0}")]
    UnknownCollection(String),

    #[error("Remote collection {collection} is unavailable")]
    Unavailable { collection: String },

    /// Every integer key above the current maximum is taken
    #[error("No free key left in {collection}")]
    KeySpaceExhausted { collection: String },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
