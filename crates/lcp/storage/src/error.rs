//! Storage-layer errors.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors surfaced by the storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("artifact upload failed: {0}")]
    UploadFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}
