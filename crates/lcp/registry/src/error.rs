//! Use-case outcome errors.

use lcp_storage::StorageError;
use lcp_types::ValidationError;
use thiserror::Error;

/// Result type for configuration use cases.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// Outcomes of the configuration use cases.
///
/// Lower-layer errors are translated here rather than leaked: an entity
/// reconstruction failure during a read surfaces as `InvalidFormat`, a
/// storage miss as `NotFound`, and any downstream provider failure during
/// orchestration as `ValidationFailed`.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("invalid stored record: {0}")]
    InvalidFormat(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Validation failure during construction or mutation.
pub(crate) fn validation_failed(err: ValidationError) -> ConfigurationError {
    ConfigurationError::ValidationFailed(err.to_string())
}

/// Storage failure outside the read path.
pub(crate) fn storage(err: StorageError) -> ConfigurationError {
    ConfigurationError::StorageError(err.to_string())
}

/// Storage failure on the read path, where a miss means the entity does not
/// exist.
pub(crate) fn read_failure(err: StorageError) -> ConfigurationError {
    match err {
        StorageError::NotFound(path) => ConfigurationError::NotFound(path),
        other => ConfigurationError::StorageError(other.to_string()),
    }
}
