//! Policy-layer errors.

use thiserror::Error;

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors surfaced by the policy collaborator.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy generation failed: {0}")]
    Generation(String),

    #[error("policy serialization failed: {0}")]
    Serialization(String),
}
