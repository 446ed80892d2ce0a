//! Deployment collaborator errors.

use thiserror::Error;

/// Result type for deployment provider operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors surfaced by the deployment collaborator.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("deployment failed: {0}")]
    DeploymentFailed(String),

    #[error("rollback failed: {0}")]
    RollbackFailed(String),
}
