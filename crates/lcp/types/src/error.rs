//! Validation errors for value and entity construction.

use thiserror::Error;

/// Result type for validated construction.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised while constructing or mutating domain values.
///
/// Every fallible constructor in this crate returns one of these; callers
/// match exhaustively and translate into their own layer's error kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingRequired(&'static str),

    #[error("invalid format for {field}: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("tag collision on key: {0}")]
    TagCollision(String),

    #[error("invalid dependency: {0}")]
    DependencyInvalid(String),
}

impl ValidationError {
    pub(crate) fn invalid_format(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// An absent optional field is fine; a present-but-empty one is not.
pub(crate) fn validate_optional_field(
    field: &'static str,
    value: &Option<String>,
) -> ValidationResult<()> {
    match value {
        Some(v) if v.is_empty() => Err(ValidationError::invalid_value(
            field,
            "must not be empty when supplied",
        )),
        _ => Ok(()),
    }
}
