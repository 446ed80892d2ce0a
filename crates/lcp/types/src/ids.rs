//! Strongly-typed identifiers for LCP entities.
//!
//! All IDs are UUID-based but wrapped in newtype structs for type safety.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(Uuid);

impl ApplicationId {
    /// Generate a fresh random identifier.
    ///
    /// Returns a `Result` for symmetry with [`ApplicationId::parse`]; the
    /// generation itself does not fail.
    pub fn generate() -> ValidationResult<Self> {
        Ok(Self(Uuid::new_v4()))
    }

    /// Parse an identifier from its string form.
    pub fn parse(s: &str) -> ValidationResult<Self> {
        if s.trim().is_empty() {
            return Err(ValidationError::invalid_format(
                "application id",
                "must not be empty",
            ));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("application id", e.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a version record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(Uuid);

impl VersionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> ValidationResult<Self> {
        if s.trim().is_empty() {
            return Err(ValidationError::invalid_format(
                "version id",
                "must not be empty",
            ));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("version id", e.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentId(Uuid);

impl DeploymentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> ValidationResult<Self> {
        if s.trim().is_empty() {
            return Err(ValidationError::invalid_format(
                "deployment id",
                "must not be empty",
            ));
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| ValidationError::invalid_format("deployment id", e.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = ApplicationId::generate().unwrap();
        let b = ApplicationId::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_round_trips_display() {
        let id = ApplicationId::generate().unwrap();
        let parsed = ApplicationId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_empty_and_garbage() {
        assert!(matches!(
            ApplicationId::parse(""),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            ApplicationId::parse("not-a-uuid"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }
}
