//! Declared infrastructure dependencies.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One infrastructure resource a version requires at runtime.
///
/// Purely declarative: the deployment collaborator interprets the
/// configuration bag, this core only carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyConfiguration {
    /// Resource kind tag, e.g. `database` or `queue`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Name of the resource, unique within the version's dependency list.
    pub name: String,

    /// Opaque provider-specific settings.
    #[serde(default)]
    pub configuration: BTreeMap<String, Value>,
}

impl DependencyConfiguration {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> ValidationResult<Self> {
        let dependency = Self {
            kind: kind.into(),
            name: name.into(),
            configuration: BTreeMap::new(),
        };
        dependency.validate()?;
        Ok(dependency)
    }

    pub fn with_configuration(mut self, configuration: BTreeMap<String, Value>) -> Self {
        self.configuration = configuration;
        self
    }

    /// Check the declaration is well formed. Called wherever a dependency
    /// list enters a Version.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.kind.is_empty() {
            return Err(ValidationError::DependencyInvalid(
                "dependency type must not be empty".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(ValidationError::DependencyInvalid(
                "dependency name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Platform-scoped reference for this resource, used in policy documents
    /// and rollback bookkeeping.
    pub fn resource_reference(&self) -> String {
        format!("lcp:{}:{}", self.kind, self.name)
    }
}
