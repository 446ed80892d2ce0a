//! Access policy document types.
//!
//! A policy document is a structured least-privilege description generated
//! from a version's dependency list; the IAM backend that materializes it is
//! an external collaborator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Policy language version stamped on every generated document.
pub const POLICY_DOCUMENT_VERSION: &str = "2012-10-17";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
}

impl PolicyStatement {
    pub fn allow(actions: Vec<String>, resources: Vec<String>) -> Self {
        Self {
            effect: Effect::Allow,
            actions,
            resources,
            conditions: None,
        }
    }
}

/// A complete policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub version: String,
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<PolicyStatement>) -> Self {
        Self {
            version: POLICY_DOCUMENT_VERSION.to_string(),
            statements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_documents_carry_the_policy_version() {
        let doc = PolicyDocument::new(vec![PolicyStatement::allow(
            vec!["database:connect".to_string()],
            vec!["lcp:database:postgres".to_string()],
        )]);
        assert_eq!(doc.version, POLICY_DOCUMENT_VERSION);
        assert!(!doc.is_empty());
    }
}
