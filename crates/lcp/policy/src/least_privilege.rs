//! Least-privilege policy generation from dependency kinds.

use crate::generator::PolicyGenerator;
use crate::{PolicyError, PolicyResult};
use async_trait::async_trait;
use lcp_types::{DependencyConfiguration, PolicyDocument, PolicyStatement};
use tracing::debug;

/// Reference policy generator.
///
/// Maps each dependency kind to a fixed action set: a narrow runtime set for
/// the application policy and a broader provisioning set for the CI/CD
/// policy. Unknown kinds fall back to a single generic action so a new
/// dependency type never silently receives broad access.
#[derive(Debug, Default)]
pub struct LeastPrivilegePolicyGenerator;

impl LeastPrivilegePolicyGenerator {
    pub fn new() -> Self {
        Self
    }

    fn statements(
        dependencies: &[DependencyConfiguration],
        actions_for: fn(&str) -> Vec<String>,
    ) -> PolicyResult<Vec<PolicyStatement>> {
        dependencies
            .iter()
            .map(|dependency| {
                dependency
                    .validate()
                    .map_err(|e| PolicyError::Generation(e.to_string()))?;
                Ok(PolicyStatement::allow(
                    actions_for(&dependency.kind),
                    vec![dependency.resource_reference()],
                ))
            })
            .collect()
    }
}

fn runtime_actions(kind: &str) -> Vec<String> {
    let actions: &[&str] = match kind {
        "database" => &["database:connect", "database:read", "database:write"],
        "queue" => &["queue:send", "queue:receive", "queue:delete-message"],
        "storage" => &["storage:get", "storage:put", "storage:list"],
        "cache" => &["cache:read", "cache:write"],
        _ => return vec![format!("{kind}:use")],
    };
    actions.iter().map(|a| a.to_string()).collect()
}

fn cicd_actions(kind: &str) -> Vec<String> {
    let actions: &[&str] = match kind {
        "database" => &["database:create", "database:configure", "database:delete"],
        "queue" => &["queue:create", "queue:configure", "queue:delete"],
        "storage" => &["storage:create", "storage:configure", "storage:delete"],
        "cache" => &["cache:create", "cache:configure", "cache:delete"],
        _ => return vec![format!("{kind}:manage")],
    };
    actions.iter().map(|a| a.to_string()).collect()
}

#[async_trait]
impl PolicyGenerator for LeastPrivilegePolicyGenerator {
    async fn generate_app_policy(
        &self,
        dependencies: &[DependencyConfiguration],
    ) -> PolicyResult<PolicyDocument> {
        debug!(dependency_count = dependencies.len(), "generating app policy");
        Ok(PolicyDocument::new(Self::statements(
            dependencies,
            runtime_actions,
        )?))
    }

    async fn generate_cicd_policy(
        &self,
        dependencies: &[DependencyConfiguration],
    ) -> PolicyResult<PolicyDocument> {
        debug!(
            dependency_count = dependencies.len(),
            "generating cicd policy"
        );
        Ok(PolicyDocument::new(Self::statements(
            dependencies,
            cicd_actions,
        )?))
    }

    fn serialize_policy(&self, document: &PolicyDocument) -> PolicyResult<String> {
        serde_json::to_string_pretty(document)
            .map_err(|e| PolicyError::Serialization(e.to_string()))
    }
}
