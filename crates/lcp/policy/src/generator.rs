//! The policy collaborator contract.

use crate::PolicyResult;
use async_trait::async_trait;
use lcp_types::{DependencyConfiguration, PolicyDocument};

/// Generates access policy documents from a dependency list.
#[async_trait]
pub trait PolicyGenerator: Send + Sync {
    /// Policy the application assumes at runtime to use its dependencies.
    async fn generate_app_policy(
        &self,
        dependencies: &[DependencyConfiguration],
    ) -> PolicyResult<PolicyDocument>;

    /// Policy the CI/CD pipeline assumes to provision and tear down the
    /// dependencies.
    async fn generate_cicd_policy(
        &self,
        dependencies: &[DependencyConfiguration],
    ) -> PolicyResult<PolicyDocument>;

    /// Render a document to its wire form.
    fn serialize_policy(&self, document: &PolicyDocument) -> PolicyResult<String>;
}
