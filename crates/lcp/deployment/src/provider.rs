//! The deployment collaborator contract.

use crate::DeployResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lcp_types::{DependencyConfiguration, DeploymentStatus, PolicyDocument, ResourceTags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request to provision one declared dependency.
#[derive(Debug, Clone)]
pub struct DependencyDeployment {
    pub dependency: DependencyConfiguration,
    pub environment: String,
    pub tags: ResourceTags,
}

/// Request to deploy the application itself.
#[derive(Debug, Clone)]
pub struct ApplicationDeployment {
    /// Path of the cached artifact; empty when no artifact is cached.
    pub artifact_path: String,
    pub policy_document: PolicyDocument,
    pub environment: String,
    pub tags: ResourceTags,
}

/// Result of one provider deployment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentOutcome {
    pub deployment_id: String,
    pub status: DeploymentStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub applied_tags: BTreeMap<String, String>,
}

/// Executes deployments against the target infrastructure.
#[async_trait]
pub trait DeployProvider: Send + Sync {
    /// Deploy the application in one call; there is no partial success at
    /// this boundary.
    async fn deploy_application(
        &self,
        request: ApplicationDeployment,
    ) -> DeployResult<DeploymentOutcome>;

    /// Provision one dependency.
    async fn deploy_dependency(
        &self,
        request: DependencyDeployment,
    ) -> DeployResult<DeploymentOutcome>;

    /// Undo a previously successful deployment.
    async fn rollback(&self, deployment_id: &str) -> DeployResult<()>;
}
