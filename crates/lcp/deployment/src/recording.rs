//! Recording reference implementation of the deployment contract.
//!
//! Records every call in order and supports scripted failures, so rollback
//! behavior can be exercised deterministically. Deployment ids are derived
//! from the dependency name (`deploy-{name}`) for the same reason.

use crate::provider::{
    ApplicationDeployment, DependencyDeployment, DeployProvider, DeploymentOutcome,
};
use crate::{DeployError, DeployResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use lcp_types::DeploymentStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    DeployDependency { name: String },
    DeployApplication { artifact_path: String },
    Rollback { deployment_id: String },
}

/// In-memory deployment provider for development and tests.
#[derive(Default)]
pub struct RecordingDeployProvider {
    calls: Mutex<Vec<ProviderCall>>,
    failing_dependencies: DashSet<String>,
    failing_rollbacks: DashSet<String>,
    fail_application: AtomicBool,
}

impl RecordingDeployProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deployment of the named dependency fail.
    pub fn fail_dependency(&self, name: &str) {
        self.failing_dependencies.insert(name.to_string());
    }

    /// Make rollback of the given deployment id fail.
    pub fn fail_rollback(&self, deployment_id: &str) {
        self.failing_rollbacks.insert(deployment_id.to_string());
    }

    /// Make the application deployment call fail.
    pub fn fail_application(&self) {
        self.fail_application.store(true, Ordering::SeqCst);
    }

    /// All calls received so far, in order.
    pub async fn recorded_calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().await.clone()
    }

    /// Deployment ids that were rolled back, in rollback order.
    pub async fn rollback_calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                ProviderCall::Rollback { deployment_id } => Some(deployment_id.clone()),
                _ => None,
            })
            .collect()
    }

    fn outcome(deployment_id: String, applied_tags: std::collections::BTreeMap<String, String>) -> DeploymentOutcome {
        let now = Utc::now();
        DeploymentOutcome {
            deployment_id,
            status: DeploymentStatus::Completed,
            started_at: now,
            completed_at: now,
            duration_ms: 0,
            applied_tags,
        }
    }
}

#[async_trait]
impl DeployProvider for RecordingDeployProvider {
    async fn deploy_application(
        &self,
        request: ApplicationDeployment,
    ) -> DeployResult<DeploymentOutcome> {
        self.calls.lock().await.push(ProviderCall::DeployApplication {
            artifact_path: request.artifact_path.clone(),
        });
        if self.fail_application.load(Ordering::SeqCst) {
            return Err(DeployError::DeploymentFailed(
                "application deployment denied".to_string(),
            ));
        }
        debug!(environment = %request.environment, "deployed application");
        Ok(Self::outcome(
            "deploy-app".to_string(),
            request.tags.to_map(),
        ))
    }

    async fn deploy_dependency(
        &self,
        request: DependencyDeployment,
    ) -> DeployResult<DeploymentOutcome> {
        let name = request.dependency.name.clone();
        self.calls
            .lock()
            .await
            .push(ProviderCall::DeployDependency { name: name.clone() });
        if self.failing_dependencies.contains(&name) {
            return Err(DeployError::DeploymentFailed(format!(
                "deployment of {name} denied"
            )));
        }
        debug!(dependency = %name, environment = %request.environment, "deployed dependency");
        Ok(Self::outcome(
            format!("deploy-{name}"),
            request.tags.to_map(),
        ))
    }

    async fn rollback(&self, deployment_id: &str) -> DeployResult<()> {
        self.calls.lock().await.push(ProviderCall::Rollback {
            deployment_id: deployment_id.to_string(),
        });
        if self.failing_rollbacks.contains(deployment_id) {
            return Err(DeployError::RollbackFailed(format!(
                "rollback of {deployment_id} denied"
            )));
        }
        debug!(deployment_id, "rolled back deployment");
        Ok(())
    }
}
