//! Deployment orchestration over the storage, policy, and deployment
//! collaborators.

use crate::provider::{ApplicationDeployment, DependencyDeployment, DeployProvider, DeploymentOutcome};
use lcp_policy::PolicyGenerator;
use lcp_registry::{ConfigurationError, ConfigurationResult, VersionRegistry};
use lcp_storage::ConfigStore;
use lcp_types::{
    DeployedResource, Deployment, PolicyReferences, ResourceTags, ValidationError,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Addressing and tagging inputs for one orchestration call.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub account: String,
    pub team: String,
    pub moniker: String,
    pub version: String,
    pub environment: String,
    pub custom_tags: BTreeMap<String, String>,
}

/// Result of a successful dependency deployment run.
#[derive(Debug, Clone)]
pub struct DependencyDeploymentReport {
    /// Bookkeeping entity for the run, in `Completed` state with one
    /// deployed resource per dependency.
    pub deployment: Deployment,

    /// Per-dependency provider outcomes, in declaration order.
    pub outcomes: Vec<DeploymentOutcome>,
}

/// Serialized policies and the names they were attached under.
#[derive(Debug, Clone)]
pub struct GeneratedPolicies {
    pub references: PolicyReferences,
    pub app_policy: String,
    pub cicd_policy: String,
}

/// Orchestrates version deployments.
///
/// Execution is strictly sequential: dependencies deploy one at a time in
/// declaration order, so tag application and rollback ordering stay easy to
/// reason about.
pub struct DeploymentOrchestrator {
    versions: VersionRegistry,
    policy: Arc<dyn PolicyGenerator>,
    provider: Arc<dyn DeployProvider>,
}

impl DeploymentOrchestrator {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        policy: Arc<dyn PolicyGenerator>,
        provider: Arc<dyn DeployProvider>,
    ) -> Self {
        Self {
            versions: VersionRegistry::new(store),
            policy,
            provider,
        }
    }

    /// Deploy every dependency a version declares, in declaration order.
    ///
    /// On the first failure no further deployments are attempted; every
    /// dependency that already succeeded is rolled back in reverse
    /// deployment order, best-effort, and the operation reports
    /// `ValidationFailed` for the original failure.
    pub async fn deploy_dependencies(
        &self,
        request: &DeployRequest,
    ) -> ConfigurationResult<DependencyDeploymentReport> {
        let version = self
            .versions
            .read(&request.account, &request.team, &request.moniker, &request.version)
            .await?;
        let tags = self.build_tags(request)?;

        let mut deployment =
            Deployment::create(*version.id(), &request.environment, tags.clone())
                .map_err(validation_failed)?;
        deployment.start().map_err(validation_failed)?;

        let mut outcomes: Vec<DeploymentOutcome> = Vec::new();
        for dependency in version.dependencies() {
            debug!(
                dependency = %dependency.name,
                kind = %dependency.kind,
                environment = %request.environment,
                "deploying dependency"
            );
            let outcome = match self
                .provider
                .deploy_dependency(DependencyDeployment {
                    dependency: dependency.clone(),
                    environment: request.environment.clone(),
                    tags: tags.clone(),
                })
                .await
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(
                        dependency = %dependency.name,
                        error = %err,
                        deployed = outcomes.len(),
                        "dependency deployment failed, rolling back"
                    );
                    self.rollback_deployed(&outcomes).await;
                    let reason =
                        format!("deployment of dependency {} failed: {err}", dependency.name);
                    deployment
                        .fail(Some(reason.clone()))
                        .map_err(validation_failed)?;
                    return Err(ConfigurationError::ValidationFailed(reason));
                }
            };
            deployment
                .add_deployed_resource(DeployedResource {
                    kind: dependency.kind.clone(),
                    id: outcome.deployment_id.clone(),
                    reference: dependency.resource_reference(),
                })
                .map_err(validation_failed)?;
            outcomes.push(outcome);
        }

        deployment.complete().map_err(validation_failed)?;
        info!(
            deployment_id = %deployment.id(),
            deployed = outcomes.len(),
            environment = %request.environment,
            "dependencies deployed"
        );
        Ok(DependencyDeploymentReport {
            deployment,
            outcomes,
        })
    }

    /// Deploy the application itself: one provider call carrying the cached
    /// artifact path (empty when none is cached), the generated runtime
    /// policy, and the merged tag set. There is no rollback here; the single
    /// call either fully succeeds or fully fails.
    pub async fn deploy_application(
        &self,
        request: &DeployRequest,
    ) -> ConfigurationResult<DeploymentOutcome> {
        let version = self
            .versions
            .read(&request.account, &request.team, &request.moniker, &request.version)
            .await?;

        let policy_document = self
            .policy
            .generate_app_policy(version.dependencies())
            .await
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;
        let tags = self.build_tags(request)?;

        let artifact_path = version
            .artifact_reference()
            .map(|reference| reference.path.clone())
            .unwrap_or_default();

        let outcome = self
            .provider
            .deploy_application(ApplicationDeployment {
                artifact_path,
                policy_document,
                environment: request.environment.clone(),
                tags,
            })
            .await
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;

        info!(
            deployment_id = %outcome.deployment_id,
            environment = %request.environment,
            "application deployed"
        );
        Ok(outcome)
    }

    /// Generate and serialize both access policies for a version and attach
    /// their names to the version record.
    pub async fn generate_policies(
        &self,
        request: &DeployRequest,
    ) -> ConfigurationResult<GeneratedPolicies> {
        let version = self
            .versions
            .read(&request.account, &request.team, &request.moniker, &request.version)
            .await?;

        let app_document = self
            .policy
            .generate_app_policy(version.dependencies())
            .await
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;
        let cicd_document = self
            .policy
            .generate_cicd_policy(version.dependencies())
            .await
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;

        let app_policy = self
            .policy
            .serialize_policy(&app_document)
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;
        let cicd_policy = self
            .policy
            .serialize_policy(&cicd_document)
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;

        let references = PolicyReferences {
            app_policy: Some(policy_name(request, "app")),
            cicd_policy: Some(policy_name(request, "cicd")),
        };
        self.versions
            .attach_policy_references(
                &request.account,
                &request.team,
                &request.moniker,
                &request.version,
                references.clone(),
            )
            .await?;

        Ok(GeneratedPolicies {
            references,
            app_policy,
            cicd_policy,
        })
    }

    fn build_tags(&self, request: &DeployRequest) -> ConfigurationResult<ResourceTags> {
        let tags = ResourceTags::new(
            &request.account,
            &request.team,
            &request.moniker,
            &request.version,
            &request.environment,
        )
        .map_err(validation_failed)?;
        if request.custom_tags.is_empty() {
            Ok(tags)
        } else {
            tags.with_custom_tags(&request.custom_tags)
                .map_err(validation_failed)
        }
    }

    /// Undo already-provisioned dependencies in reverse deployment order.
    /// Rollback failures are logged and never abort the loop or replace the
    /// original deployment error.
    async fn rollback_deployed(&self, outcomes: &[DeploymentOutcome]) {
        for outcome in outcomes.iter().rev() {
            if let Err(err) = self.provider.rollback(&outcome.deployment_id).await {
                warn!(
                    deployment_id = %outcome.deployment_id,
                    error = %err,
                    "rollback failed"
                );
            }
        }
    }
}

fn validation_failed(err: ValidationError) -> ConfigurationError {
    ConfigurationError::ValidationFailed(err.to_string())
}

fn policy_name(request: &DeployRequest, suffix: &str) -> String {
    format!(
        "lcp-{}-{}-{}-{}-{suffix}",
        request.account, request.team, request.moniker, request.version
    )
}
