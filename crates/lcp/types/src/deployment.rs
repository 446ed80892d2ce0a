//! The Deployment aggregate: bookkeeping for one orchestration run.

use crate::error::{ValidationError, ValidationResult};
use crate::ids::{DeploymentId, VersionId};
use crate::tags::ResourceTags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Deployment lifecycle states.
///
/// `Pending -> InProgress -> {Completed, Failed}`; both end states are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl DeploymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeploymentStatus::Completed | DeploymentStatus::Failed)
    }

    fn can_transition_to(&self, next: DeploymentStatus) -> bool {
        matches!(
            (self, next),
            (DeploymentStatus::Pending, DeploymentStatus::InProgress)
                | (DeploymentStatus::InProgress, DeploymentStatus::Completed)
                | (DeploymentStatus::InProgress, DeploymentStatus::Failed)
        )
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentStatus::Pending => write!(f, "pending"),
            DeploymentStatus::InProgress => write!(f, "in-progress"),
            DeploymentStatus::Completed => write!(f, "completed"),
            DeploymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One provisioned resource recorded for rollback bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedResource {
    /// Resource kind, e.g. `database`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Provider-assigned deployment or resource id.
    pub id: String,

    /// Platform-scoped reference for the resource.
    pub reference: String,
}

/// Bookkeeping for one orchestration run against a version.
#[derive(Debug, Clone)]
pub struct Deployment {
    id: DeploymentId,
    version_id: VersionId,
    environment: String,
    status: DeploymentStatus,
    tags: ResourceTags,
    deployed_resources: Vec<DeployedResource>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Deployment {
    pub fn create(
        version_id: VersionId,
        environment: &str,
        tags: ResourceTags,
    ) -> ValidationResult<Self> {
        if environment.is_empty() {
            return Err(ValidationError::MissingRequired("environment"));
        }
        Ok(Self {
            id: DeploymentId::generate(),
            version_id,
            environment: environment.to_string(),
            status: DeploymentStatus::Pending,
            tags,
            deployed_resources: Vec::new(),
            failure_reason: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        })
    }

    pub fn id(&self) -> &DeploymentId {
        &self.id
    }

    pub fn version_id(&self) -> &VersionId {
        &self.version_id
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn status(&self) -> DeploymentStatus {
        self.status
    }

    pub fn tags(&self) -> &ResourceTags {
        &self.tags
    }

    pub fn deployed_resources(&self) -> &[DeployedResource] {
        &self.deployed_resources
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Guarded status transition. Illegal transitions fail and leave the
    /// state unchanged.
    pub fn update_status(&mut self, next: DeploymentStatus) -> ValidationResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(ValidationError::invalid_value(
                "deployment status",
                format!("illegal transition {} -> {}", self.status, next),
            ));
        }
        self.status = next;
        match next {
            DeploymentStatus::InProgress => self.started_at = Some(Utc::now()),
            DeploymentStatus::Completed => self.completed_at = Some(Utc::now()),
            _ => {}
        }
        Ok(())
    }

    /// `Pending -> InProgress`, stamping `started_at`.
    pub fn start(&mut self) -> ValidationResult<()> {
        self.update_status(DeploymentStatus::InProgress)
    }

    /// `InProgress -> Completed`, stamping `completed_at`.
    pub fn complete(&mut self) -> ValidationResult<()> {
        self.update_status(DeploymentStatus::Completed)
    }

    /// `InProgress -> Failed`, recording an optional reason.
    pub fn fail(&mut self, reason: Option<String>) -> ValidationResult<()> {
        self.update_status(DeploymentStatus::Failed)?;
        self.failure_reason = reason;
        Ok(())
    }

    /// Append a provisioned resource. Rejected once the deployment has
    /// reached a terminal state.
    pub fn add_deployed_resource(&mut self, resource: DeployedResource) -> ValidationResult<()> {
        if self.status.is_terminal() {
            return Err(ValidationError::invalid_value(
                "deployed resources",
                format!("deployment is already {}", self.status),
            ));
        }
        self.deployed_resources.push(resource);
        Ok(())
    }

    pub fn to_record(&self) -> DeploymentRecord {
        DeploymentRecord {
            id: self.id.to_string(),
            version_id: self.version_id.to_string(),
            environment: self.environment.clone(),
            status: self.status,
            tags: self.tags.to_map(),
            deployed_resources: self.deployed_resources.clone(),
            failure_reason: self.failure_reason.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }

    pub fn from_record(record: DeploymentRecord) -> ValidationResult<Self> {
        let id = DeploymentId::parse(&record.id)?;
        let version_id = VersionId::parse(&record.version_id)?;
        if record.environment.is_empty() {
            return Err(ValidationError::MissingRequired("environment"));
        }
        let tags = ResourceTags::from_map(record.tags)?;
        Ok(Self {
            id,
            version_id,
            environment: record.environment,
            status: record.status,
            tags,
            deployed_resources: record.deployed_resources,
            failure_reason: record.failure_reason,
            created_at: record.created_at,
            started_at: record.started_at,
            completed_at: record.completed_at,
        })
    }
}

impl PartialEq for Deployment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Deployment {}

/// Persisted deployment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: String,
    pub version_id: String,
    pub environment: String,
    pub status: DeploymentStatus,
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub deployed_resources: Vec<DeployedResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Deployment {
        let tags =
            ResourceTags::new("acme", "payments", "checkout", "1.2.0", "production").unwrap();
        Deployment::create(VersionId::generate(), "production", tags).unwrap()
    }

    fn resource(name: &str) -> DeployedResource {
        DeployedResource {
            kind: "database".to_string(),
            id: name.to_string(),
            reference: format!("lcp:database:{name}"),
        }
    }

    #[test]
    fn follows_the_legal_transition_chain() {
        let mut deployment = sample();
        assert_eq!(deployment.status(), DeploymentStatus::Pending);
        deployment.start().unwrap();
        assert!(deployment.started_at().is_some());
        deployment.complete().unwrap();
        assert_eq!(deployment.status(), DeploymentStatus::Completed);
        assert!(deployment.completed_at().is_some());
    }

    #[test]
    fn skipping_in_progress_fails_and_leaves_state_unchanged() {
        let mut deployment = sample();
        assert!(matches!(
            deployment.update_status(DeploymentStatus::Completed),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert_eq!(deployment.status(), DeploymentStatus::Pending);
    }

    #[test]
    fn terminal_states_accept_no_transitions() {
        let mut deployment = sample();
        deployment.start().unwrap();
        deployment.fail(Some("provider unavailable".to_string())).unwrap();
        assert_eq!(
            deployment.failure_reason(),
            Some("provider unavailable")
        );
        assert!(deployment.update_status(DeploymentStatus::InProgress).is_err());
        assert!(deployment.complete().is_err());
        assert_eq!(deployment.status(), DeploymentStatus::Failed);
    }

    #[test]
    fn resources_append_in_order_until_terminal() {
        let mut deployment = sample();
        deployment.start().unwrap();
        deployment.add_deployed_resource(resource("postgres")).unwrap();
        deployment.add_deployed_resource(resource("replica")).unwrap();
        assert_eq!(deployment.deployed_resources().len(), 2);
        assert_eq!(deployment.deployed_resources()[0].id, "postgres");

        deployment.complete().unwrap();
        assert!(deployment.add_deployed_resource(resource("late")).is_err());
        assert_eq!(deployment.deployed_resources().len(), 2);
    }

    #[test]
    fn record_round_trip_preserves_state() {
        let mut deployment = sample();
        deployment.start().unwrap();
        deployment.add_deployed_resource(resource("postgres")).unwrap();
        deployment.complete().unwrap();

        let rebuilt = Deployment::from_record(deployment.to_record()).unwrap();
        assert_eq!(rebuilt.id(), deployment.id());
        assert_eq!(rebuilt.status(), DeploymentStatus::Completed);
        assert_eq!(rebuilt.deployed_resources().len(), 1);
    }
}
