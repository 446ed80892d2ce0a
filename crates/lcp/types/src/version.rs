//! The Version aggregate: one immutable release of an application.

use crate::dependency::DependencyConfiguration;
use crate::error::{validate_optional_field, ValidationError, ValidationResult};
use crate::ids::{ApplicationId, VersionId};
use crate::moniker::TeamMoniker;
use crate::path::StoragePath;
use crate::semver::SemanticVersion;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to a cached build artifact, produced by the storage
/// collaborator on upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReference {
    pub path: String,
    pub size: u64,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Names of the access policies generated for a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyReferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cicd_policy: Option<String>,
}

impl PolicyReferences {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_optional_field("app policy reference", &self.app_policy)?;
        validate_optional_field("cicd policy reference", &self.cicd_policy)?;
        Ok(())
    }
}

/// Optional descriptive metadata attached to a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
}

impl VersionMetadata {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_optional_field("release notes", &self.release_notes)?;
        validate_optional_field("git commit", &self.git_commit)?;
        validate_optional_field("build number", &self.build_number)?;
        Ok(())
    }
}

/// One registered version of an application.
///
/// Holds a back-reference to its application by id, never an ownership
/// pointer. The artifact reference is attached at most once; dependencies
/// and metadata are replaceable through [`Version::update`].
#[derive(Debug, Clone)]
pub struct Version {
    id: VersionId,
    application_id: ApplicationId,
    version_number: SemanticVersion,
    storage_path: StoragePath,
    dependencies: Vec<DependencyConfiguration>,
    artifact_reference: Option<ArtifactReference>,
    policy_references: Option<PolicyReferences>,
    metadata: Option<VersionMetadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Version {
    /// Register a new version of an application.
    pub fn create(
        application_id: ApplicationId,
        account: &str,
        team_moniker: &TeamMoniker,
        version_number: SemanticVersion,
        dependencies: Vec<DependencyConfiguration>,
        metadata: Option<VersionMetadata>,
    ) -> ValidationResult<Self> {
        if account.is_empty() {
            return Err(ValidationError::MissingRequired("account"));
        }
        for dependency in &dependencies {
            dependency.validate()?;
        }
        if let Some(metadata) = &metadata {
            metadata.validate()?;
        }
        let storage_path = StoragePath::for_version(
            account,
            team_moniker.team(),
            team_moniker.moniker(),
            &version_number.to_string(),
        )?;
        let now = Utc::now();
        Ok(Self {
            id: VersionId::generate(),
            application_id,
            version_number,
            storage_path,
            dependencies,
            artifact_reference: None,
            policy_references: None,
            metadata,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &VersionId {
        &self.id
    }

    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    pub fn version_number(&self) -> &SemanticVersion {
        &self.version_number
    }

    pub fn storage_path(&self) -> &StoragePath {
        &self.storage_path
    }

    pub fn dependencies(&self) -> &[DependencyConfiguration] {
        &self.dependencies
    }

    pub fn artifact_reference(&self) -> Option<&ArtifactReference> {
        self.artifact_reference.as_ref()
    }

    pub fn policy_references(&self) -> Option<&PolicyReferences> {
        self.policy_references.as_ref()
    }

    pub fn metadata(&self) -> Option<&VersionMetadata> {
        self.metadata.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace dependencies and metadata.
    pub fn update(
        &mut self,
        dependencies: Vec<DependencyConfiguration>,
        metadata: Option<VersionMetadata>,
    ) -> ValidationResult<()> {
        for dependency in &dependencies {
            dependency.validate()?;
        }
        if let Some(metadata) = &metadata {
            metadata.validate()?;
        }
        self.dependencies = dependencies;
        self.metadata = metadata;
        self.touch();
        Ok(())
    }

    /// Attach the cached artifact reference. One-shot: caching twice fails.
    pub fn cache_artifact(&mut self, reference: ArtifactReference) -> ValidationResult<()> {
        if self.artifact_reference.is_some() {
            return Err(ValidationError::invalid_value(
                "artifact reference",
                "artifact is already cached for this version",
            ));
        }
        self.artifact_reference = Some(reference);
        self.touch();
        Ok(())
    }

    /// Record the generated policy names for this version.
    pub fn attach_policy_references(
        &mut self,
        references: PolicyReferences,
    ) -> ValidationResult<()> {
        references.validate()?;
        self.policy_references = Some(references);
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Serialize to the storage-neutral record shape.
    pub fn to_record(&self) -> VersionRecord {
        VersionRecord {
            id: self.id.to_string(),
            application_id: self.application_id.to_string(),
            version_number: self.version_number.to_string(),
            dependencies: self.dependencies.clone(),
            artifact_reference: self.artifact_reference.clone(),
            policy_references: self.policy_references.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Reconstruct from a stored record, re-validating every field.
    ///
    /// The record does not carry its addressing context, so the caller
    /// supplies the account and team/moniker it read the record under.
    pub fn from_record(
        record: VersionRecord,
        account: &str,
        team_moniker: &TeamMoniker,
    ) -> ValidationResult<Self> {
        let id = VersionId::parse(&record.id)?;
        let application_id = ApplicationId::parse(&record.application_id)?;
        let version_number = SemanticVersion::parse(&record.version_number)?;
        for dependency in &record.dependencies {
            dependency.validate()?;
        }
        if let Some(references) = &record.policy_references {
            references.validate()?;
        }
        if let Some(metadata) = &record.metadata {
            metadata.validate()?;
        }
        let storage_path = StoragePath::for_version(
            account,
            team_moniker.team(),
            team_moniker.moniker(),
            &record.version_number,
        )?;
        Ok(Self {
            id,
            application_id,
            version_number,
            storage_path,
            dependencies: record.dependencies,
            artifact_reference: record.artifact_reference,
            policy_references: record.policy_references,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Version {}

/// Persisted version record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    pub application_id: String,
    pub version_number: String,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_reference: Option<ArtifactReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_references: Option<PolicyReferences>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VersionMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Version {
        let tm = TeamMoniker::new("payments", "checkout").unwrap();
        Version::create(
            ApplicationId::generate().unwrap(),
            "acme",
            &tm,
            SemanticVersion::parse("1.2.0").unwrap(),
            vec![
                DependencyConfiguration::new("database", "postgres").unwrap(),
                DependencyConfiguration::new("queue", "rabbitmq").unwrap(),
            ],
            None,
        )
        .unwrap()
    }

    fn reference() -> ArtifactReference {
        ArtifactReference {
            path: "lcp-acme-payments-checkout/versions/1.2.0/artifact".to_string(),
            size: 4,
            checksum: "abc123".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn create_derives_the_storage_path() {
        assert_eq!(
            sample().storage_path().as_str(),
            "lcp-acme-payments-checkout/versions/1.2.0/appversion.config"
        );
    }

    #[test]
    fn record_round_trip_preserves_identity() {
        let version = sample();
        let tm = TeamMoniker::new("payments", "checkout").unwrap();
        let rebuilt = Version::from_record(version.to_record(), "acme", &tm).unwrap();
        assert_eq!(rebuilt.id(), version.id());
        assert_eq!(
            rebuilt.version_number().to_string(),
            version.version_number().to_string()
        );
        assert_eq!(rebuilt.dependencies(), version.dependencies());
    }

    #[test]
    fn caching_an_artifact_is_one_shot() {
        let mut version = sample();
        let first = reference();
        version.cache_artifact(first.clone()).unwrap();

        let mut second = reference();
        second.checksum = "def456".to_string();
        assert!(matches!(
            version.cache_artifact(second),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert_eq!(version.artifact_reference(), Some(&first));
    }

    #[test]
    fn update_replaces_dependencies() {
        let mut version = sample();
        let replacement = vec![DependencyConfiguration::new("cache", "redis").unwrap()];
        version.update(replacement.clone(), None).unwrap();
        assert_eq!(version.dependencies(), replacement.as_slice());
    }

    #[test]
    fn attach_policy_references_validates() {
        let mut version = sample();
        assert!(version
            .attach_policy_references(PolicyReferences {
                app_policy: Some(String::new()),
                cicd_policy: None,
            })
            .is_err());
        version
            .attach_policy_references(PolicyReferences {
                app_policy: Some("lcp-acme-payments-checkout-1.2.0-app".to_string()),
                cicd_policy: Some("lcp-acme-payments-checkout-1.2.0-cicd".to_string()),
            })
            .unwrap();
        assert!(version.policy_references().is_some());
    }

    #[test]
    fn from_record_rejects_bad_version_strings() {
        let mut record = sample().to_record();
        record.version_number = "not-a-version".to_string();
        let tm = TeamMoniker::new("payments", "checkout").unwrap();
        assert!(Version::from_record(record, "acme", &tm).is_err());
    }
}
