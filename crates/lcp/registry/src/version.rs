//! Version configuration use cases, including artifact caching.

use crate::error::{read_failure, storage, validation_failed};
use crate::{ConfigurationError, ConfigurationResult};
use lcp_storage::{ArtifactUpload, ConfigStore};
use lcp_types::{
    ApplicationId, ArtifactReference, DependencyConfiguration, PolicyReferences, SemanticVersion,
    StoragePath, TeamMoniker, Version, VersionMetadata, VersionRecord,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request to register a new version of an application.
#[derive(Debug, Clone)]
pub struct InitVersion {
    pub account: String,
    pub team: String,
    pub moniker: String,
    pub application_id: ApplicationId,
    pub version: String,
    pub dependencies: Vec<DependencyConfiguration>,
    pub metadata: Option<VersionMetadata>,
}

/// Registry of application versions, keyed by
/// `(account, team, moniker, version)`.
pub struct VersionRegistry {
    store: Arc<dyn ConfigStore>,
}

impl VersionRegistry {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Register a new immutable version record.
    pub async fn init(&self, request: InitVersion) -> ConfigurationResult<Version> {
        let team_moniker =
            TeamMoniker::new(&request.team, &request.moniker).map_err(validation_failed)?;
        let version_number =
            SemanticVersion::parse(&request.version).map_err(validation_failed)?;
        let path = StoragePath::for_version(
            &request.account,
            team_moniker.team(),
            team_moniker.moniker(),
            &version_number.to_string(),
        )
        .map_err(validation_failed)?;

        if self.store.exists(&path).await.map_err(storage)? {
            return Err(ConfigurationError::AlreadyExists(path.to_string()));
        }

        let version = Version::create(
            request.application_id,
            &request.account,
            &team_moniker,
            version_number,
            request.dependencies,
            request.metadata,
        )
        .map_err(validation_failed)?;
        self.write(&version).await?;

        info!(
            account = %request.account,
            team = %request.team,
            moniker = %request.moniker,
            version = %version.version_number(),
            "registered version"
        );
        Ok(version)
    }

    /// Read a version back from storage.
    pub async fn read(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
    ) -> ConfigurationResult<Version> {
        let team_moniker = TeamMoniker::new(team, moniker).map_err(validation_failed)?;
        let path = StoragePath::for_version(account, team_moniker.team(), team_moniker.moniker(), version)
            .map_err(validation_failed)?;
        let value = self.store.read(&path).await.map_err(read_failure)?;

        let record: VersionRecord = serde_json::from_value(value)
            .map_err(|e| ConfigurationError::InvalidFormat(e.to_string()))?;
        Version::from_record(record, account, &team_moniker)
            .map_err(|e| ConfigurationError::InvalidFormat(e.to_string()))
    }

    /// Replace a version's dependency list and metadata.
    pub async fn update(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
        dependencies: Vec<DependencyConfiguration>,
        metadata: Option<VersionMetadata>,
    ) -> ConfigurationResult<Version> {
        let mut stored = self.read(account, team, moniker, version).await?;
        stored
            .update(dependencies, metadata)
            .map_err(validation_failed)?;
        self.write(&stored).await?;

        debug!(account, team, moniker, version, "updated version");
        Ok(stored)
    }

    /// Delete a version record.
    pub async fn delete(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
    ) -> ConfigurationResult<()> {
        let path = StoragePath::for_version(account, team, moniker, version)
            .map_err(validation_failed)?;
        self.store.delete(&path).await.map_err(storage)?;

        info!(account, team, moniker, version, "deleted version");
        Ok(())
    }

    /// Cache the build artifact for a version. One-shot: a second cache
    /// attempt fails with `AlreadyExists`.
    ///
    /// On upload failure, and on persistence failure after a successful
    /// upload, any partially-stored artifact is cleaned up best-effort
    /// before the original error is returned.
    pub async fn cache_artifact(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ConfigurationResult<ArtifactReference> {
        let mut stored = self.read(account, team, moniker, version).await?;
        if stored.artifact_reference().is_some() {
            return Err(ConfigurationError::AlreadyExists(format!(
                "artifact already cached for {account}/{team}/{moniker}@{version}"
            )));
        }

        let artifact_path = StoragePath::for_artifact(account, team, moniker, version)
            .map_err(validation_failed)?;
        let upload = ArtifactUpload {
            size: bytes.len() as u64,
            content_type: content_type.to_string(),
        };

        let reference = match self.store.upload_artifact(&artifact_path, bytes, upload).await {
            Ok(reference) => reference,
            Err(err) => {
                self.cleanup_artifact(&artifact_path).await;
                return Err(storage(err));
            }
        };

        stored
            .cache_artifact(reference.clone())
            .map_err(validation_failed)?;
        if let Err(err) = self.write(&stored).await {
            self.cleanup_artifact(&artifact_path).await;
            return Err(err);
        }

        info!(
            account,
            team,
            moniker,
            version,
            checksum = %reference.checksum,
            "cached artifact"
        );
        Ok(reference)
    }

    /// Persist generated policy names onto the version record.
    pub async fn attach_policy_references(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
        references: PolicyReferences,
    ) -> ConfigurationResult<Version> {
        let mut stored = self.read(account, team, moniker, version).await?;
        stored
            .attach_policy_references(references)
            .map_err(validation_failed)?;
        self.write(&stored).await?;

        debug!(account, team, moniker, version, "attached policy references");
        Ok(stored)
    }

    async fn write(&self, version: &Version) -> ConfigurationResult<()> {
        let value = serde_json::to_value(version.to_record())
            .map_err(|e| ConfigurationError::StorageError(e.to_string()))?;
        self.store
            .write(version.storage_path(), &value)
            .await
            .map_err(storage)
    }

    /// Best-effort removal of a partially-stored artifact. Failures are
    /// logged and never mask the error that triggered the cleanup.
    async fn cleanup_artifact(&self, path: &StoragePath) {
        if let Err(err) = self.store.delete_artifact(path).await {
            warn!(path = %path, error = %err, "artifact cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcp_storage::InMemoryConfigStore;

    fn registry() -> (Arc<InMemoryConfigStore>, VersionRegistry) {
        let store = Arc::new(InMemoryConfigStore::new());
        let registry = VersionRegistry::new(store.clone());
        (store, registry)
    }

    fn init_request(version: &str) -> InitVersion {
        InitVersion {
            account: "acme".to_string(),
            team: "payments".to_string(),
            moniker: "checkout".to_string(),
            application_id: ApplicationId::generate().unwrap(),
            version: version.to_string(),
            dependencies: vec![
                DependencyConfiguration::new("database", "postgres").unwrap(),
                DependencyConfiguration::new("queue", "rabbitmq").unwrap(),
            ],
            metadata: None,
        }
    }

    async fn registered(registry: &VersionRegistry) -> Version {
        registry.init(init_request("1.2.0")).await.unwrap()
    }

    #[tokio::test]
    async fn init_then_read_round_trips() {
        let (_store, registry) = registry();
        let created = registered(&registry).await;

        let read = registry
            .read("acme", "payments", "checkout", "1.2.0")
            .await
            .unwrap();
        assert_eq!(read, created);
        assert_eq!(read.dependencies().len(), 2);
        assert_eq!(read.version_number().to_string(), "1.2.0");
    }

    #[tokio::test]
    async fn second_init_of_the_same_version_fails() {
        let (_store, registry) = registry();
        registered(&registry).await;
        assert!(matches!(
            registry.init(init_request("1.2.0")).await,
            Err(ConfigurationError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn init_rejects_bad_version_strings() {
        let (_store, registry) = registry();
        assert!(matches!(
            registry.init(init_request("not-a-version")).await,
            Err(ConfigurationError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn update_replaces_dependencies() {
        let (_store, registry) = registry();
        registered(&registry).await;

        let replacement = vec![DependencyConfiguration::new("cache", "redis").unwrap()];
        registry
            .update(
                "acme",
                "payments",
                "checkout",
                "1.2.0",
                replacement.clone(),
                None,
            )
            .await
            .unwrap();

        let read = registry
            .read("acme", "payments", "checkout", "1.2.0")
            .await
            .unwrap();
        assert_eq!(read.dependencies(), replacement.as_slice());
    }

    #[tokio::test]
    async fn cache_artifact_stores_and_references_the_artifact() {
        let (store, registry) = registry();
        registered(&registry).await;

        let reference = registry
            .cache_artifact(
                "acme",
                "payments",
                "checkout",
                "1.2.0",
                b"bundle".to_vec(),
                "application/zip",
            )
            .await
            .unwrap();
        assert_eq!(
            reference.path,
            "lcp-acme-payments-checkout/versions/1.2.0/artifact"
        );
        assert_eq!(store.artifact_count(), 1);

        let read = registry
            .read("acme", "payments", "checkout", "1.2.0")
            .await
            .unwrap();
        assert_eq!(read.artifact_reference(), Some(&reference));
    }

    #[tokio::test]
    async fn second_cache_attempt_fails_and_keeps_the_first_reference() {
        let (_store, registry) = registry();
        registered(&registry).await;

        let first = registry
            .cache_artifact(
                "acme",
                "payments",
                "checkout",
                "1.2.0",
                b"bundle-one".to_vec(),
                "application/zip",
            )
            .await
            .unwrap();

        let second = registry
            .cache_artifact(
                "acme",
                "payments",
                "checkout",
                "1.2.0",
                b"bundle-two".to_vec(),
                "application/zip",
            )
            .await;
        assert!(matches!(second, Err(ConfigurationError::AlreadyExists(_))));

        let read = registry
            .read("acme", "payments", "checkout", "1.2.0")
            .await
            .unwrap();
        assert_eq!(read.artifact_reference(), Some(&first));
    }

    #[tokio::test]
    async fn upload_failure_cleans_up_and_returns_storage_error() {
        let (store, registry) = registry();
        registered(&registry).await;

        let artifact_path =
            StoragePath::for_artifact("acme", "payments", "checkout", "1.2.0").unwrap();
        store.deny_uploads_at(&artifact_path);

        let result = registry
            .cache_artifact(
                "acme",
                "payments",
                "checkout",
                "1.2.0",
                b"bundle".to_vec(),
                "application/zip",
            )
            .await;
        assert!(matches!(result, Err(ConfigurationError::StorageError(_))));
        assert!(!store.has_artifact(&artifact_path));

        let read = registry
            .read("acme", "payments", "checkout", "1.2.0")
            .await
            .unwrap();
        assert!(read.artifact_reference().is_none());
    }

    #[tokio::test]
    async fn persistence_failure_after_upload_cleans_up_the_artifact() {
        let (store, registry) = registry();
        let created = registered(&registry).await;

        store.deny_writes_at(created.storage_path());
        let artifact_path =
            StoragePath::for_artifact("acme", "payments", "checkout", "1.2.0").unwrap();

        let result = registry
            .cache_artifact(
                "acme",
                "payments",
                "checkout",
                "1.2.0",
                b"bundle".to_vec(),
                "application/zip",
            )
            .await;
        assert!(matches!(result, Err(ConfigurationError::StorageError(_))));
        assert!(!store.has_artifact(&artifact_path));
    }

    #[tokio::test]
    async fn attach_policy_references_persists() {
        let (_store, registry) = registry();
        registered(&registry).await;

        registry
            .attach_policy_references(
                "acme",
                "payments",
                "checkout",
                "1.2.0",
                PolicyReferences {
                    app_policy: Some("lcp-acme-payments-checkout-1.2.0-app".to_string()),
                    cicd_policy: Some("lcp-acme-payments-checkout-1.2.0-cicd".to_string()),
                },
            )
            .await
            .unwrap();

        let read = registry
            .read("acme", "payments", "checkout", "1.2.0")
            .await
            .unwrap();
        let references = read.policy_references().unwrap();
        assert_eq!(
            references.app_policy.as_deref(),
            Some("lcp-acme-payments-checkout-1.2.0-app")
        );
    }

    #[tokio::test]
    async fn delete_removes_the_version() {
        let (_store, registry) = registry();
        registered(&registry).await;
        registry
            .delete("acme", "payments", "checkout", "1.2.0")
            .await
            .unwrap();
        assert!(matches!(
            registry.read("acme", "payments", "checkout", "1.2.0").await,
            Err(ConfigurationError::NotFound(_))
        ));
    }
}
