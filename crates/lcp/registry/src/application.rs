//! Application configuration use cases.

use crate::error::{read_failure, storage, validation_failed};
use crate::{ConfigurationError, ConfigurationResult};
use chrono::{DateTime, Utc};
use lcp_storage::ConfigStore;
use lcp_types::{Application, ApplicationMetadata, ApplicationRecord, StoragePath, TeamMoniker};
use std::sync::Arc;
use tracing::{debug, info};

/// Registry of applications, keyed by `(account, team, moniker)`.
///
/// The derived storage path is the uniqueness mechanism: `init` checks path
/// existence before writing, no separate index exists.
pub struct ApplicationRegistry {
    store: Arc<dyn ConfigStore>,
}

impl ApplicationRegistry {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Register a new application. Fails with `AlreadyExists` when a record
    /// is already present at the derived path.
    pub async fn init(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        metadata: Option<ApplicationMetadata>,
    ) -> ConfigurationResult<Application> {
        let team_moniker = TeamMoniker::new(team, moniker).map_err(validation_failed)?;
        let path =
            StoragePath::for_application(account, team_moniker.team(), team_moniker.moniker())
                .map_err(validation_failed)?;

        if self.store.exists(&path).await.map_err(storage)? {
            return Err(ConfigurationError::AlreadyExists(path.to_string()));
        }

        let application =
            Application::create(account, team_moniker, metadata).map_err(validation_failed)?;
        self.write(&application).await?;

        info!(
            account,
            team,
            moniker,
            id = %application.id(),
            "registered application"
        );
        Ok(application)
    }

    /// Read an application back from storage.
    pub async fn read(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
    ) -> ConfigurationResult<Application> {
        let path = StoragePath::for_application(account, team, moniker)
            .map_err(validation_failed)?;
        let value = self.store.read(&path).await.map_err(read_failure)?;

        let record: ApplicationRecord = serde_json::from_value(value)
            .map_err(|e| ConfigurationError::InvalidFormat(e.to_string()))?;
        Application::from_record(record)
            .map_err(|e| ConfigurationError::InvalidFormat(e.to_string()))
    }

    /// Replace an application's metadata. Read-modify-write with
    /// last-write-wins semantics; no optimistic concurrency token.
    pub async fn update(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        metadata: Option<ApplicationMetadata>,
    ) -> ConfigurationResult<Application> {
        let mut application = self.read(account, team, moniker).await?;
        application.update(metadata).map_err(validation_failed)?;
        self.write(&application).await?;

        debug!(account, team, moniker, "updated application metadata");
        Ok(application)
    }

    /// Delete an application record. Best-effort: deleting a missing record
    /// is not an error at this layer.
    pub async fn delete(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
    ) -> ConfigurationResult<()> {
        let path = StoragePath::for_application(account, team, moniker)
            .map_err(validation_failed)?;
        self.store.delete(&path).await.map_err(storage)?;

        info!(account, team, moniker, "deleted application");
        Ok(())
    }

    /// Staleness check for client-side caching: true iff the stored record
    /// is strictly newer than the caller's local copy.
    pub async fn needs_update(
        &self,
        account: &str,
        team: &str,
        moniker: &str,
        local_timestamp: DateTime<Utc>,
    ) -> ConfigurationResult<bool> {
        let application = self.read(account, team, moniker).await?;
        Ok(application.updated_at() > local_timestamp)
    }

    async fn write(&self, application: &Application) -> ConfigurationResult<()> {
        let value = serde_json::to_value(application.to_record())
            .map_err(|e| ConfigurationError::StorageError(e.to_string()))?;
        self.store
            .write(application.storage_path(), &value)
            .await
            .map_err(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcp_storage::InMemoryConfigStore;
    use serde_json::json;

    fn registry() -> (Arc<InMemoryConfigStore>, ApplicationRegistry) {
        let store = Arc::new(InMemoryConfigStore::new());
        let registry = ApplicationRegistry::new(store.clone());
        (store, registry)
    }

    fn metadata(owner: &str) -> ApplicationMetadata {
        ApplicationMetadata {
            owner: Some(owner.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn init_then_read_round_trips() {
        let (_store, registry) = registry();
        let created = registry
            .init("acme", "payments", "checkout", Some(metadata("alice")))
            .await
            .unwrap();

        let read = registry.read("acme", "payments", "checkout").await.unwrap();
        assert_eq!(read, created);
        assert_eq!(read.metadata().unwrap().owner.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn second_init_fails_and_keeps_the_first_record() {
        let (_store, registry) = registry();
        registry
            .init("acme", "payments", "checkout", Some(metadata("alice")))
            .await
            .unwrap();

        let second = registry
            .init("acme", "payments", "checkout", Some(metadata("bob")))
            .await;
        assert!(matches!(second, Err(ConfigurationError::AlreadyExists(_))));

        let read = registry.read("acme", "payments", "checkout").await.unwrap();
        assert_eq!(read.metadata().unwrap().owner.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn read_of_missing_application_is_not_found() {
        let (_store, registry) = registry();
        assert!(matches!(
            registry.read("acme", "payments", "checkout").await,
            Err(ConfigurationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn corrupted_records_surface_as_invalid_format() {
        let (store, registry) = registry();
        let path = StoragePath::for_application("acme", "payments", "checkout").unwrap();
        store
            .write(&path, &json!({"id": "not-a-uuid"}))
            .await
            .unwrap();

        assert!(matches!(
            registry.read("acme", "payments", "checkout").await,
            Err(ConfigurationError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn update_persists_new_metadata() {
        let (_store, registry) = registry();
        registry
            .init("acme", "payments", "checkout", None)
            .await
            .unwrap();

        let updated = registry
            .update("acme", "payments", "checkout", Some(metadata("bob")))
            .await
            .unwrap();
        assert_eq!(updated.metadata().unwrap().owner.as_deref(), Some("bob"));

        let read = registry.read("acme", "payments", "checkout").await.unwrap();
        assert_eq!(read.metadata().unwrap().owner.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn update_of_missing_application_passes_the_read_error_through() {
        let (_store, registry) = registry();
        assert!(matches!(
            registry
                .update("acme", "payments", "checkout", None)
                .await,
            Err(ConfigurationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let (_store, registry) = registry();
        registry
            .init("acme", "payments", "checkout", None)
            .await
            .unwrap();
        registry.delete("acme", "payments", "checkout").await.unwrap();
        assert!(matches!(
            registry.read("acme", "payments", "checkout").await,
            Err(ConfigurationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn needs_update_is_strictly_greater_than() {
        let (_store, registry) = registry();
        let created = registry
            .init("acme", "payments", "checkout", None)
            .await
            .unwrap();

        let stored_at = created.updated_at();
        assert!(!registry
            .needs_update("acme", "payments", "checkout", stored_at)
            .await
            .unwrap());
        assert!(registry
            .needs_update(
                "acme",
                "payments",
                "checkout",
                stored_at - chrono::Duration::seconds(1)
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn invalid_moniker_fails_validation() {
        let (_store, registry) = registry();
        assert!(matches!(
            registry.init("acme", "payments", "X", None).await,
            Err(ConfigurationError::ValidationFailed(_))
        ));
    }
}
