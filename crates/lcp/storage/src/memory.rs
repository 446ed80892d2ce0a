//! In-memory reference implementation of the storage contract.
//!
//! Deterministic and test-friendly. Production deployments use an object
//! store adapter; this one keeps everything in process memory and supports
//! fault injection for exercising cleanup paths.

use crate::traits::{ArtifactUpload, ConfigStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use lcp_types::{ArtifactReference, StoragePath};
use serde_json::Value;
use tracing::debug;

/// In-memory config and artifact store.
#[derive(Default)]
pub struct InMemoryConfigStore {
    records: DashMap<String, Value>,
    artifacts: DashMap<String, ArtifactReference>,
    write_failures: DashSet<String>,
    upload_failures: DashSet<String>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `write` at the path fail.
    pub fn deny_writes_at(&self, path: &StoragePath) {
        self.write_failures.insert(path.as_str().to_string());
    }

    /// Make every subsequent `upload_artifact` at the path fail.
    pub fn deny_uploads_at(&self, path: &StoragePath) {
        self.upload_failures.insert(path.as_str().to_string());
    }

    /// Whether an artifact is currently stored at the path.
    pub fn has_artifact(&self, path: &StoragePath) -> bool {
        self.artifacts.contains_key(path.as_str())
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn exists(&self, path: &StoragePath) -> StorageResult<bool> {
        Ok(self.records.contains_key(path.as_str()))
    }

    async fn read(&self, path: &StoragePath) -> StorageResult<Value> {
        self.records
            .get(path.as_str())
            .map(|record| record.clone())
            .ok_or_else(|| StorageError::NotFound(path.as_str().to_string()))
    }

    async fn write(&self, path: &StoragePath, record: &Value) -> StorageResult<()> {
        if self.write_failures.contains(path.as_str()) {
            return Err(StorageError::WriteFailed(format!(
                "write denied at {path}"
            )));
        }
        debug!(path = %path, "writing record");
        self.records
            .insert(path.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, path: &StoragePath) -> StorageResult<()> {
        self.records.remove(path.as_str());
        Ok(())
    }

    async fn upload_artifact(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        upload: ArtifactUpload,
    ) -> StorageResult<ArtifactReference> {
        if self.upload_failures.contains(path.as_str()) {
            return Err(StorageError::UploadFailed(format!(
                "upload denied at {path}"
            )));
        }
        if upload.size != bytes.len() as u64 {
            return Err(StorageError::UploadFailed(format!(
                "declared size {} does not match payload size {}",
                upload.size,
                bytes.len()
            )));
        }
        let reference = ArtifactReference {
            path: path.as_str().to_string(),
            size: bytes.len() as u64,
            checksum: blake3::hash(&bytes).to_hex().to_string(),
            uploaded_at: Utc::now(),
        };
        debug!(path = %path, size = reference.size, "storing artifact");
        self.artifacts
            .insert(path.as_str().to_string(), reference.clone());
        Ok(reference)
    }

    async fn delete_artifact(&self, path: &StoragePath) -> StorageResult<()> {
        self.artifacts.remove(path.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> StoragePath {
        StoragePath::for_application("acme", "payments", "checkout").unwrap()
    }

    fn artifact_path() -> StoragePath {
        StoragePath::for_artifact("acme", "payments", "checkout", "1.2.0").unwrap()
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let store = InMemoryConfigStore::new();
        let record = json!({"id": "abc", "account": "acme"});
        store.write(&path(), &record).await.unwrap();

        assert!(store.exists(&path()).await.unwrap());
        assert_eq!(store.read(&path()).await.unwrap(), record);
    }

    #[tokio::test]
    async fn read_of_missing_path_is_not_found() {
        let store = InMemoryConfigStore::new();
        assert!(matches!(
            store.read(&path()).await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!store.exists(&path()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = InMemoryConfigStore::new();
        store.write(&path(), &json!({})).await.unwrap();
        store.delete(&path()).await.unwrap();
        assert!(!store.exists(&path()).await.unwrap());
    }

    #[tokio::test]
    async fn upload_computes_checksum_and_size() {
        let store = InMemoryConfigStore::new();
        let bytes = b"artifact-bytes".to_vec();
        let reference = store
            .upload_artifact(
                &artifact_path(),
                bytes.clone(),
                ArtifactUpload {
                    size: bytes.len() as u64,
                    content_type: "application/zip".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(reference.size, bytes.len() as u64);
        assert_eq!(reference.checksum, blake3::hash(&bytes).to_hex().to_string());
        assert!(store.has_artifact(&artifact_path()));
    }

    #[tokio::test]
    async fn upload_rejects_size_mismatch() {
        let store = InMemoryConfigStore::new();
        let result = store
            .upload_artifact(
                &artifact_path(),
                b"abc".to_vec(),
                ArtifactUpload {
                    size: 99,
                    content_type: "application/zip".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!store.has_artifact(&artifact_path()));
    }

    #[tokio::test]
    async fn injected_failures_trigger() {
        let store = InMemoryConfigStore::new();
        store.deny_writes_at(&path());
        assert!(matches!(
            store.write(&path(), &json!({})).await,
            Err(StorageError::WriteFailed(_))
        ));

        store.deny_uploads_at(&artifact_path());
        let result = store
            .upload_artifact(
                &artifact_path(),
                b"abc".to_vec(),
                ArtifactUpload {
                    size: 3,
                    content_type: "application/zip".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }
}
