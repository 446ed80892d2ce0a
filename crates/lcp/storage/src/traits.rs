//! The storage collaborator contract.

use crate::StorageResult;
use async_trait::async_trait;
use lcp_types::{ArtifactReference, StoragePath};
use serde_json::Value;

/// Caller-declared metadata for an artifact upload.
#[derive(Debug, Clone)]
pub struct ArtifactUpload {
    /// Declared payload size in bytes.
    pub size: u64,

    /// MIME type of the artifact.
    pub content_type: String,
}

/// Storage interface for configuration records and build artifacts.
///
/// Implementations choose their own transport and consistency model; the
/// core requires only last-write-wins semantics and that `exists` agrees
/// with `read` for the same path.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Check whether a record exists at the path.
    async fn exists(&self, path: &StoragePath) -> StorageResult<bool>;

    /// Read the record at the path.
    async fn read(&self, path: &StoragePath) -> StorageResult<Value>;

    /// Write (create or replace) the record at the path.
    async fn write(&self, path: &StoragePath, record: &Value) -> StorageResult<()>;

    /// Delete the record at the path.
    async fn delete(&self, path: &StoragePath) -> StorageResult<()>;

    /// Upload an artifact and return its canonical reference, including the
    /// checksum computed by the store.
    async fn upload_artifact(
        &self,
        path: &StoragePath,
        bytes: Vec<u8>,
        upload: ArtifactUpload,
    ) -> StorageResult<ArtifactReference>;

    /// Delete the artifact at the path. Deleting a missing artifact is not
    /// an error.
    async fn delete_artifact(&self, path: &StoragePath) -> StorageResult<()>;
}
