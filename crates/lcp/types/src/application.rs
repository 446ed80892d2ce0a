//! The Application aggregate and its persisted record shape.

use crate::error::{validate_optional_field, ValidationError, ValidationResult};
use crate::ids::ApplicationId;
use crate::moniker::TeamMoniker;
use crate::path::StoragePath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optional descriptive metadata attached to an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_tags: Option<BTreeMap<String, String>>,
}

impl ApplicationMetadata {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_optional_field("display name", &self.display_name)?;
        validate_optional_field("description", &self.description)?;
        validate_optional_field("owner", &self.owner)?;
        if let Some(tags) = &self.custom_tags {
            for key in tags.keys() {
                if key.is_empty() {
                    return Err(ValidationError::invalid_value(
                        "custom tags",
                        "tag keys must not be empty",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A registered deployable application.
///
/// Created once; `metadata` and `updated_at` are the only mutable fields and
/// change only through [`Application::update`]. Equality is identity equality
/// by id.
#[derive(Debug, Clone)]
pub struct Application {
    id: ApplicationId,
    account: String,
    team_moniker: TeamMoniker,
    storage_path: StoragePath,
    metadata: Option<ApplicationMetadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Application {
    /// Register a new application.
    pub fn create(
        account: &str,
        team_moniker: TeamMoniker,
        metadata: Option<ApplicationMetadata>,
    ) -> ValidationResult<Self> {
        if account.is_empty() {
            return Err(ValidationError::MissingRequired("account"));
        }
        if let Some(metadata) = &metadata {
            metadata.validate()?;
        }
        let storage_path =
            StoragePath::for_application(account, team_moniker.team(), team_moniker.moniker())?;
        let now = Utc::now();
        Ok(Self {
            id: ApplicationId::generate()?,
            account: account.to_string(),
            team_moniker,
            storage_path,
            metadata,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> &ApplicationId {
        &self.id
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn team_moniker(&self) -> &TeamMoniker {
        &self.team_moniker
    }

    pub fn storage_path(&self) -> &StoragePath {
        &self.storage_path
    }

    pub fn metadata(&self) -> Option<&ApplicationMetadata> {
        self.metadata.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the metadata. Always refreshes `updated_at`, even when the new
    /// metadata equals the old.
    pub fn update(&mut self, metadata: Option<ApplicationMetadata>) -> ValidationResult<()> {
        if let Some(metadata) = &metadata {
            metadata.validate()?;
        }
        self.metadata = metadata;
        self.touch();
        Ok(())
    }

    /// Refresh `updated_at` with monotonically non-decreasing wall-clock
    /// time: a clock step backwards never rewinds the timestamp.
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Serialize to the storage-neutral record shape.
    pub fn to_record(&self) -> ApplicationRecord {
        ApplicationRecord {
            id: self.id.to_string(),
            account: self.account.clone(),
            team: self.team_moniker.team().to_string(),
            moniker: self.team_moniker.moniker().to_string(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Reconstruct from a stored record, re-validating every field.
    pub fn from_record(record: ApplicationRecord) -> ValidationResult<Self> {
        let id = ApplicationId::parse(&record.id)?;
        if record.account.is_empty() {
            return Err(ValidationError::MissingRequired("account"));
        }
        let team_moniker = TeamMoniker::new(&record.team, &record.moniker)?;
        if let Some(metadata) = &record.metadata {
            metadata.validate()?;
        }
        let storage_path = StoragePath::for_application(
            &record.account,
            team_moniker.team(),
            team_moniker.moniker(),
        )?;
        Ok(Self {
            id,
            account: record.account,
            team_moniker,
            storage_path,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

// Aggregate identity: two Application values are the same application iff
// their ids match, regardless of metadata drift.
impl PartialEq for Application {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Application {}

/// Persisted application record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: String,
    pub account: String,
    pub team: String,
    pub moniker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ApplicationMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
