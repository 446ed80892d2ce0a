//! Resource tagging with the reserved `lc:` namespace.

use crate::error::{ValidationError, ValidationResult};
use std::collections::BTreeMap;

/// Key prefix reserved for platform-managed tags.
pub const RESERVED_TAG_PREFIX: &str = "lc:";

/// Value of the `lc:managed-by` marker on every provisioned resource.
pub const MANAGED_BY_TAG_VALUE: &str = "lcp";

const ACCOUNT_KEY: &str = "lc:account";
const TEAM_KEY: &str = "lc:team";
const APPLICATION_KEY: &str = "lc:application";
const VERSION_KEY: &str = "lc:version";
const ENVIRONMENT_KEY: &str = "lc:environment";
const MANAGED_BY_KEY: &str = "lc:managed-by";

/// An immutable tag set applied to every provisioned resource.
///
/// Always carries the six mandatory platform tags; custom tags are merged
/// through [`ResourceTags::with_custom_tags`], which rejects any key in the
/// reserved namespace or colliding with an existing key. A single collision
/// aborts the whole merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTags {
    tags: BTreeMap<String, String>,
}

impl ResourceTags {
    /// Build the mandatory tag set.
    pub fn new(
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
        environment: &str,
    ) -> ValidationResult<Self> {
        require("account", account)?;
        require("team", team)?;
        require("moniker", moniker)?;
        require("version", version)?;
        require("environment", environment)?;

        let mut tags = BTreeMap::new();
        tags.insert(ACCOUNT_KEY.to_string(), account.to_string());
        tags.insert(TEAM_KEY.to_string(), team.to_string());
        tags.insert(APPLICATION_KEY.to_string(), moniker.to_string());
        tags.insert(VERSION_KEY.to_string(), version.to_string());
        tags.insert(ENVIRONMENT_KEY.to_string(), environment.to_string());
        tags.insert(MANAGED_BY_KEY.to_string(), MANAGED_BY_TAG_VALUE.to_string());
        Ok(Self { tags })
    }

    /// Reconstruct a tag set from a stored map, checking the platform keys
    /// are still present.
    pub fn from_map(map: BTreeMap<String, String>) -> ValidationResult<Self> {
        for key in [
            ACCOUNT_KEY,
            TEAM_KEY,
            APPLICATION_KEY,
            VERSION_KEY,
            ENVIRONMENT_KEY,
            MANAGED_BY_KEY,
        ] {
            if !map.contains_key(key) {
                return Err(ValidationError::invalid_value(
                    "tags",
                    format!("missing mandatory tag {key}"),
                ));
            }
        }
        Ok(Self { tags: map })
    }

    /// Merge caller-supplied custom tags into a new tag set.
    ///
    /// Every custom key is validated before any is inserted, so a collision
    /// anywhere leaves no partial merge observable.
    pub fn with_custom_tags(self, custom: &BTreeMap<String, String>) -> ValidationResult<Self> {
        for key in custom.keys() {
            if key.starts_with(RESERVED_TAG_PREFIX) {
                return Err(ValidationError::TagCollision(key.clone()));
            }
            if self.tags.contains_key(key) {
                return Err(ValidationError::TagCollision(key.clone()));
            }
        }
        let mut tags = self.tags;
        for (key, value) in custom {
            tags.insert(key.clone(), value.clone());
        }
        Ok(Self { tags })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.tags.clone()
    }
}

fn require(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::MissingRequired(field));
    }
    Ok(())
}
