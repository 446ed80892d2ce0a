//! Canonical storage path derivation.
//!
//! Paths are derived, never stored as source of truth: equal
//! `(account, team, moniker[, version])` inputs always derive the identical
//! path. Path existence in the storage collaborator is the uniqueness check
//! for applications and versions; no separate index exists.
//!
//! Stable templates:
//! - bucket: `lcp-{account}-{team}-{moniker}/`
//! - application config: `{bucket}app.config`
//! - version directory: `{bucket}versions/{version}/`
//! - version config: `{versionDir}appversion.config`
//! - artifact: `{versionDir}artifact`

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const APPLICATION_CONFIG_FILE: &str = "app.config";
const VERSION_CONFIG_FILE: &str = "appversion.config";
const ARTIFACT_FILE: &str = "artifact";

/// A derived storage location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoragePath(String);

impl StoragePath {
    /// Derive the bucket path for an application.
    pub fn bucket(account: &str, team: &str, moniker: &str) -> ValidationResult<Self> {
        let account = validated_segment("account", account)?;
        let team = validated_segment("team", team)?;
        let moniker = validated_segment("moniker", moniker)?;
        Ok(Self(format!("lcp-{account}-{team}-{moniker}/")))
    }

    /// Derive the application configuration path.
    pub fn for_application(account: &str, team: &str, moniker: &str) -> ValidationResult<Self> {
        let bucket = Self::bucket(account, team, moniker)?;
        Ok(Self(format!("{}{APPLICATION_CONFIG_FILE}", bucket.0)))
    }

    /// Derive the directory holding one version's configuration and artifact.
    pub fn version_directory(
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
    ) -> ValidationResult<Self> {
        let bucket = Self::bucket(account, team, moniker)?;
        let version = validated_version_segment(version)?;
        Ok(Self(format!("{}versions/{version}/", bucket.0)))
    }

    /// Derive the version configuration path.
    pub fn for_version(
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
    ) -> ValidationResult<Self> {
        let dir = Self::version_directory(account, team, moniker, version)?;
        Ok(Self(format!("{}{VERSION_CONFIG_FILE}", dir.0)))
    }

    /// Derive the artifact path for one version.
    pub fn for_artifact(
        account: &str,
        team: &str,
        moniker: &str,
        version: &str,
    ) -> ValidationResult<Self> {
        let dir = Self::version_directory(account, team, moniker, version)?;
        Ok(Self(format!("{}{ARTIFACT_FILE}", dir.0)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validated_segment(field: &'static str, value: &str) -> ValidationResult<String> {
    if value.is_empty() {
        return Err(ValidationError::MissingRequired(field));
    }
    let valid = value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !valid {
        return Err(ValidationError::invalid_format(
            field,
            "must contain only alphanumerics, underscores, and hyphens",
        ));
    }
    Ok(value.to_string())
}

/// Version segments additionally allow dots so semantic version strings
/// (`1.2.0`, `1.2.0-beta.1`) remain addressable.
fn validated_version_segment(value: &str) -> ValidationResult<String> {
    if value.is_empty() {
        return Err(ValidationError::MissingRequired("version"));
    }
    let valid = value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.');
    if !valid {
        return Err(ValidationError::invalid_format(
            "version",
            "must contain only alphanumerics, dots, underscores, and hyphens",
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_path_matches_template() {
        let path = StoragePath::for_application("acme", "payments", "checkout").unwrap();
        assert_eq!(path.as_str(), "lcp-acme-payments-checkout/app.config");
    }

    #[test]
    fn version_paths_match_templates() {
        let config = StoragePath::for_version("acme", "payments", "checkout", "1.2.0").unwrap();
        assert_eq!(
            config.as_str(),
            "lcp-acme-payments-checkout/versions/1.2.0/appversion.config"
        );

        let artifact = StoragePath::for_artifact("acme", "payments", "checkout", "1.2.0").unwrap();
        assert_eq!(
            artifact.as_str(),
            "lcp-acme-payments-checkout/versions/1.2.0/artifact"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = StoragePath::for_application("acme", "payments", "checkout").unwrap();
        let b = StoragePath::for_application("acme", "payments", "checkout").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_empty_and_invalid_segments() {
        assert_eq!(
            StoragePath::for_application("", "payments", "checkout"),
            Err(ValidationError::MissingRequired("account"))
        );
        assert!(matches!(
            StoragePath::for_application("acme", "pay/ments", "checkout"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(
            StoragePath::for_version("acme", "payments", "checkout", ""),
            Err(ValidationError::MissingRequired("version"))
        );
    }
}
