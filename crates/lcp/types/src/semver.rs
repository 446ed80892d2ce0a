//! Semantic versions with the platform's ordering and compatibility rules.
//!
//! The grammar (`major.minor.patch[-prerelease]`) is validated through the
//! `semver` crate, but ordering and compatibility are the platform's own:
//! a release orders above any prerelease of the same triple, prereleases
//! compare bytewise lexicographically, and `0.x` versions are compatible
//! only when both major and minor match.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Option<String>,
}

impl SemanticVersion {
    /// Build a version from components.
    ///
    /// The numeric components are unsigned so out-of-range values are
    /// unrepresentable; only the prerelease charset is validated here.
    pub fn new(
        major: u64,
        minor: u64,
        patch: u64,
        prerelease: Option<&str>,
    ) -> ValidationResult<Self> {
        let prerelease = match prerelease {
            None => None,
            Some("") => {
                return Err(ValidationError::invalid_value(
                    "prerelease",
                    "must not be empty when supplied",
                ))
            }
            Some(p) => {
                ::semver::Prerelease::new(p).map_err(|e| {
                    ValidationError::invalid_format("prerelease", e.to_string())
                })?;
                Some(p.to_string())
            }
        };
        Ok(Self {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    /// Parse `major.minor.patch[-prerelease]`.
    pub fn parse(s: &str) -> ValidationResult<Self> {
        let parsed = ::semver::Version::parse(s)
            .map_err(|e| ValidationError::invalid_format("version", e.to_string()))?;
        if !parsed.build.is_empty() {
            return Err(ValidationError::invalid_format(
                "version",
                "build metadata is not supported",
            ));
        }
        let prerelease = if parsed.pre.is_empty() {
            None
        } else {
            Some(parsed.pre.as_str().to_string())
        };
        Ok(Self {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            prerelease,
        })
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Compatibility under the platform's rules: `0.x` versions require both
    /// major and minor to match (unstable-API rule); `>=1.0.0` versions only
    /// require the major to match (caret-range rule).
    pub fn is_compatible_with(&self, other: &SemanticVersion) -> bool {
        if self.major == 0 || other.major == 0 {
            self.major == other.major && self.minor == other.minor
        } else {
            self.major == other.major
        }
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                // A release orders above any prerelease of the same triple.
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(version: SemanticVersion) -> Self {
        version.to_string()
    }
}
