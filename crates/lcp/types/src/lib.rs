//! Core types for the LCP configuration and deployment platform.
//!
//! This crate defines the domain vocabulary shared by every other LCP crate:
//! - validated identity and addressing types (ids, team/moniker, storage paths)
//! - semantic versions with the platform's compatibility rules
//! - resource tagging with the reserved `lc:` namespace
//! - the Application, Version, and Deployment aggregates
//! - storage-neutral record shapes for persistence
//! - policy document types consumed by the policy collaborator
//!
//! Design stance:
//! - Aggregates keep their fields module-private; the only way to obtain one
//!   is through a validated factory or record reconstruction, both of which
//!   return `Result<_, ValidationError>`.
//! - Records are plain serde shapes; reconstruction re-validates everything.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod application;
mod dependency;
mod deployment;
mod error;
mod ids;
mod moniker;
mod path;
mod policy;
mod semver;
mod tags;
mod version;

pub use application::{Application, ApplicationMetadata, ApplicationRecord};
pub use dependency::DependencyConfiguration;
pub use deployment::{Deployment, DeploymentRecord, DeploymentStatus, DeployedResource};
pub use error::{ValidationError, ValidationResult};
pub use ids::{ApplicationId, DeploymentId, VersionId};
pub use moniker::TeamMoniker;
pub use path::StoragePath;
pub use policy::{Effect, PolicyDocument, PolicyStatement, POLICY_DOCUMENT_VERSION};
pub use self::semver::SemanticVersion;
pub use tags::{ResourceTags, MANAGED_BY_TAG_VALUE, RESERVED_TAG_PREFIX};
pub use version::{ArtifactReference, PolicyReferences, Version, VersionMetadata, VersionRecord};
