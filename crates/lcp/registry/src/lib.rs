//! Configuration use cases for LCP applications and versions.
//!
//! Thin orchestration over the entity types and the storage collaborator:
//! init, read, update, delete, staleness validation, and artifact caching.
//! Writes are last-write-wins; the storage collaborator owns record-level
//! atomicity.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod application;
mod error;
mod version;

pub use application::ApplicationRegistry;
pub use error::{ConfigurationError, ConfigurationResult};
pub use version::{InitVersion, VersionRegistry};
