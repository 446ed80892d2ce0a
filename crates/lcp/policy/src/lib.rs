//! Access policy generation for LCP versions.
//!
//! The policy collaborator turns a version's declared dependency list into
//! least-privilege policy documents: one for the application at runtime, one
//! for the CI/CD pipeline that provisions the dependencies. The IAM backend
//! that materializes documents is external; this crate owns generation and
//! serialization only.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
mod generator;
mod least_privilege;

pub use error::{PolicyError, PolicyResult};
pub use generator::PolicyGenerator;
pub use least_privilege::LeastPrivilegePolicyGenerator;
