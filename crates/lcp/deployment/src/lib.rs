//! Deployment orchestration for LCP versions.
//!
//! Two orchestration flows over the storage, policy, and deployment
//! collaborators:
//! - dependency deployment: sequential, declaration order, with best-effort
//!   rollback of already-provisioned dependencies on the first failure
//! - application deployment: a single provider call carrying the cached
//!   artifact path, the generated runtime policy, and the merged tag set
//!
//! Both flows collapse downstream provider failures to `ValidationFailed`;
//! provider-specific causes are visible only in the logs.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
mod orchestrator;
mod provider;
pub mod recording;

pub use error::{DeployError, DeployResult};
pub use orchestrator::{
    DependencyDeploymentReport, DeployRequest, DeploymentOrchestrator, GeneratedPolicies,
};
pub use provider::{
    ApplicationDeployment, DependencyDeployment, DeployProvider, DeploymentOutcome,
};
pub use recording::{ProviderCall, RecordingDeployProvider};
