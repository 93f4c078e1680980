// ABOUTME: Configuration errors raised while building a bundle.
// ABOUTME: All of them surface before any action has run.

use crate::config::{InvalidSetting, MissingSetting};
use crate::types::DeploymentType;

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("bundle for '{package}' contains no actions")]
    Empty { package: String },

    #[error("no deployment policy for {deployment_type} (package '{package}')")]
    UnknownDeploymentType {
        package: String,
        deployment_type: DeploymentType,
    },

    #[error(transparent)]
    MissingSetting(#[from] MissingSetting),

    #[error(transparent)]
    InvalidSetting(#[from] InvalidSetting),
}
