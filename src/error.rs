// ABOUTME: Application-wide error types for hoppla-deployer.
// ABOUTME: Uses thiserror to wrap the module errors surfaced by CLI commands.

use thiserror::Error;

use crate::bundle::BundleError;
use crate::config::ConfigError;
use crate::report::ReportError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("failed to set up logging: {0}")]
    Logging(String),

    #[error("{failed} of {total} deployments failed")]
    DeploymentsFailed { failed: usize, total: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
