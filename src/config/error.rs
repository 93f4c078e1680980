// ABOUTME: Configuration error types.
// ABOUTME: Raised while loading deployer.yml and package configs, before any action runs.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{PackageIdentityError, ParseEnumError};

use super::MissingSetting;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found in {0}")]
    NotFound(PathBuf),

    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{file}: missing required key '{key}'")]
    MissingKey { file: String, key: &'static str },

    #[error("{file}: {source}")]
    InvalidValue {
        file: String,
        #[source]
        source: ParseEnumError,
    },

    #[error("{file}: {source}")]
    PackageIdentity {
        file: String,
        #[source]
        source: PackageIdentityError,
    },

    #[error(transparent)]
    MissingSetting(#[from] MissingSetting),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
