// ABOUTME: Per-package deployment configuration and its discovery.
// ABOUTME: Pairs packages/<name>.yml files with Release.<name>.<date>.zip archives.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::{DeploymentType, PackageIdentity, TargetEnvironment};

use super::error::{ConfigError, Result};
use super::{GlobalPaths, Settings};

/// Raw shape of a package config file. Every field is optional here so that
/// a missing key surfaces as a [`ConfigError::MissingKey`] naming the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageFile {
    #[serde(default)]
    pub deployment_type: Option<String>,

    #[serde(default)]
    pub target_environment: Option<String>,

    #[serde(default)]
    pub target_path: Option<PathBuf>,

    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

impl PackageFile {
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }
}

/// Immutable description of one package to deploy.
///
/// Constructed only through [`DeploymentPackageConfiguration::new`], which
/// validates everything up front; there is no partially valid value.
#[derive(Debug, Clone)]
pub struct DeploymentPackageConfiguration {
    identity: PackageIdentity,
    config_name: String,
    deployment_type: DeploymentType,
    target_environment: TargetEnvironment,
    target_path: PathBuf,
    archive_path: PathBuf,
    entry_point_file_name: String,
    release_history_path: PathBuf,
    release_backup_path: PathBuf,
    settings: Settings,
}

impl DeploymentPackageConfiguration {
    pub fn new(
        config_name: &str,
        file: PackageFile,
        archive_path: &Path,
        paths: &GlobalPaths,
    ) -> Result<Self> {
        let origin = format!("{config_name} package config");

        let deployment_type = file
            .deployment_type
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey {
                file: origin.clone(),
                key: "deployment_type",
            })?
            .parse::<DeploymentType>()
            .map_err(|source| ConfigError::InvalidValue {
                file: origin.clone(),
                source,
            })?;

        let target_environment = file
            .target_environment
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey {
                file: origin.clone(),
                key: "target_environment",
            })?
            .parse::<TargetEnvironment>()
            .map_err(|source| ConfigError::InvalidValue {
                file: origin.clone(),
                source,
            })?;

        let target_path = file
            .target_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| ConfigError::MissingKey {
                file: origin.clone(),
                key: "target_path",
            })?;

        let identity = PackageIdentity::from_archive_path(archive_path).map_err(|source| {
            ConfigError::PackageIdentity {
                file: archive_path.display().to_string(),
                source,
            }
        })?;

        let entry_point_file_name = identity.entry_point_file_name(deployment_type);
        let settings = Settings::new(identity.name(), file.settings);

        Ok(Self {
            identity,
            config_name: config_name.to_string(),
            deployment_type,
            target_environment,
            target_path,
            archive_path: archive_path.to_path_buf(),
            entry_point_file_name,
            release_history_path: paths.release_history.clone(),
            release_backup_path: paths.release_backup.clone(),
            settings,
        })
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    /// Logical package name, e.g. `Shop_Web`.
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    /// Name of the package config file this package was discovered from.
    pub fn config_name(&self) -> &str {
        &self.config_name
    }

    pub fn deployment_type(&self) -> DeploymentType {
        self.deployment_type
    }

    pub fn target_environment(&self) -> TargetEnvironment {
        self.target_environment
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn entry_point_file_name(&self) -> &str {
        &self.entry_point_file_name
    }

    /// Where the entry point binary lands after extraction. Sites keep
    /// their binaries under `bin`.
    pub fn entry_point_path(&self) -> PathBuf {
        let mut path = self.target_path.clone();
        if self.deployment_type == DeploymentType::IisSite {
            path.push("bin");
        }
        path.push(&self.entry_point_file_name);
        path
    }

    pub fn release_history_path(&self) -> &Path {
        &self.release_history_path
    }

    pub fn release_backup_path(&self) -> &Path {
        &self.release_backup_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_eligible(&self) -> bool {
        self.archive_path.is_file()
    }
}

/// A package config file that could not be turned into a configuration.
#[derive(Debug)]
pub struct RejectedPackage {
    pub config_file: PathBuf,
    pub error: ConfigError,
}

/// Outcome of scanning the package config directory.
#[derive(Debug, Default)]
pub struct Discovery {
    pub packages: Vec<DeploymentPackageConfiguration>,
    pub rejected: Vec<RejectedPackage>,
}

/// Scan `packages_dir` for package config files and pair each with its
/// delivery archive in the monitored path. Packages without an archive are
/// not pending and are left out silently.
pub fn discover_packages(packages_dir: &Path, paths: &GlobalPaths) -> Result<Discovery> {
    let config_files = list_files(packages_dir, |name| {
        name.ends_with(".yml") || name.ends_with(".yaml")
    })?;
    let archives = list_files(&paths.monitored_delivery, |name| name.ends_with(".zip"))?;

    let mut discovery = Discovery::default();

    for config_file in config_files {
        let Some(config_name) = config_file.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let Some(archive) = find_archive(&archives, config_name) else {
            tracing::debug!("No pending delivery for {}", config_name);
            continue;
        };

        let built = PackageFile::load(&config_file).and_then(|file| {
            DeploymentPackageConfiguration::new(config_name, file, archive, paths)
        });

        match built {
            Ok(package) if package.is_eligible() => discovery.packages.push(package),
            Ok(_) => {}
            Err(error) => discovery.rejected.push(RejectedPackage {
                config_file: config_file.clone(),
                error,
            }),
        }
    }

    Ok(discovery)
}

/// First archive named `Release.<config_name>.<...>.zip`.
fn find_archive<'a>(archives: &'a [PathBuf], config_name: &str) -> Option<&'a PathBuf> {
    let prefix = format!("Release.{config_name}.");
    archives.iter().find(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&prefix))
    })
}

fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| ConfigError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let wanted = path.is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(&keep);
        if wanted {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
