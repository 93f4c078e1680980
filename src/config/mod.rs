// ABOUTME: Configuration types and parsing for deployer.yml.
// ABOUTME: Handles discovery, derived working paths and directory bootstrap.

mod error;
mod init;
mod package;
mod settings;

pub use error::{ConfigError, Result};
pub use init::init_config;
pub use package::{
    DeploymentPackageConfiguration, Discovery, PackageFile, RejectedPackage, discover_packages,
};
pub use settings::{
    DEFAULT_VERIFY_STATUS, IIS_SITE_NAME, InvalidSetting, MissingSetting, SELF_HOSTED_HOOKS,
    Settings, VERIFY_HTTP_RESPONSE_STATUS, VERIFY_HTTP_RESPONSE_URI, WINDOWS_SERVICE_NAME,
};

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "deployer.yml";
pub const CONFIG_FILENAME_ALT: &str = "deployer.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".deployer/config.yml";

pub const RELEASE_HISTORY_DIR: &str = "ReleaseHistory";
pub const RELEASE_BACKUP_DIR: &str = "ReleaseBackup";
pub const MONITORED_DELIVERY_DIR: &str = "MonitoredDelivery";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub working_directory: PathBuf,

    #[serde(default = "default_packages_directory")]
    pub packages_directory: PathBuf,

    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default = "default_http_timeout", with = "humantime_serde")]
    pub http_timeout: Duration,

    #[serde(default = "default_hook_timeout", with = "humantime_serde")]
    pub hook_timeout: Duration,

    /// Program that loads an artifact's entry point and runs one of its hooks.
    #[serde(default)]
    pub hook_runner: Option<PathBuf>,

    #[serde(default)]
    pub report: ReportConfig,

    /// Directory of the loaded config file; relative paths resolve against it.
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub json_file: Option<PathBuf>,
}

fn default_packages_directory() -> PathBuf {
    PathBuf::from("packages")
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_hook_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

/// Global directories every package shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPaths {
    pub working_directory: PathBuf,
    pub release_history: PathBuf,
    pub release_backup: PathBuf,
    pub monitored_delivery: PathBuf,
}

impl GlobalPaths {
    pub fn under(working_directory: &Path) -> Self {
        Self {
            working_directory: working_directory.to_path_buf(),
            release_history: working_directory.join(RELEASE_HISTORY_DIR),
            release_backup: working_directory.join(RELEASE_BACKUP_DIR),
            monitored_delivery: working_directory.join(MONITORED_DELIVERY_DIR),
        }
    }

    /// Create any of the global directories that do not exist yet.
    pub fn bootstrap(&self) -> Result<()> {
        for dir in [
            &self.working_directory,
            &self.monitored_delivery,
            &self.release_backup,
            &self.release_history,
        ] {
            if !dir.is_dir() {
                tracing::info!("Creating {}", dir.display());
                std::fs::create_dir_all(dir).map_err(|source| ConfigError::CreateDir {
                    path: dir.clone(),
                    source,
                })?;
            }
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self> {
        let mut config: AppConfig =
            serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(ConfigError::NotFound(dir.to_path_buf()))
    }

    pub fn paths(&self) -> GlobalPaths {
        GlobalPaths::under(&self.resolve(&self.working_directory))
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.resolve(&self.packages_directory)
    }

    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file.as_deref().map(|p| self.resolve(p))
    }

    pub fn hook_runner_path(&self) -> Option<PathBuf> {
        self.hook_runner.as_deref().map(|p| self.resolve(p))
    }

    pub fn report_file(&self) -> Option<PathBuf> {
        self.report.json_file.as_deref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
