// ABOUTME: Promotes the target environment's config file to the canonical config name.
// ABOUTME: Every environment named candidate is removed afterwards.

use snafu::{ResultExt, ensure};
use std::fs;
use std::io;
use std::path::PathBuf;

use super::error::{EnvironmentConfigMissingSnafu, IoSnafu};
use super::{Action, ActionError, ActionKind, ActionOutcome};
use crate::types::{DeploymentType, TargetEnvironment};

const SITE_CONFIG: &str = "Web.config";

pub struct ApplyTargetEnvironmentConfig {
    deployment_type: DeploymentType,
    target_environment: TargetEnvironment,
    target_dir: PathBuf,
    entry_point_file_name: String,
}

impl ApplyTargetEnvironmentConfig {
    pub fn new(
        deployment_type: DeploymentType,
        target_environment: TargetEnvironment,
        target_dir: impl Into<PathBuf>,
        entry_point_file_name: impl Into<String>,
    ) -> Self {
        Self {
            deployment_type,
            target_environment,
            target_dir: target_dir.into(),
            entry_point_file_name: entry_point_file_name.into(),
        }
    }

    /// `Web.config` for sites, `<entry point>.config` for everything else.
    pub fn canonical_file_name(&self) -> String {
        match self.deployment_type {
            DeploymentType::IisSite => SITE_CONFIG.to_string(),
            DeploymentType::Executable | DeploymentType::WindowsService => {
                format!("{}.config", self.entry_point_file_name)
            }
        }
    }
}

impl Action for ApplyTargetEnvironmentConfig {
    fn kind(&self) -> ActionKind {
        ActionKind::ApplyTargetEnvironmentConfig
    }

    fn describe(&self) -> String {
        format!(
            "copy {} to {} in {}",
            self.target_environment.config_file_name(),
            self.canonical_file_name(),
            self.target_dir.display()
        )
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let source = self
            .target_dir
            .join(self.target_environment.config_file_name());
        ensure!(
            source.is_file(),
            EnvironmentConfigMissingSnafu { path: &source }
        );

        let canonical = self.target_dir.join(self.canonical_file_name());
        fs::copy(&source, &canonical).context(IoSnafu {
            operation: "copy",
            path: &source,
        })?;

        for environment in TargetEnvironment::ALL {
            let candidate = self.target_dir.join(environment.config_file_name());
            match fs::remove_file(&candidate) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).context(IoSnafu {
                        operation: "delete",
                        path: &candidate,
                    });
                }
            }
        }

        Ok(ActionOutcome::done().with_debug(format!(
            "{} applied as {}",
            self.target_environment.config_file_name(),
            canonical.display()
        )))
    }
}
