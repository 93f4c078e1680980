// ABOUTME: Bundle factory: expands a package's deployment type into its ordered actions.
// ABOUTME: The order lives in a policy table; settings are looked up before any action runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{ActionBundle, BundleError};
use crate::actions::{
    Action, ActionExt, AfterDeploymentHook, ApplyTargetEnvironmentConfig, BackupCurrentRelease,
    Clock, DeleteDirectoryContent, ExtractArchive, HookCall, MoveToReleaseHistory,
    ReleaseNotesHook, StartService, StopService, SystemClock, VerifyHttpResponse,
};
use crate::config::{
    DeploymentPackageConfiguration, IIS_SITE_NAME, VERIFY_HTTP_RESPONSE_URI, WINDOWS_SERVICE_NAME,
};
use crate::control::{ServiceControl, ServiceKind};
use crate::hooks::ExtensionHost;
use crate::types::DeploymentType;

/// One row entry of the policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    StopSite,
    StopService,
    Backup,
    ClearTarget,
    Extract,
    ApplyEnvironmentConfig,
    MoveToHistory,
    StartSite,
    StartService,
    VerifyHttp,
    AfterDeployHook,
    ReleaseNotes,
}

const IIS_SITE_STEPS: &[Step] = &[
    Step::StopSite,
    Step::Backup,
    Step::ClearTarget,
    Step::Extract,
    Step::ApplyEnvironmentConfig,
    Step::MoveToHistory,
    Step::StartSite,
    Step::VerifyHttp,
    Step::AfterDeployHook,
    Step::ReleaseNotes,
];

const EXECUTABLE_STEPS: &[Step] = &[
    Step::Backup,
    Step::ClearTarget,
    Step::Extract,
    Step::ApplyEnvironmentConfig,
    Step::MoveToHistory,
    Step::AfterDeployHook,
    Step::ReleaseNotes,
];

const WINDOWS_SERVICE_STEPS: &[Step] = &[
    Step::StopService,
    Step::Backup,
    Step::ClearTarget,
    Step::Extract,
    Step::ApplyEnvironmentConfig,
    Step::MoveToHistory,
    Step::StartService,
    Step::AfterDeployHook,
    Step::ReleaseNotes,
];

/// Deployment type to ordered steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    steps: HashMap<DeploymentType, Vec<Step>>,
}

impl Policy {
    /// A policy with no rows; every deployment type is unknown to it.
    pub fn empty() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    pub fn with(mut self, deployment_type: DeploymentType, steps: &[Step]) -> Self {
        self.steps.insert(deployment_type, steps.to_vec());
        self
    }

    pub fn steps(&self, deployment_type: DeploymentType) -> Option<&[Step]> {
        self.steps.get(&deployment_type).map(Vec::as_slice)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::empty()
            .with(DeploymentType::IisSite, IIS_SITE_STEPS)
            .with(DeploymentType::Executable, EXECUTABLE_STEPS)
            .with(DeploymentType::WindowsService, WINDOWS_SERVICE_STEPS)
    }
}

/// Builds bundles from package configurations.
///
/// Collaborators are injected once at startup; the factory never looks them
/// up on its own.
pub struct BundleFactory {
    policy: Policy,
    control: Arc<dyn ServiceControl>,
    hooks: Arc<dyn ExtensionHost>,
    clock: Arc<dyn Clock>,
    http_timeout: Duration,
    dry_run: bool,
}

impl BundleFactory {
    pub fn new(control: Arc<dyn ServiceControl>, hooks: Arc<dyn ExtensionHost>) -> Self {
        Self {
            policy: Policy::default(),
            control,
            hooks,
            clock: Arc::new(SystemClock),
            http_timeout: Duration::from_secs(10 * 60),
            dry_run: false,
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Wrap every built action so nothing is changed when the bundle runs.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the bundle for one package. Fails without side effects when the
    /// deployment type has no policy row or a required setting is missing.
    pub fn build(&self, config: &DeploymentPackageConfiguration) -> Result<ActionBundle, BundleError> {
        let steps = self.policy.steps(config.deployment_type()).ok_or_else(|| {
            BundleError::UnknownDeploymentType {
                package: config.name().to_string(),
                deployment_type: config.deployment_type(),
            }
        })?;

        let actions = steps
            .iter()
            .map(|step| self.action_for(*step, config))
            .collect::<Result<Vec<_>, _>>()?;

        let bundle = ActionBundle::new(config.name(), config.target_environment(), actions)?;
        tracing::debug!("Built {:?}", bundle);

        Ok(if self.dry_run {
            bundle.simulated()
        } else {
            bundle
        })
    }

    fn action_for(
        &self,
        step: Step,
        config: &DeploymentPackageConfiguration,
    ) -> Result<Box<dyn Action>, BundleError> {
        let settings = config.settings();
        let target = config.target_path();

        let action = match step {
            Step::StopSite => StopService::new(
                self.control.clone(),
                ServiceKind::Site,
                settings.require(IIS_SITE_NAME)?,
            )
            .boxed(),
            Step::StopService => StopService::new(
                self.control.clone(),
                ServiceKind::WindowsService,
                settings.require(WINDOWS_SERVICE_NAME)?,
            )
            .boxed(),
            Step::Backup => BackupCurrentRelease::new(
                config.name(),
                target,
                config.release_backup_path(),
                self.clock.clone(),
            )
            .boxed(),
            Step::ClearTarget => DeleteDirectoryContent::new(target)
                .named("Delete current release")
                .boxed(),
            Step::Extract => ExtractArchive::new(config.archive_path(), target)
                .named("Extract new release")
                .boxed(),
            Step::ApplyEnvironmentConfig => ApplyTargetEnvironmentConfig::new(
                config.deployment_type(),
                config.target_environment(),
                target,
                config.entry_point_file_name(),
            )
            .boxed(),
            Step::MoveToHistory => MoveToReleaseHistory::new(
                config.archive_path(),
                config.release_history_path(),
                self.clock.clone(),
            )
            .boxed(),
            Step::StartSite => StartService::new(
                self.control.clone(),
                ServiceKind::Site,
                settings.require(IIS_SITE_NAME)?,
            )
            .boxed(),
            Step::StartService => StartService::new(
                self.control.clone(),
                ServiceKind::WindowsService,
                settings.require(WINDOWS_SERVICE_NAME)?,
            )
            .boxed(),
            Step::VerifyHttp => VerifyHttpResponse::new(
                settings.require(VERIFY_HTTP_RESPONSE_URI)?,
                settings.verify_status()?,
                self.http_timeout,
            )
            .boxed(),
            Step::AfterDeployHook => {
                AfterDeploymentHook::new(HookCall::for_package(self.hooks.clone(), config)?).boxed()
            }
            Step::ReleaseNotes => {
                ReleaseNotesHook::new(HookCall::for_package(self.hooks.clone(), config)?).boxed()
            }
        };

        Ok(action)
    }
}
