// ABOUTME: Actions that call hooks shipped inside the freshly deployed artifact.
// ABOUTME: An artifact without the hook is reported as "No actions to run.", not as a failure.

use snafu::ResultExt;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::HookSnafu;
use super::{Action, ActionError, ActionKind, ActionOutcome};
use crate::config::{DeploymentPackageConfiguration, InvalidSetting, SELF_HOSTED_HOOKS};
use crate::hooks::{
    AFTER_METHOD, ExtensionHost, HookContext, HookOutcome, RELEASE_NOTES_METHOD, ReleaseNotes,
};

pub const NO_ACTIONS_TO_RUN: &str = "No actions to run.";

/// Where to find a package's hooks and what to tell them.
#[derive(Clone)]
pub struct HookCall {
    host: Arc<dyn ExtensionHost>,
    entry_point: PathBuf,
    type_name: String,
    context: HookContext,
}

impl HookCall {
    pub fn new(
        host: Arc<dyn ExtensionHost>,
        entry_point: impl Into<PathBuf>,
        type_name: impl Into<String>,
        context: HookContext,
    ) -> Self {
        Self {
            host,
            entry_point: entry_point.into(),
            type_name: type_name.into(),
            context,
        }
    }

    pub fn for_package(
        host: Arc<dyn ExtensionHost>,
        config: &DeploymentPackageConfiguration,
    ) -> Result<Self, InvalidSetting> {
        Ok(Self::new(
            host,
            config.entry_point_path(),
            config.identity().hook_type_name(),
            HookContext {
                package: config.name().to_string(),
                target_environment: config.target_environment(),
                self_hosted: config.settings().flag(SELF_HOSTED_HOOKS)?,
            },
        ))
    }

    /// `None` when the artifact does not implement the hook.
    fn call(&self, method: &str) -> Result<Option<String>, ActionError> {
        let context = || HookSnafu {
            method,
            type_name: &self.type_name,
        };

        let extension = self
            .host
            .load(&self.entry_point, &self.context)
            .with_context(|_| context())?;

        match extension
            .invoke(&self.type_name, method)
            .with_context(|_| context())?
        {
            HookOutcome::Returned(value) => Ok(Some(value)),
            HookOutcome::Absent(absence) => {
                tracing::debug!(
                    "{}.{} not implemented ({:?} absent)",
                    self.type_name,
                    method,
                    absence
                );
                Ok(None)
            }
        }
    }

    fn describe(&self, method: &str) -> String {
        format!(
            "call {}.{} in {}",
            self.type_name,
            method,
            self.entry_point.display()
        )
    }
}

/// Runs the artifact's `After` hook.
pub struct AfterDeploymentHook {
    call: HookCall,
}

impl AfterDeploymentHook {
    pub fn new(call: HookCall) -> Self {
        Self { call }
    }
}

impl Action for AfterDeploymentHook {
    fn kind(&self) -> ActionKind {
        ActionKind::AfterDeploymentHook
    }

    fn describe(&self) -> String {
        self.call.describe(AFTER_METHOD)
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let information = self
            .call
            .call(AFTER_METHOD)?
            .unwrap_or_else(|| NO_ACTIONS_TO_RUN.to_string());
        Ok(ActionOutcome::info(information))
    }
}

/// Collects the artifact's release notes and renders them for the report.
pub struct ReleaseNotesHook {
    call: HookCall,
}

impl ReleaseNotesHook {
    pub fn new(call: HookCall) -> Self {
        Self { call }
    }
}

impl Action for ReleaseNotesHook {
    fn kind(&self) -> ActionKind {
        ActionKind::ReleaseNotes
    }

    fn describe(&self) -> String {
        self.call.describe(RELEASE_NOTES_METHOD)
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        match self.call.call(RELEASE_NOTES_METHOD)? {
            Some(text) => {
                let notes = ReleaseNotes::parse(&text);
                Ok(ActionOutcome::release_note(notes.to_html()).with_debug(notes.to_text()))
            }
            None => Ok(ActionOutcome::info(NO_ACTIONS_TO_RUN)),
        }
    }
}
