// ABOUTME: Outcome of running one bundle: who, where, when, and each action's result.
// ABOUTME: Holds only the results actually produced; a failure cuts the list short.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::actions::ActionExecutionResult;
use crate::types::TargetEnvironment;

#[derive(Debug, Clone, Serialize)]
pub struct ActionBundleExecutionResult {
    pub package: String,
    pub target_environment: TargetEnvironment,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
    pub results: Vec<ActionExecutionResult>,
}

impl ActionBundleExecutionResult {
    /// True when every captured result succeeded.
    pub fn success(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    /// The action that stopped the bundle, if any.
    pub fn failure(&self) -> Option<&ActionExecutionResult> {
        self.results.iter().find(|r| !r.success)
    }

    pub fn release_notes(&self) -> impl Iterator<Item = &ActionExecutionResult> {
        self.results.iter().filter(|r| r.is_release_note)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished - self.started
    }
}
