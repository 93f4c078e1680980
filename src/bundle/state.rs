// ABOUTME: Executor state marker types for the type state pattern.
// ABOUTME: A bundle run can only move NotStarted -> Running -> Finished.

use chrono::{DateTime, Local};

use crate::actions::ActionExecutionResult;

use super::ActionBundleExecutionResult;

/// Bundle accepted, nothing run yet.
/// Available actions: `start()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NotStarted;

/// Start time recorded.
/// Available actions: `run()`
#[derive(Debug)]
pub struct Running {
    pub(crate) started: DateTime<Local>,
    pub(crate) results: Vec<ActionExecutionResult>,
}

/// Last action attempted and finish time recorded.
/// Available actions: `result()`, `into_result()`
#[derive(Debug)]
pub struct Finished {
    pub(crate) result: ActionBundleExecutionResult,
}
