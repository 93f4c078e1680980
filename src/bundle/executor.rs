// ABOUTME: Runs a bundle's actions in order and stops at the first failure.
// ABOUTME: The only place where an action's fault is turned into a result.

use chrono::Local;
use std::panic::{self, AssertUnwindSafe};

use super::state::{Finished, NotStarted, Running};
use super::{ActionBundle, ActionBundleExecutionResult};
use crate::actions::{Action, ActionExecutionResult, Fault};

/// A bundle run, parameterized by its current state.
#[derive(Debug)]
pub struct BundleExecutor<S> {
    bundle: ActionBundle,
    state: S,
}

impl BundleExecutor<NotStarted> {
    pub fn new(bundle: ActionBundle) -> Self {
        Self {
            bundle,
            state: NotStarted,
        }
    }

    /// Record the start time.
    pub fn start(self) -> BundleExecutor<Running> {
        tracing::info!(
            "Deploying {} to {} ({} actions)",
            self.bundle.package(),
            self.bundle.target_environment(),
            self.bundle.len()
        );
        BundleExecutor {
            state: Running {
                started: Local::now(),
                results: Vec::with_capacity(self.bundle.len()),
            },
            bundle: self.bundle,
        }
    }
}

impl BundleExecutor<Running> {
    /// Invoke each action in order until one fails or all have run.
    pub fn run(self) -> BundleExecutor<Finished> {
        let BundleExecutor { bundle, state } = self;
        let Running {
            started,
            mut results,
        } = state;

        for action in bundle.actions() {
            let result = invoke(action);
            let failed = !result.success;
            results.push(result);
            if failed {
                break;
            }
        }

        let result = ActionBundleExecutionResult {
            package: bundle.package().to_string(),
            target_environment: bundle.target_environment(),
            started,
            finished: Local::now(),
            results,
        };

        if result.success() {
            tracing::info!("{} deployed", result.package);
        } else {
            tracing::warn!(
                "{} failed after {} of {} actions",
                result.package,
                result.results.len(),
                bundle.len()
            );
        }

        BundleExecutor {
            bundle,
            state: Finished { result },
        }
    }
}

impl BundleExecutor<Finished> {
    pub fn result(&self) -> &ActionBundleExecutionResult {
        &self.state.result
    }

    pub fn into_result(self) -> ActionBundleExecutionResult {
        self.state.result
    }
}

impl<S> BundleExecutor<S> {
    pub fn bundle(&self) -> &ActionBundle {
        &self.bundle
    }
}

/// Run a bundle from start to finish.
pub fn execute(bundle: ActionBundle) -> ActionBundleExecutionResult {
    BundleExecutor::new(bundle).start().run().into_result()
}

/// Run one action, turning an `Err` or a panic into a failed result.
pub fn invoke(action: &dyn Action) -> ActionExecutionResult {
    let name = action.name().into_owned();
    tracing::info!("* {}", name);

    match panic::catch_unwind(AssertUnwindSafe(|| action.execute())) {
        Ok(Ok(outcome)) => {
            if let Some(details) = &outcome.debug_information {
                tracing::debug!("{}: {}", name, details);
            }
            ActionExecutionResult::succeeded(name, outcome)
        }
        Ok(Err(error)) => {
            let fault = Fault::from_error(&error);
            tracing::warn!("{} failed: {}", name, fault);
            ActionExecutionResult::failed(name, fault)
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let fault = Fault::message(format!("action panicked: {message}"));
            tracing::warn!("{} failed: {}", name, fault);
            ActionExecutionResult::failed(name, fault)
        }
    }
}
