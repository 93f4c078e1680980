// ABOUTME: Report sinks that receive every bundle result of a run.
// ABOUTME: Console output in three modes and an optional JSON report file.

mod console;
mod json;

pub use console::{ConsoleReport, OutputMode};
pub use json::{JsonReportFile, RunReport};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::bundle::ActionBundleExecutionResult;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receives the ordered results of a whole run.
pub trait ReportSink {
    fn report(&mut self, results: &[ActionBundleExecutionResult]) -> Result<(), ReportError>;
}

/// Succeeded and failed bundle counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn of(results: &[ActionBundleExecutionResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success()).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deployed {} successfully, {} failed.",
            self.succeeded, self.failed
        )
    }
}
