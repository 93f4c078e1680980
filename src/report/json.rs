// ABOUTME: JSON report file written at the end of a run.
// ABOUTME: Written to a sibling temp file first, then renamed over the destination.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{ReportError, ReportSink, RunSummary};
use crate::bundle::ActionBundleExecutionResult;

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub host: String,
    pub generated_at: DateTime<Local>,
    pub summary: RunSummary,
    pub bundles: Vec<BundleView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BundleView<'a> {
    pub success: bool,
    #[serde(flatten)]
    pub result: &'a ActionBundleExecutionResult,
}

impl<'a> RunReport<'a> {
    pub fn new(results: &'a [ActionBundleExecutionResult]) -> Self {
        Self {
            host: gethostname::gethostname().to_string_lossy().into_owned(),
            generated_at: Local::now(),
            summary: RunSummary::of(results),
            bundles: results
                .iter()
                .map(|result| BundleView {
                    success: result.success(),
                    result,
                })
                .collect(),
        }
    }
}

pub struct JsonReportFile {
    path: PathBuf,
}

impl JsonReportFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ReportError {
        ReportError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ReportSink for JsonReportFile {
    fn report(&mut self, results: &[ActionBundleExecutionResult]) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(&RunReport::new(results))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            self.io_error(e)
        })?;

        tracing::info!("Wrote report to {}", self.path.display());
        Ok(())
    }
}
