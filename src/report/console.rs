// ABOUTME: Console feedback and the console report sink.
// ABOUTME: Supports normal, quiet (scheduled runs) and JSON lines output modes.

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use super::{ReportError, ReportSink, RunSummary};
use crate::actions::ActionExecutionResult;
use crate::bundle::ActionBundleExecutionResult;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Failures and the final summary only
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Writes progress messages and bundle results to a stream.
pub struct ConsoleReport<W = io::Stdout> {
    mode: OutputMode,
    out: W,
}

impl ConsoleReport {
    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(mode, io::stdout())
    }
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(mode: OutputMode, out: W) -> Self {
        Self { mode, out }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&mut self, message: &str) {
        if self.mode == OutputMode::Normal {
            let _ = writeln!(self.out, "{message}");
        }
    }

    /// Warnings go to stderr in every mode but JSON, where they become events.
    pub fn warning(&mut self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => self.event(&MessageEvent {
                event: "warning",
                message,
            }),
        }
    }

    fn event<T: Serialize>(&mut self, event: &T) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(self.out, "{json}");
        }
    }

    fn write_bundle(&mut self, bundle: &ActionBundleExecutionResult) -> io::Result<()> {
        writeln!(
            self.out,
            "Results from bundle {} ({}):",
            bundle.package, bundle.target_environment
        )?;
        for result in &bundle.results {
            self.write_action(result)?;
        }
        Ok(())
    }

    fn write_action(&mut self, result: &ActionExecutionResult) -> io::Result<()> {
        if !result.success {
            let fault = result
                .fault
                .as_ref()
                .map(|f| f.to_string())
                .unwrap_or_default();
            return writeln!(self.out, "* {}: Failed. {}", result.action_name, fault);
        }

        if result.is_release_note {
            writeln!(self.out, "* {}: Success.", result.action_name)?;
            for line in result.debug_information.iter().flat_map(|t| t.lines()) {
                writeln!(self.out, "    {line}")?;
            }
            return Ok(());
        }

        match &result.information {
            Some(info) => writeln!(self.out, "* {}: Success. {}", result.action_name, info)?,
            None => writeln!(self.out, "* {}: Success.", result.action_name)?,
        }
        if let Some(debug) = &result.debug_information {
            writeln!(self.out, "    > {debug}")?;
        }
        Ok(())
    }
}

impl<W: Write> ReportSink for ConsoleReport<W> {
    fn report(&mut self, results: &[ActionBundleExecutionResult]) -> Result<(), ReportError> {
        let summary = RunSummary::of(results);
        let io_error = |source: io::Error| ReportError::Io {
            path: PathBuf::from("<console>"),
            source,
        };

        match self.mode {
            OutputMode::Normal => {
                for bundle in results {
                    self.write_bundle(bundle).map_err(io_error)?;
                }
                writeln!(self.out, "{summary}").map_err(io_error)?;
            }
            OutputMode::Quiet => {
                for bundle in results.iter().filter(|b| !b.success()) {
                    if let Some(failure) = bundle.failure() {
                        writeln!(
                            self.out,
                            "{}: {} failed",
                            bundle.package, failure.action_name
                        )
                        .map_err(io_error)?;
                    }
                }
                writeln!(self.out, "{summary}").map_err(io_error)?;
            }
            OutputMode::Json => {
                for bundle in results {
                    self.event(&BundleEvent {
                        event: "bundle",
                        success: bundle.success(),
                        bundle,
                    });
                }
                self.event(&SummaryEvent {
                    event: "summary",
                    summary,
                });
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct MessageEvent<'a> {
    event: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct BundleEvent<'a> {
    event: &'a str,
    success: bool,
    #[serde(flatten)]
    bundle: &'a ActionBundleExecutionResult,
}

#[derive(Serialize)]
struct SummaryEvent<'a> {
    event: &'a str,
    #[serde(flatten)]
    summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionOutcome, Fault};
    use crate::types::TargetEnvironment;
    use chrono::Local;

    fn sample() -> Vec<ActionBundleExecutionResult> {
        let now = Local::now();
        vec![
            ActionBundleExecutionResult {
                package: "Shop".to_string(),
                target_environment: TargetEnvironment::Production,
                started: now,
                finished: now,
                results: vec![
                    ActionExecutionResult::succeeded(
                        "After deployment hook",
                        ActionOutcome::info("No actions to run."),
                    ),
                    ActionExecutionResult::succeeded(
                        "Release notes",
                        ActionOutcome::release_note("<ul></ul>").with_debug("Fixes:\n  - totals"),
                    ),
                ],
            },
            ActionBundleExecutionResult {
                package: "Worker".to_string(),
                target_environment: TargetEnvironment::Test,
                started: now,
                finished: now,
                results: vec![ActionExecutionResult::failed(
                    "Stop windows service",
                    Fault::message("could not find windows service 'Worker'"),
                )],
            },
        ]
    }

    fn render(mode: OutputMode) -> String {
        let mut console = ConsoleReport::new(mode, Vec::new());
        console.report(&sample()).unwrap();
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn normal_mode_lists_every_action() {
        let text = render(OutputMode::Normal);
        assert!(text.contains("Results from bundle Shop (Production):"));
        assert!(text.contains("* After deployment hook: Success. No actions to run."));
        assert!(text.contains("    Fixes:"));
        assert!(!text.contains("<ul>"));
        assert!(text.contains(
            "* Stop windows service: Failed. could not find windows service 'Worker'"
        ));
        assert!(text.ends_with("Deployed 1 successfully, 1 failed.\n"));
    }

    #[test]
    fn quiet_mode_prints_failures_and_summary() {
        let text = render(OutputMode::Quiet);
        assert_eq!(
            text,
            "Worker: Stop windows service failed\nDeployed 1 successfully, 1 failed.\n"
        );
    }

    #[test]
    fn json_mode_emits_one_line_per_bundle_plus_summary() {
        let text = render(OutputMode::Json);
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "bundle");
        assert_eq!(lines[0]["package"], "Shop");
        assert_eq!(lines[1]["success"], false);
        assert_eq!(lines[2]["event"], "summary");
        assert_eq!(lines[2]["failed"], 1);
    }

    #[test]
    fn progress_is_suppressed_outside_normal_mode() {
        let mut console = ConsoleReport::new(OutputMode::Quiet, Vec::new());
        console.progress("Deploying 2 packages");
        assert!(console.into_inner().is_empty());
    }
}
