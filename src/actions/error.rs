// ABOUTME: Faults raised by deployment actions, SNAFU style.
// ABOUTME: Each variant carries the path, URI or target the failing step was working on.

use snafu::Snafu;
use std::path::PathBuf;

use crate::archive::ArchiveError;
use crate::control::{ControlError, RunState, ServiceKind};
use crate::hooks::HookError;
use crate::http::HttpError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ActionError {
    #[snafu(display("could not find {kind} '{name}'"))]
    TargetNotFound { kind: ServiceKind, name: String },

    #[snafu(display("could not stop {kind} '{name}' (state: {state})"))]
    NotStopped {
        kind: ServiceKind,
        name: String,
        state: RunState,
    },

    #[snafu(display("could not start {kind} '{name}' (still stopped)"))]
    NotStarted { kind: ServiceKind, name: String },

    #[snafu(display("failed to {operation} {kind} '{name}'"))]
    Control {
        operation: &'static str,
        kind: ServiceKind,
        name: String,
        source: ControlError,
    },

    #[snafu(display("backup archive name collided twice: {}", path.display()))]
    BackupCollision { path: PathBuf },

    #[snafu(display("failed to {operation} {}", path.display()))]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("archive operation failed"))]
    Archive { source: ArchiveError },

    #[snafu(display("could not find environment specific config file {}", path.display()))]
    EnvironmentConfigMissing { path: PathBuf },

    #[snafu(display("expected status code {expected}, received {actual}, on GET {uri}"))]
    UnexpectedStatus {
        uri: String,
        expected: u16,
        actual: u16,
    },

    #[snafu(display("error on GET {uri}"))]
    Http { uri: String, source: HttpError },

    #[snafu(display("could not execute {method} in class {type_name}"))]
    Hook {
        method: String,
        type_name: String,
        source: HookError,
    },
}
