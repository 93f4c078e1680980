// ABOUTME: Service and site control capability used by the stop/start actions.
// ABOUTME: Defines the ServiceControl trait, the target kinds and observed run states.

mod windows;

pub use windows::WindowsServiceControl;

use std::fmt;

/// What kind of long-running target a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// An IIS web site.
    Site,
    /// A Windows service registered with the service control manager.
    WindowsService,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Site => f.write_str("website"),
            ServiceKind::WindowsService => f.write_str("windows service"),
        }
    }
}

/// Observed run state of a site or service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Started,
    Stopped,
    /// Transitional or unrecognised state, reported verbatim.
    Other(String),
}

impl RunState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, RunState::Stopped)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Started => f.write_str("started"),
            RunState::Stopped => f.write_str("stopped"),
            RunState::Other(s) => f.write_str(s),
        }
    }
}

/// Errors from service control operations.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: ServiceKind, name: String },

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {output}")]
    CommandFailed {
        program: String,
        status: String,
        output: String,
    },
}

/// Look up, stop, start and observe named sites and services.
pub trait ServiceControl: Send + Sync {
    /// Whether a target with this name exists.
    fn exists(&self, kind: ServiceKind, name: &str) -> Result<bool, ControlError>;

    /// Request a stop. Implementations may wait for the stop to settle.
    fn stop(&self, kind: ServiceKind, name: &str) -> Result<(), ControlError>;

    /// Request a start. Implementations may wait for the start to settle.
    fn start(&self, kind: ServiceKind, name: &str) -> Result<(), ControlError>;

    /// Current run state.
    fn state(&self, kind: ServiceKind, name: &str) -> Result<RunState, ControlError>;
}
