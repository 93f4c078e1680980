// ABOUTME: The Action contract every deployment step implements, plus shared wrappers.
// ABOUTME: Actions signal failure only through their Err value; the executor records it.

mod env_config;
mod error;
mod files;
mod hook;
mod http;
mod result;
mod service;
mod simulated;

pub use env_config::ApplyTargetEnvironmentConfig;
pub use error::ActionError;
pub use files::{BackupCurrentRelease, DeleteDirectoryContent, ExtractArchive, MoveToReleaseHistory};
pub use hook::{AfterDeploymentHook, HookCall, NO_ACTIONS_TO_RUN, ReleaseNotesHook};
pub use http::VerifyHttpResponse;
pub use result::{ActionExecutionResult, Fault};
pub use service::{StartService, StopService};
pub use simulated::Simulated;

use chrono::NaiveDateTime;
use heck::ToSnakeCase;
use std::borrow::Cow;
use std::fmt;

/// Identifier of each concrete step. Its humanised form is an action's
/// default name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    StopSite,
    StopWindowsService,
    BackupCurrentRelease,
    DeleteDirectoryContent,
    ExtractArchive,
    ApplyTargetEnvironmentConfig,
    MoveToReleaseHistory,
    StartSite,
    StartWindowsService,
    VerifyHttpResponse,
    AfterDeploymentHook,
    ReleaseNotes,
}

impl ActionKind {
    pub fn identifier(&self) -> &'static str {
        match self {
            ActionKind::StopSite => "StopSite",
            ActionKind::StopWindowsService => "StopWindowsService",
            ActionKind::BackupCurrentRelease => "BackupCurrentRelease",
            ActionKind::DeleteDirectoryContent => "DeleteDirectoryContent",
            ActionKind::ExtractArchive => "ExtractArchive",
            ActionKind::ApplyTargetEnvironmentConfig => "ApplyTargetEnvironmentConfig",
            ActionKind::MoveToReleaseHistory => "MoveToReleaseHistory",
            ActionKind::StartSite => "StartSite",
            ActionKind::StartWindowsService => "StartWindowsService",
            ActionKind::VerifyHttpResponse => "VerifyHttpResponse",
            ActionKind::AfterDeploymentHook => "AfterDeploymentHook",
            ActionKind::ReleaseNotes => "ReleaseNotes",
        }
    }

    /// `ApplyTargetEnvironmentConfig` becomes "Apply target environment config".
    pub fn human_name(&self) -> String {
        let words = self.identifier().to_snake_case().replace('_', " ");
        let mut chars = words.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// What a successful action reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub information: Option<String>,
    pub debug_information: Option<String>,
    pub is_release_note: bool,
}

impl ActionOutcome {
    pub fn done() -> Self {
        Self::default()
    }

    pub fn info(information: impl Into<String>) -> Self {
        Self {
            information: Some(information.into()),
            ..Self::default()
        }
    }

    pub fn release_note(information: impl Into<String>) -> Self {
        Self {
            information: Some(information.into()),
            is_release_note: true,
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug_information: impl Into<String>) -> Self {
        self.debug_information = Some(debug_information.into());
        self
    }
}

/// One deployment step.
///
/// An action is built with everything it needs and knows nothing about the
/// bundle it sits in. It reports failure by returning `Err`; it never turns a
/// fault into a successful outcome itself.
pub trait Action: Send + Sync {
    fn kind(&self) -> ActionKind;

    /// Name surfaced in logs and reports.
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(self.kind().human_name())
    }

    /// One line saying what the action touches, for plans and dry runs.
    fn describe(&self) -> String;

    fn execute(&self) -> Result<ActionOutcome, ActionError>;
}

impl fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

/// An action reported under an explicit name.
#[derive(Debug)]
pub struct Named<A> {
    inner: A,
    name: String,
}

impl<A: Action> Action for Named<A> {
    fn kind(&self) -> ActionKind {
        self.inner.kind()
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        self.inner.execute()
    }
}

pub trait ActionExt: Action + Sized {
    fn named(self, name: impl Into<String>) -> Named<Self> {
        Named {
            inner: self,
            name: name.into(),
        }
    }

    fn boxed(self) -> Box<dyn Action>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<A: Action> ActionExt for A {}

/// Source of local wall-clock time for timestamped file names.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
