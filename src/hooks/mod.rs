// ABOUTME: Dynamic extension point used to run hooks shipped inside a deployed artifact.
// ABOUTME: Distinguishes an absent hook from one that was found and failed.

mod process;
mod release_notes;

pub use process::{HOOK_FLAG, ProcessHost, exit_code};
pub use release_notes::ReleaseNotes;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::TargetEnvironment;

/// Method invoked after a package has been deployed.
pub const AFTER_METHOD: &str = "After";

/// Method returning the release notes of a package.
pub const RELEASE_NOTES_METHOD: &str = "ReleaseNotes";

/// Which part of the hook convention the artifact does not implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    Type,
    Method,
}

/// Outcome of a hook invocation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// The method ran and returned this value.
    Returned(String),
    /// The artifact does not carry the hook.
    Absent(Absence),
}

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("entry point not found: {0}")]
    EntryPointMissing(PathBuf),

    #[error("failed to load {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to instantiate {type_name}: {message}")]
    Instantiate { type_name: String, message: String },

    #[error("{type_name}.{method} failed ({status}): {message}")]
    Invoke {
        type_name: String,
        method: String,
        status: String,
        message: String,
    },

    #[error("{type_name}.{method} did not finish within {} seconds", .timeout.as_secs())]
    Timeout {
        type_name: String,
        method: String,
        timeout: Duration,
    },
}

/// Package facts handed to the artifact alongside the call.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub package: String,
    pub target_environment: TargetEnvironment,
    /// The entry point itself answers `--deployment-hook` calls.
    pub self_hosted: bool,
}

impl HookContext {
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("DEPLOYER_PACKAGE".to_string(), self.package.clone());
        env.insert(
            "DEPLOYER_TARGET_ENVIRONMENT".to_string(),
            self.target_environment.to_string(),
        );
        env
    }
}

/// An artifact binary that has been loaded and can be asked to run hooks.
pub trait LoadedExtension {
    /// Instantiate `type_name` and call its zero-argument `method`.
    fn invoke(&self, type_name: &str, method: &str) -> Result<HookOutcome, HookError>;
}

/// Loads artifact binaries. Implementations must keep faults raised by the
/// artifact away from the calling process.
pub trait ExtensionHost: Send + Sync {
    fn load(
        &self,
        entry_point: &Path,
        context: &HookContext,
    ) -> Result<Box<dyn LoadedExtension>, HookError>;
}
