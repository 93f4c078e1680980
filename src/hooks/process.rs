// ABOUTME: ExtensionHost that runs hooks in a child process, either a hook runner or the entry point itself.
// ABOUTME: Artifacts with neither are never launched and report their hooks as absent.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{Absence, ExtensionHost, HookContext, HookError, HookOutcome, LoadedExtension};

/// Flag a self-hosted entry point is started with when it is asked to run a hook.
pub const HOOK_FLAG: &str = "--deployment-hook";

/// Exit codes a hook call is reported with.
pub mod exit_code {
    pub const RETURNED: i32 = 0;
    pub const TYPE_ABSENT: i32 = 3;
    pub const METHOD_ABSENT: i32 = 4;
    pub const INSTANTIATION_FAILED: i32 = 5;
}

/// OS error for a file that exists but is not a runnable image.
#[cfg(windows)]
const EXEC_FORMAT_ERROR: i32 = 193;
#[cfg(not(windows))]
const EXEC_FORMAT_ERROR: i32 = 8;

/// Runs one hook per child process, bounded by a timeout.
///
/// A self-hosted entry point is started as
/// `<entry point> --deployment-hook <type> <method>`. Every other entry point
/// goes through the configured runner as
/// `<runner> <entry point> <type> <method>`. Without a runner such an
/// artifact carries no hooks as far as this host can tell.
#[derive(Debug, Clone)]
pub struct ProcessHost {
    timeout: Duration,
    runner: Option<PathBuf>,
}

impl ProcessHost {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            runner: None,
        }
    }

    pub fn runner(mut self, runner: Option<PathBuf>) -> Self {
        self.runner = runner;
        self
    }
}

impl ExtensionHost for ProcessHost {
    fn load(
        &self,
        entry_point: &Path,
        context: &HookContext,
    ) -> Result<Box<dyn LoadedExtension>, HookError> {
        if !entry_point.is_file() {
            return Err(HookError::EntryPointMissing(entry_point.to_path_buf()));
        }

        let (program, leading_args) = if context.self_hosted {
            (entry_point.to_path_buf(), vec![OsString::from(HOOK_FLAG)])
        } else if let Some(runner) = &self.runner {
            (runner.clone(), vec![entry_point.as_os_str().to_owned()])
        } else {
            tracing::debug!(
                "No hook runner configured and {} is not self-hosted; skipping hooks",
                entry_point.display()
            );
            return Ok(Box::new(WithoutHooks));
        };

        Ok(Box::new(ProcessExtension {
            program,
            leading_args,
            entry_point: entry_point.to_path_buf(),
            self_hosted: context.self_hosted,
            env: context.to_env(),
            timeout: self.timeout,
        }))
    }
}

/// An artifact nothing on this host can ask for hooks.
struct WithoutHooks;

impl LoadedExtension for WithoutHooks {
    fn invoke(&self, _type_name: &str, _method: &str) -> Result<HookOutcome, HookError> {
        Ok(HookOutcome::Absent(Absence::Type))
    }
}

struct ProcessExtension {
    program: PathBuf,
    leading_args: Vec<OsString>,
    entry_point: PathBuf,
    self_hosted: bool,
    env: HashMap<String, String>,
    timeout: Duration,
}

impl ProcessExtension {
    fn load_error(&self, source: io::Error) -> HookError {
        HookError::Load {
            path: self.program.clone(),
            source,
        }
    }
}

fn is_not_executable(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::PermissionDenied
        || error.raw_os_error() == Some(EXEC_FORMAT_ERROR)
}

impl LoadedExtension for ProcessExtension {
    fn invoke(&self, type_name: &str, method: &str) -> Result<HookOutcome, HookError> {
        tracing::info!(
            "Running {}.{} from {}",
            type_name,
            method,
            self.entry_point.display()
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| self.load_error(e))?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .arg(type_name)
            .arg(method)
            .envs(&self.env)
            .env("DEPLOYER_ENTRY_POINT", &self.entry_point)
            .env("DEPLOYER_HOOK_TYPE", type_name)
            .env("DEPLOYER_HOOK_METHOD", method)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = self.entry_point.parent() {
            command.current_dir(dir);
        }

        let spawned = runtime
            .block_on(async { tokio::time::timeout(self.timeout, command.output()).await })
            .map_err(|_| HookError::Timeout {
                type_name: type_name.to_string(),
                method: method.to_string(),
                timeout: self.timeout,
            })?;

        let output = match spawned {
            Ok(output) => output,
            Err(e) if self.self_hosted && is_not_executable(&e) => {
                tracing::warn!(
                    "{} cannot be executed ({}); treating it as carrying no hooks",
                    self.entry_point.display(),
                    e
                );
                return Ok(HookOutcome::Absent(Absence::Type));
            }
            Err(e) => return Err(self.load_error(e)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        match output.status.code() {
            Some(exit_code::RETURNED) => Ok(HookOutcome::Returned(stdout.trim_end().to_string())),
            Some(exit_code::TYPE_ABSENT) => Ok(HookOutcome::Absent(Absence::Type)),
            Some(exit_code::METHOD_ABSENT) => Ok(HookOutcome::Absent(Absence::Method)),
            Some(exit_code::INSTANTIATION_FAILED) => Err(HookError::Instantiate {
                type_name: type_name.to_string(),
                message: stderr,
            }),
            code => Err(HookError::Invoke {
                type_name: type_name.to_string(),
                method: method.to_string(),
                status: code
                    .map(|c| format!("exit code {c}"))
                    .unwrap_or_else(|| "terminated by signal".to_string()),
                message: stderr,
            }),
        }
    }
}
