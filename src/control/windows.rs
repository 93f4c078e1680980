// ABOUTME: ServiceControl backed by sc.exe for services and appcmd.exe for IIS sites.
// ABOUTME: Stop/start requests poll the observed state until it settles or attempts run out.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use super::{ControlError, RunState, ServiceControl, ServiceKind};

/// `sc.exe` exit code for "The specified service does not exist as an installed service."
const SC_SERVICE_DOES_NOT_EXIST: i32 = 1060;

/// `sc.exe` exit code for "An instance of the service is already running."
const SC_SERVICE_ALREADY_RUNNING: i32 = 1056;

/// `appcmd.exe` message for a site name that matches nothing.
const APPCMD_SITE_NOT_FOUND: &str = "Cannot find SITE object";

struct CommandOutput {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub struct WindowsServiceControl {
    sc: PathBuf,
    appcmd: PathBuf,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl Default for WindowsServiceControl {
    fn default() -> Self {
        let windir = std::env::var_os("windir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\Windows"));
        Self {
            sc: windir.join("system32").join("sc.exe"),
            appcmd: windir.join("system32").join("inetsrv").join("appcmd.exe"),
            poll_interval: Duration::from_secs(1),
            poll_attempts: 30,
        }
    }
}

impl WindowsServiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// How long to wait for a stop/start to settle.
    pub fn settle(mut self, poll_interval: Duration, poll_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.poll_attempts = poll_attempts;
        self
    }

    fn run(&self, program: &Path, args: &[&str]) -> Result<CommandOutput, ControlError> {
        tracing::debug!("Running {} {}", program.display(), args.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ControlError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn failed(program: &Path, output: CommandOutput) -> ControlError {
        let text = if output.stderr.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        ControlError::CommandFailed {
            program: program.display().to_string(),
            status: output
                .code
                .map(|c| format!("exit code {c}"))
                .unwrap_or_else(|| "terminated".to_string()),
            output: text.trim().to_string(),
        }
    }

    fn query(&self, kind: ServiceKind, name: &str) -> Result<Option<RunState>, ControlError> {
        match kind {
            ServiceKind::WindowsService => {
                let output = self.run(&self.sc, &["query", name])?;
                if output.code == Some(SC_SERVICE_DOES_NOT_EXIST) {
                    return Ok(None);
                }
                if !output.success() {
                    return Err(Self::failed(&self.sc, output));
                }
                Ok(Some(parse_sc_state(&output.stdout)))
            }
            ServiceKind::Site => {
                let site = format!("/name:{name}");
                let output = self.run(&self.appcmd, &["list", "site", &site, "/text:state"])?;
                if site_not_found(&output) {
                    return Ok(None);
                }
                if !output.success() {
                    return Err(Self::failed(&self.appcmd, output));
                }
                Ok(Some(parse_appcmd_state(&output.stdout)))
            }
        }
    }

    fn request(&self, kind: ServiceKind, verb: &str, name: &str) -> Result<(), ControlError> {
        let (program, output) = match kind {
            ServiceKind::WindowsService => (&self.sc, self.run(&self.sc, &[verb, name])?),
            ServiceKind::Site => {
                let site = format!("/site.name:{name}");
                (&self.appcmd, self.run(&self.appcmd, &[verb, "site", &site])?)
            }
        };
        if request_accepted(kind, verb, &output) {
            Ok(())
        } else {
            Err(Self::failed(program, output))
        }
    }

    fn wait_for(
        &self,
        kind: ServiceKind,
        name: &str,
        done: impl Fn(&RunState) -> bool,
    ) -> Result<(), ControlError> {
        for _ in 0..self.poll_attempts {
            if self.state(kind, name).is_ok_and(|s| done(&s)) {
                return Ok(());
            }
            std::thread::sleep(self.poll_interval);
        }
        // The calling action asserts the final state itself.
        Ok(())
    }
}

impl ServiceControl for WindowsServiceControl {
    fn exists(&self, kind: ServiceKind, name: &str) -> Result<bool, ControlError> {
        Ok(self.query(kind, name)?.is_some())
    }

    fn stop(&self, kind: ServiceKind, name: &str) -> Result<(), ControlError> {
        if self.state(kind, name)?.is_stopped() {
            return Ok(());
        }
        self.request(kind, "stop", name)?;
        self.wait_for(kind, name, RunState::is_stopped)
    }

    fn start(&self, kind: ServiceKind, name: &str) -> Result<(), ControlError> {
        if self.state(kind, name)? == RunState::Started {
            return Ok(());
        }
        self.request(kind, "start", name)?;
        self.wait_for(kind, name, |s| *s == RunState::Started)
    }

    fn state(&self, kind: ServiceKind, name: &str) -> Result<RunState, ControlError> {
        self.query(kind, name)?.ok_or_else(|| ControlError::NotFound {
            kind,
            name: name.to_string(),
        })
    }
}

/// A start that races an already running service is not a failure.
fn request_accepted(kind: ServiceKind, verb: &str, output: &CommandOutput) -> bool {
    output.success()
        || (kind == ServiceKind::WindowsService
            && verb == "start"
            && output.code == Some(SC_SERVICE_ALREADY_RUNNING))
}

/// An unknown site lists nothing, or fails naming the missing SITE object.
fn site_not_found(output: &CommandOutput) -> bool {
    if output.success() {
        return output.stdout.trim().is_empty();
    }
    output.stdout.contains(APPCMD_SITE_NOT_FOUND) || output.stderr.contains(APPCMD_SITE_NOT_FOUND)
}

/// Parse the `STATE : 4  RUNNING` line of `sc.exe query`.
fn parse_sc_state(output: &str) -> RunState {
    let state = output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("STATE"))
        .and_then(|line| line.split_whitespace().last())
        .unwrap_or("UNKNOWN");

    match state {
        "RUNNING" => RunState::Started,
        "STOPPED" => RunState::Stopped,
        other => RunState::Other(other.to_string()),
    }
}

/// Parse the single word printed by `appcmd list site /text:state`.
fn parse_appcmd_state(output: &str) -> RunState {
    match output.trim() {
        "Started" => RunState::Started,
        "Stopped" => RunState::Stopped,
        other => RunState::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_running_service() {
        let output = r#"
SERVICE_NAME: Spooler
        TYPE               : 110  WIN32_OWN_PROCESS  (interactive)
        STATE              : 4  RUNNING
                                (STOPPABLE, NOT_PAUSABLE, IGNORES_SHUTDOWN)
        WIN32_EXIT_CODE    : 0  (0x0)
"#;
        assert_eq!(parse_sc_state(output), RunState::Started);
    }

    #[test]
    fn parses_pending_service_state_verbatim() {
        let output = "        STATE              : 3  STOP_PENDING\n";
        assert_eq!(
            parse_sc_state(output),
            RunState::Other("STOP_PENDING".to_string())
        );
    }

    #[test]
    fn parses_appcmd_state() {
        assert_eq!(parse_appcmd_state("Stopped\r\n"), RunState::Stopped);
        assert_eq!(parse_appcmd_state("Started"), RunState::Started);
        assert_eq!(
            parse_appcmd_state("Unknown"),
            RunState::Other("Unknown".to_string())
        );
    }

    fn output(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn only_a_missing_site_object_means_not_found() {
        assert!(site_not_found(&output(0, "", "")));
        assert!(site_not_found(&output(
            1,
            "ERROR ( message:Cannot find SITE object with identifier \"Shop\". )",
            ""
        )));
        assert!(!site_not_found(&output(0, "Started\r\n", "")));
        assert!(!site_not_found(&output(
            5,
            "ERROR ( message:Access is denied. )",
            ""
        )));
    }

    #[test]
    fn already_running_service_accepts_start() {
        let running = output(1056, "", "An instance of the service is already running.");
        assert!(request_accepted(ServiceKind::WindowsService, "start", &running));
        assert!(!request_accepted(ServiceKind::WindowsService, "stop", &running));
        assert!(!request_accepted(ServiceKind::Site, "start", &running));
    }

    #[test]
    fn missing_tool_is_a_spawn_error() {
        let control = WindowsServiceControl {
            sc: PathBuf::from("/nonexistent/sc.exe"),
            appcmd: PathBuf::from("/nonexistent/appcmd.exe"),
            poll_interval: Duration::from_millis(1),
            poll_attempts: 1,
        };
        let err = control
            .exists(ServiceKind::WindowsService, "Spooler")
            .unwrap_err();
        assert!(matches!(err, ControlError::Spawn { .. }));
    }

    #[cfg(unix)]
    mod with_fake_tools {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        /// Writes an executable stand-in that logs its arguments to `calls.log`.
        fn fake_tool(dir: &TempDir, name: &str, body: &str) -> PathBuf {
            let path = dir.path().join(name);
            let log = dir.path().join("calls.log");
            let script = format!("#!/bin/sh\necho \"$*\" >> '{}'\n{body}\n", log.display());
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn control(dir: &TempDir, sc: &str, appcmd: &str) -> WindowsServiceControl {
            WindowsServiceControl {
                sc: fake_tool(dir, "sc", sc),
                appcmd: fake_tool(dir, "appcmd", appcmd),
                poll_interval: Duration::from_millis(1),
                poll_attempts: 1,
            }
        }

        fn calls(dir: &TempDir) -> String {
            fs::read_to_string(dir.path().join("calls.log")).unwrap_or_default()
        }

        #[test]
        fn starting_a_running_service_sends_no_request() {
            let dir = TempDir::new().unwrap();
            let control = control(
                &dir,
                "echo '        STATE              : 4  RUNNING'",
                "exit 1",
            );

            control.start(ServiceKind::WindowsService, "Worker").unwrap();
            assert!(!calls(&dir).contains("start Worker"), "{}", calls(&dir));
        }

        #[test]
        fn appcmd_failure_is_not_reported_as_missing_site() {
            let dir = TempDir::new().unwrap();
            let control = control(
                &dir,
                "exit 1",
                "echo 'ERROR ( message:Access is denied. )'\nexit 5",
            );

            let err = control.exists(ServiceKind::Site, "Shop").unwrap_err();
            assert!(matches!(err, ControlError::CommandFailed { .. }), "{err}");
        }

        #[test]
        fn unknown_site_does_not_exist() {
            let dir = TempDir::new().unwrap();
            let control = control(
                &dir,
                "exit 1",
                "echo 'ERROR ( message:Cannot find SITE object with identifier \"Shop\". )'\nexit 1",
            );

            assert!(!control.exists(ServiceKind::Site, "Shop").unwrap());
        }
    }
}
