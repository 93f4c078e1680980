// ABOUTME: Test support utilities.
// ABOUTME: Fake service control, scripted hook host, fixed clock and archive helpers.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use hoppla_deployer::actions::Clock;
use hoppla_deployer::config::{DeploymentPackageConfiguration, GlobalPaths, PackageFile};
use hoppla_deployer::control::{ControlError, RunState, ServiceControl, ServiceKind};
use hoppla_deployer::hooks::{
    ExtensionHost, HookContext, HookError, HookOutcome, LoadedExtension,
};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("hoppla_deployer=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// In-memory sites and services. Every call is recorded as "<op> <name>".
#[derive(Default)]
pub struct FakeControl {
    states: Mutex<HashMap<String, RunState>>,
    /// Names whose start request is accepted but never takes effect.
    stuck: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeControl {
    pub fn with(names: &[&str]) -> Arc<Self> {
        let control = Self::default();
        for name in names {
            control
                .states
                .lock()
                .unwrap()
                .insert(name.to_string(), RunState::Started);
        }
        Arc::new(control)
    }

    pub fn never_starts(&self, name: &str) {
        self.stuck.lock().unwrap().push(name.to_string());
    }

    pub fn state_of(&self, name: &str) -> Option<RunState> {
        self.states.lock().unwrap().get(name).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, name: &str) {
        self.calls.lock().unwrap().push(format!("{op} {name}"));
    }

    fn not_found(kind: ServiceKind, name: &str) -> ControlError {
        ControlError::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}

impl ServiceControl for FakeControl {
    fn exists(&self, _kind: ServiceKind, name: &str) -> Result<bool, ControlError> {
        Ok(self.states.lock().unwrap().contains_key(name))
    }

    fn stop(&self, kind: ServiceKind, name: &str) -> Result<(), ControlError> {
        self.record("stop", name);
        let mut states = self.states.lock().unwrap();
        let state = states
            .get_mut(name)
            .ok_or_else(|| Self::not_found(kind, name))?;
        *state = RunState::Stopped;
        Ok(())
    }

    fn start(&self, kind: ServiceKind, name: &str) -> Result<(), ControlError> {
        self.record("start", name);
        let stuck = self.stuck.lock().unwrap().iter().any(|n| n == name);
        let mut states = self.states.lock().unwrap();
        let state = states
            .get_mut(name)
            .ok_or_else(|| Self::not_found(kind, name))?;
        if !stuck {
            *state = RunState::Started;
        }
        Ok(())
    }

    fn state(&self, kind: ServiceKind, name: &str) -> Result<RunState, ControlError> {
        self.states
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Self::not_found(kind, name))
    }
}

/// Hook host answering every call from a table keyed by method name.
/// Methods missing from the table are reported as absent.
#[derive(Default)]
pub struct ScriptedHost {
    returns: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHost {
    pub fn returning(method: &str, value: &str) -> Self {
        Self::default().and(method, value)
    }

    pub fn and(mut self, method: &str, value: &str) -> Self {
        self.returns.insert(method.to_string(), value.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct ScriptedExtension {
    returns: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ExtensionHost for ScriptedHost {
    fn load(
        &self,
        _entry_point: &Path,
        _context: &HookContext,
    ) -> Result<Box<dyn LoadedExtension>, HookError> {
        Ok(Box::new(ScriptedExtension {
            returns: self.returns.clone(),
            calls: self.calls.clone(),
        }))
    }
}

impl LoadedExtension for ScriptedExtension {
    fn invoke(&self, type_name: &str, method: &str) -> Result<HookOutcome, HookError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{type_name}.{method}"));
        Ok(match self.returns.get(method) {
            Some(value) => HookOutcome::Returned(value.clone()),
            None => HookOutcome::Absent(hoppla_deployer::hooks::Absence::Method),
        })
    }
}

/// Clock pinned to 2024-01-15 09:30:05.
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self(
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 30, 5)
                .unwrap(),
        ))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Write a zip archive holding `files` (relative path, content).
pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).unwrap();
    }
    let mut zip = zip::ZipWriter::new(fs::File::create(path).unwrap());
    let options = zip::write::FileOptions::default();
    for (name, content) in files {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Package configuration for `archive` under the working directory `root`.
pub fn package(root: &Path, archive: &Path, yaml: &str) -> DeploymentPackageConfiguration {
    let paths = GlobalPaths::under(root);
    let config_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').nth(1))
        .unwrap()
        .to_string();
    let file = PackageFile::from_yaml(yaml, Path::new("package.yml")).unwrap();
    DeploymentPackageConfiguration::new(&config_name, file, archive, &paths).unwrap()
}
