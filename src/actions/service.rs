// ABOUTME: Stop and start actions for IIS sites and Windows services.
// ABOUTME: Each asserts the observed run state after asking the control to change it.

use snafu::{ResultExt, ensure};
use std::sync::Arc;

use super::error::{ControlSnafu, NotStartedSnafu, NotStoppedSnafu, TargetNotFoundSnafu};
use super::{Action, ActionError, ActionKind, ActionOutcome};
use crate::control::{ServiceControl, ServiceKind};

struct Target {
    control: Arc<dyn ServiceControl>,
    kind: ServiceKind,
    name: String,
}

impl Target {
    fn ensure_exists(&self) -> Result<(), ActionError> {
        let exists = self
            .control
            .exists(self.kind, &self.name)
            .context(ControlSnafu {
                operation: "look up",
                kind: self.kind,
                name: &self.name,
            })?;
        ensure!(
            exists,
            TargetNotFoundSnafu {
                kind: self.kind,
                name: &self.name,
            }
        );
        Ok(())
    }

    fn state_after(&self, operation: &'static str) -> Result<crate::control::RunState, ActionError> {
        self.control
            .state(self.kind, &self.name)
            .context(ControlSnafu {
                operation,
                kind: self.kind,
                name: &self.name,
            })
    }
}

pub struct StopService {
    target: Target,
}

impl StopService {
    pub fn new(control: Arc<dyn ServiceControl>, kind: ServiceKind, name: impl Into<String>) -> Self {
        Self {
            target: Target {
                control,
                kind,
                name: name.into(),
            },
        }
    }
}

impl Action for StopService {
    fn kind(&self) -> ActionKind {
        match self.target.kind {
            ServiceKind::Site => ActionKind::StopSite,
            ServiceKind::WindowsService => ActionKind::StopWindowsService,
        }
    }

    fn describe(&self) -> String {
        format!("stop {} '{}'", self.target.kind, self.target.name)
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let t = &self.target;
        t.ensure_exists()?;
        t.control.stop(t.kind, &t.name).context(ControlSnafu {
            operation: "stop",
            kind: t.kind,
            name: &t.name,
        })?;

        let state = t.state_after("query")?;
        ensure!(
            state.is_stopped(),
            NotStoppedSnafu {
                kind: t.kind,
                name: &t.name,
                state,
            }
        );
        Ok(ActionOutcome::done())
    }
}

pub struct StartService {
    target: Target,
}

impl StartService {
    pub fn new(control: Arc<dyn ServiceControl>, kind: ServiceKind, name: impl Into<String>) -> Self {
        Self {
            target: Target {
                control,
                kind,
                name: name.into(),
            },
        }
    }
}

impl Action for StartService {
    fn kind(&self) -> ActionKind {
        match self.target.kind {
            ServiceKind::Site => ActionKind::StartSite,
            ServiceKind::WindowsService => ActionKind::StartWindowsService,
        }
    }

    fn describe(&self) -> String {
        format!("start {} '{}'", self.target.kind, self.target.name)
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let t = &self.target;
        t.ensure_exists()?;
        t.control.start(t.kind, &t.name).context(ControlSnafu {
            operation: "start",
            kind: t.kind,
            name: &t.name,
        })?;

        let state = t.state_after("query")?;
        ensure!(
            !state.is_stopped(),
            NotStartedSnafu {
                kind: t.kind,
                name: &t.name,
            }
        );
        Ok(ActionOutcome::done())
    }
}
