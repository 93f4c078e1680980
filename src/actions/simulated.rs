// ABOUTME: Dry-run wrapper that reports what an action would do without doing it.
// ABOUTME: Keeps the wrapped action's kind and name so plans and reports line up.

use std::borrow::Cow;

use super::{Action, ActionError, ActionKind, ActionOutcome};

pub struct Simulated {
    inner: Box<dyn Action>,
}

impl Simulated {
    pub fn new(inner: Box<dyn Action>) -> Self {
        Self { inner }
    }
}

impl Action for Simulated {
    fn kind(&self) -> ActionKind {
        self.inner.kind()
    }

    fn name(&self) -> Cow<'_, str> {
        self.inner.name()
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let description = self.inner.describe();
        tracing::info!("[dry run] would {}", description);
        Ok(ActionOutcome::info(format!("Dry run: would {description}.")))
    }
}
