// ABOUTME: Per-action execution result as recorded by the bundle executor.
// ABOUTME: A captured fault keeps its message and the chain of underlying causes.

use serde::Serialize;
use std::error::Error;
use std::fmt;

use super::ActionOutcome;

/// A fault turned into data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fault {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl Fault {
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: error.to_string(),
            causes,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for cause in &self.causes {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionExecutionResult {
    pub action_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
    pub is_release_note: bool,
}

impl ActionExecutionResult {
    pub fn succeeded(action_name: impl Into<String>, outcome: ActionOutcome) -> Self {
        Self {
            action_name: action_name.into(),
            success: true,
            information: outcome.information,
            debug_information: outcome.debug_information,
            fault: None,
            is_release_note: outcome.is_release_note,
        }
    }

    /// The fault's message doubles as the result's information.
    pub fn failed(action_name: impl Into<String>, fault: Fault) -> Self {
        Self {
            action_name: action_name.into(),
            success: false,
            information: Some(fault.message.clone()),
            debug_information: None,
            fault: Some(fault),
            is_release_note: false,
        }
    }
}
