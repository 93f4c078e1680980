// ABOUTME: Checks that a freshly started site answers GET with the expected status.
// ABOUTME: Transport errors and status mismatches both fail the action.

use snafu::{ResultExt, ensure};
use std::time::Duration;

use super::error::{HttpSnafu, UnexpectedStatusSnafu};
use super::{Action, ActionError, ActionKind, ActionOutcome};
use crate::http;

pub struct VerifyHttpResponse {
    uri: String,
    expected: u16,
    timeout: Duration,
}

impl VerifyHttpResponse {
    pub fn new(uri: impl Into<String>, expected: u16, timeout: Duration) -> Self {
        Self {
            uri: uri.into(),
            expected,
            timeout,
        }
    }
}

impl Action for VerifyHttpResponse {
    fn kind(&self) -> ActionKind {
        ActionKind::VerifyHttpResponse
    }

    fn describe(&self) -> String {
        format!("GET {} expecting {}", self.uri, self.expected)
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let actual = http::get_status(&self.uri, self.timeout).context(HttpSnafu { uri: &self.uri })?;
        ensure!(
            actual == self.expected,
            UnexpectedStatusSnafu {
                uri: &self.uri,
                expected: self.expected,
                actual,
            }
        );
        Ok(ActionOutcome::done().with_debug(format!("Verifying HTTP: status code {actual}.")))
    }
}
