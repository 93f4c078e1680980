// ABOUTME: Free-form named settings attached to a package config.
// ABOUTME: Required lookups fail with a MissingSetting error naming the package and key.

use std::collections::BTreeMap;
use thiserror::Error;

pub const IIS_SITE_NAME: &str = "IISSiteName";
pub const WINDOWS_SERVICE_NAME: &str = "WindowsServiceName";
pub const VERIFY_HTTP_RESPONSE_URI: &str = "VerifyHttpResponseUri";
pub const VERIFY_HTTP_RESPONSE_STATUS: &str = "VerifyHttpResponseStatus";
/// The entry point answers `--deployment-hook` calls itself.
pub const SELF_HOSTED_HOOKS: &str = "SelfHostedHooks";

/// Status a freshly started site is expected to answer with when no
/// `VerifyHttpResponseStatus` is configured (sites sit behind authentication).
pub const DEFAULT_VERIFY_STATUS: u16 = 401;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("package '{package}': missing required setting '{key}'")]
pub struct MissingSetting {
    pub package: String,
    pub key: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("package '{package}': setting '{key}' has invalid value '{value}'")]
pub struct InvalidSetting {
    pub package: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    package: String,
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new(package: impl Into<String>, values: BTreeMap<String, String>) -> Self {
        Self {
            package: package.into(),
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a setting that must be present and non-blank.
    pub fn require(&self, key: &str) -> Result<&str, MissingSetting> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| MissingSetting {
                package: self.package.clone(),
                key: key.to_string(),
            })
    }

    /// Expected status for the HTTP verification step.
    pub fn verify_status(&self) -> Result<u16, InvalidSetting> {
        match self.get(VERIFY_HTTP_RESPONSE_STATUS) {
            None => Ok(DEFAULT_VERIFY_STATUS),
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|code| (100..=599).contains(code))
                .ok_or_else(|| InvalidSetting {
                    package: self.package.clone(),
                    key: VERIFY_HTTP_RESPONSE_STATUS.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    /// An optional `true`/`false` switch, off when absent.
    pub fn flag(&self, key: &str) -> Result<bool, InvalidSetting> {
        match self.get(key).map(str::trim) {
            None => Ok(false),
            Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(true),
            Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(false),
            Some(raw) => Err(InvalidSetting {
                package: self.package.clone(),
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
