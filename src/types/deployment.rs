// ABOUTME: Deployment classification and target environment enums.
// ABOUTME: Parsed from package config files and used to select the bundle policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// How a package is hosted on the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentType {
    #[serde(rename = "IISSite")]
    IisSite,
    Executable,
    WindowsService,
}

impl DeploymentType {
    pub const ALL: [DeploymentType; 3] = [
        DeploymentType::IisSite,
        DeploymentType::Executable,
        DeploymentType::WindowsService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::IisSite => "IISSite",
            DeploymentType::Executable => "Executable",
            DeploymentType::WindowsService => "WindowsService",
        }
    }

    /// Extension of the entry point binary shipped in the package.
    pub fn entry_point_extension(&self) -> &'static str {
        match self {
            DeploymentType::IisSite => "dll",
            DeploymentType::Executable | DeploymentType::WindowsService => "exe",
        }
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|t| t.as_str()).collect();
                ParseEnumError::new("deployment type", s, &names)
            })
    }
}

/// Environment a package is being rolled out to.
///
/// The variant name doubles as the name of the environment specific config
/// file shipped inside the package (`Production.config` and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetEnvironment {
    Development,
    Test,
    Staging,
    Production,
}

impl TargetEnvironment {
    pub const ALL: [TargetEnvironment; 4] = [
        TargetEnvironment::Development,
        TargetEnvironment::Test,
        TargetEnvironment::Staging,
        TargetEnvironment::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetEnvironment::Development => "Development",
            TargetEnvironment::Test => "Test",
            TargetEnvironment::Staging => "Staging",
            TargetEnvironment::Production => "Production",
        }
    }

    /// File name of the environment specific config candidate.
    pub fn config_file_name(&self) -> String {
        format!("{}.config", self.as_str())
    }
}

impl fmt::Display for TargetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetEnvironment {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s.trim())
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|e| e.as_str()).collect();
                ParseEnumError::new("target environment", s, &names)
            })
    }
}
