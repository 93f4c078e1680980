// ABOUTME: Package identity parsed from a delivery archive file name.
// ABOUTME: Derives the hook namespace, hook type name and entry point binary name.

use chrono::NaiveDate;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use super::DeploymentType;

/// Date format embedded in archive names and hook type names.
pub const RELEASE_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackageIdentityError {
    #[error("archive file name '{0}' does not have the form Release.<Name>.<yyyyMMdd>.zip")]
    InvalidFileName(String),

    #[error("package name cannot be empty")]
    EmptyName,

    #[error("invalid character in package name: '{0}'")]
    InvalidChar(char),

    #[error("could not parse release date '{0}' (expected yyyyMMdd)")]
    InvalidDate(String),
}

/// Logical package name plus release date, e.g. `Shop_Web` released on 2024-01-15.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    name: String,
    release_date: NaiveDate,
}

impl PackageIdentity {
    pub fn new(name: &str, release_date: NaiveDate) -> Result<Self, PackageIdentityError> {
        if name.is_empty() {
            return Err(PackageIdentityError::EmptyName);
        }

        for c in name.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '-' {
                return Err(PackageIdentityError::InvalidChar(c));
            }
        }

        Ok(Self {
            name: name.to_string(),
            release_date,
        })
    }

    /// Parse `Release.<Name>.<yyyyMMdd>.zip`.
    pub fn from_archive_path(path: &Path) -> Result<Self, PackageIdentityError> {
        let display = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PackageIdentityError::InvalidFileName(display.clone()))?;

        let mut parts = stem.split('.');
        let (Some(_prefix), Some(name), Some(date)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(PackageIdentityError::InvalidFileName(display));
        };

        let release_date = NaiveDate::parse_from_str(date, RELEASE_DATE_FORMAT)
            .map_err(|_| PackageIdentityError::InvalidDate(date.to_string()))?;

        Self::new(name, release_date)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    /// Root namespace of the shipped code: underscores become dots.
    pub fn namespace(&self) -> String {
        self.name.replace('_', ".")
    }

    /// Fully qualified name of the type carrying the deployment hooks.
    pub fn hook_type_name(&self) -> String {
        format!(
            "{}.Deployments.Deployment_{}",
            self.namespace(),
            self.release_date.format(RELEASE_DATE_FORMAT)
        )
    }

    /// File name of the binary that carries the hooks.
    pub fn entry_point_file_name(&self, deployment_type: DeploymentType) -> String {
        format!(
            "{}.{}",
            self.namespace(),
            deployment_type.entry_point_extension()
        )
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
