// ABOUTME: Validated domain types shared by config, actions and bundles.
// ABOUTME: Deployment classification enums and the package identity.

mod deployment;
mod package_identity;

pub use deployment::{DeploymentType, ParseEnumError, TargetEnvironment};
pub use package_identity::{PackageIdentity, PackageIdentityError, RELEASE_DATE_FORMAT};
