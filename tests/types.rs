// ABOUTME: Integration tests for validated domain types.
// ABOUTME: Tests deployment type and environment parsing and package identities.

use chrono::NaiveDate;
use hoppla_deployer::types::*;
use std::path::Path;

mod deployment_type_tests {
    use super::*;

    #[test]
    fn parses_every_known_name() {
        for deployment_type in DeploymentType::ALL {
            let parsed: DeploymentType = deployment_type.as_str().parse().unwrap();
            assert_eq!(parsed, deployment_type);
        }
        assert_eq!("IISSite".parse::<DeploymentType>().unwrap(), DeploymentType::IisSite);
    }

    #[test]
    fn unknown_name_lists_the_valid_ones() {
        let err = "Container".parse::<DeploymentType>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Container"), "{message}");
        assert!(message.contains("WindowsService"), "{message}");
    }

    #[test]
    fn entry_point_extension() {
        assert_eq!(DeploymentType::IisSite.entry_point_extension(), "dll");
        assert_eq!(DeploymentType::Executable.entry_point_extension(), "exe");
        assert_eq!(DeploymentType::WindowsService.entry_point_extension(), "exe");
    }
}

mod target_environment_tests {
    use super::*;

    #[test]
    fn config_file_name_follows_environment() {
        assert_eq!(
            TargetEnvironment::Production.config_file_name(),
            "Production.config"
        );
        assert_eq!(TargetEnvironment::Staging.config_file_name(), "Staging.config");
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!("Production".parse::<TargetEnvironment>().is_ok());
        assert!("production".parse::<TargetEnvironment>().is_err());
    }
}

mod package_identity_tests {
    use super::*;

    #[test]
    fn from_archive_path() {
        let identity =
            PackageIdentity::from_archive_path(Path::new("/in/Release.Shop_Web.20240115.zip"))
                .unwrap();
        assert_eq!(identity.name(), "Shop_Web");
        assert_eq!(
            identity.release_date(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(identity.namespace(), "Shop.Web");
        assert_eq!(
            identity.hook_type_name(),
            "Shop.Web.Deployments.Deployment_20240115"
        );
        assert_eq!(
            identity.entry_point_file_name(DeploymentType::IisSite),
            "Shop.Web.dll"
        );
    }

    #[test]
    fn rejects_malformed_file_names() {
        assert!(PackageIdentity::from_archive_path(Path::new("Shop.zip")).is_err());
        assert!(PackageIdentity::from_archive_path(Path::new("Release.Shop.2024.zip")).is_err());
        assert!(
            PackageIdentity::from_archive_path(Path::new("Release.Sh op.20240115.zip")).is_err()
        );
    }

    #[test]
    fn new_validates_name() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(PackageIdentity::new("Shop-Web_2", date).is_ok());
        assert!(matches!(
            PackageIdentity::new("", date),
            Err(PackageIdentityError::EmptyName)
        ));
        assert!(matches!(
            PackageIdentity::new("Shop/Web", date),
            Err(PackageIdentityError::InvalidChar('/'))
        ));
    }
}
