// ABOUTME: Config scaffolding for a new deployment host.
// ABOUTME: Writes a deployer.yml template and an example package config.

use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};
use super::CONFIG_FILENAME;

const EXAMPLE_PACKAGE: &str = "Example.yml";

/// Write `deployer.yml` (and `packages/Example.yml`) into `dir`.
pub fn init_config(dir: &Path, working_directory: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(ConfigError::AlreadyExists(config_path));
    }

    let working_directory = working_directory.unwrap_or(r"C:\Deploy");
    write(&config_path, &generate_template_yaml(working_directory))?;

    let packages_dir = dir.join("packages");
    std::fs::create_dir_all(&packages_dir).map_err(|source| ConfigError::CreateDir {
        path: packages_dir.clone(),
        source,
    })?;

    let example = packages_dir.join(EXAMPLE_PACKAGE);
    if !example.exists() {
        write(&example, EXAMPLE_PACKAGE_YAML)?;
    }

    Ok(config_path)
}

fn write(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn generate_template_yaml(working_directory: &str) -> String {
    format!(
        r#"# Root for MonitoredDelivery, ReleaseBackup and ReleaseHistory
working_directory: '{}'
packages_directory: packages
# Report success for every action without touching the host
dry_run: false
# log_file: '{}\logs\deployer.log'
http_timeout: 10m
hook_timeout: 5m
# Loads an entry point and runs one hook: <runner> <entry point> <type> <method>
# hook_runner: tools\hook-runner.exe
# report:
#   json_file: '{}\last-run.json'
"#,
        working_directory, working_directory, working_directory
    )
}

const EXAMPLE_PACKAGE_YAML: &str = r#"# Deployed when MonitoredDelivery holds Release.Example.<yyyyMMdd>.zip
deployment_type: IISSite
target_environment: Production
target_path: 'C:\inetpub\Example'
settings:
  IISSiteName: Example
  VerifyHttpResponseUri: http://localhost/example
  # VerifyHttpResponseStatus: "401"
  # SelfHostedHooks: "true"   # the entry point answers --deployment-hook itself
"#;

#[cfg(test)]
mod tests {
    use super::super::AppConfig;
    use super::*;

    #[test]
    fn template_parses_back() {
        let yaml = generate_template_yaml(r"D:\Deploy");
        let config = AppConfig::from_yaml(&yaml, Path::new("deployer.yml")).unwrap();
        assert_eq!(config.working_directory, PathBuf::from(r"D:\Deploy"));
    }

    #[test]
    fn example_package_parses() {
        let file =
            super::super::PackageFile::from_yaml(EXAMPLE_PACKAGE_YAML, Path::new("Example.yml"))
                .unwrap();
        assert_eq!(file.deployment_type.as_deref(), Some("IISSite"));
        assert_eq!(file.settings.get("IISSiteName").map(String::as_str), Some("Example"));
    }
}
