// ABOUTME: Plan command implementation.
// ABOUTME: Lists the ordered actions each pending package would run, without running them.

use serde::Serialize;

use super::bundle_factory;
use hoppla_deployer::actions::Action;
use hoppla_deployer::config::{AppConfig, discover_packages};
use hoppla_deployer::error::Result;
use hoppla_deployer::report::OutputMode;
use hoppla_deployer::types::TargetEnvironment;

#[derive(Serialize)]
struct PlannedBundle<'a> {
    event: &'static str,
    package: &'a str,
    target_environment: TargetEnvironment,
    actions: Vec<String>,
}

pub fn plan(config: &AppConfig, mode: OutputMode) -> Result<()> {
    let paths = config.paths();
    if !paths.monitored_delivery.is_dir() {
        if mode != OutputMode::Json {
            println!("No pending deliveries.");
        }
        return Ok(());
    }

    let discovery = discover_packages(&config.packages_dir(), &paths)?;
    for rejected in &discovery.rejected {
        tracing::warn!("{}: {}", rejected.config_file.display(), rejected.error);
    }
    if discovery.packages.is_empty() && mode != OutputMode::Json {
        println!("No pending deliveries.");
    }

    let factory = bundle_factory(config, false);
    for package in &discovery.packages {
        let bundle = match factory.build(package) {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!("{}: {}", package.name(), e);
                continue;
            }
        };

        if mode == OutputMode::Json {
            let planned = PlannedBundle {
                event: "plan",
                package: bundle.package(),
                target_environment: bundle.target_environment(),
                actions: bundle.action_names(),
            };
            println!("{}", serde_json::to_string(&planned).map_err(std::io::Error::other)?);
            continue;
        }

        println!("{} ({}):", bundle.package(), bundle.target_environment());
        for (i, action) in bundle.actions().enumerate() {
            println!("  {}. {}: {}", i + 1, action.name(), action.describe());
        }
    }

    Ok(())
}
