// ABOUTME: Run command implementation.
// ABOUTME: Discovers pending packages, executes their bundles one by one and reports the results.

use super::bundle_factory;
use hoppla_deployer::bundle::execute;
use hoppla_deployer::config::{AppConfig, discover_packages};
use hoppla_deployer::diagnostics::{Diagnostics, Warning, WarningKind};
use hoppla_deployer::error::{Error, Result};
use hoppla_deployer::report::{ConsoleReport, JsonReportFile, OutputMode, ReportSink, RunSummary};

/// Deploy every pending package. Fails with `DeploymentsFailed` after
/// reporting when any package did not deploy.
pub fn run(config: &AppConfig, dry_run: bool, mode: OutputMode) -> Result<()> {
    let dry_run = dry_run || config.dry_run;
    let mut console = ConsoleReport::stdout(mode);
    let mut diag = Diagnostics::default();

    let paths = config.paths();
    paths.bootstrap()?;

    if dry_run {
        console.progress("Dry run: nothing on this host will be changed.");
    }

    let discovery = discover_packages(&config.packages_dir(), &paths)?;
    for rejected in discovery.rejected {
        warn(
            &mut console,
            &mut diag,
            Warning::rejected_package(format!(
                "skipping {}: {}",
                rejected.config_file.display(),
                rejected.error
            )),
        );
    }

    if discovery.packages.is_empty() {
        console.progress("No pending deliveries.");
    }

    let factory = bundle_factory(config, dry_run);
    let mut results = Vec::with_capacity(discovery.packages.len());

    for package in &discovery.packages {
        let bundle = match factory.build(package) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn(
                    &mut console,
                    &mut diag,
                    Warning::rejected_bundle(format!("skipping {}: {}", package.name(), e)),
                );
                continue;
            }
        };

        results.push(execute(bundle));
    }

    console.report(&results)?;

    if let Some(path) = config.report_file()
        && let Err(e) = JsonReportFile::new(path).report(&results)
    {
        warn(&mut console, &mut diag, Warning::report_write(e.to_string()));
    }

    let summary = RunSummary::of(&results);
    let failed = summary.failed + diag.count(WarningKind::RejectedBundle);
    if failed > 0 {
        return Err(Error::DeploymentsFailed {
            failed,
            total: results.len() + diag.count(WarningKind::RejectedBundle),
        });
    }

    Ok(())
}

fn warn(console: &mut ConsoleReport, diag: &mut Diagnostics, warning: Warning) {
    if console.mode() == OutputMode::Json {
        console.warning(&warning.message);
    }
    diag.warn(warning);
}
