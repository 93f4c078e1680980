// ABOUTME: Command module aggregator for the hoppla-deployer CLI.
// ABOUTME: Re-exports the init, plan and run command handlers.

mod init;
mod plan;
mod run;

pub use init::init;
pub use plan::plan;
pub use run::run;

use std::sync::Arc;

use hoppla_deployer::bundle::BundleFactory;
use hoppla_deployer::config::AppConfig;
use hoppla_deployer::control::WindowsServiceControl;
use hoppla_deployer::hooks::ProcessHost;

/// The factory wired with the host's real collaborators.
fn bundle_factory(config: &AppConfig, dry_run: bool) -> BundleFactory {
    BundleFactory::new(
        Arc::new(WindowsServiceControl::new()),
        Arc::new(ProcessHost::new(config.hook_timeout).runner(config.hook_runner_path())),
    )
    .http_timeout(config.http_timeout)
    .dry_run(dry_run)
}
