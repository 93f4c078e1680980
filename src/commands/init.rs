// ABOUTME: Init command implementation.
// ABOUTME: Scaffolds deployer.yml and an example package config in the current directory.

use hoppla_deployer::config::init_config;
use hoppla_deployer::error::Result;
use std::env;

pub fn init(working_directory: Option<&str>, force: bool) -> Result<()> {
    let cwd = env::current_dir()?;
    let path = init_config(&cwd, working_directory, force)?;
    println!("Created {}", path.display());
    Ok(())
}
