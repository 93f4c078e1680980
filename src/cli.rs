// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hoppla-deployer")]
#[command(about = "Deploys delivered release archives to IIS sites, executables and Windows services")]
#[command(version)]
pub struct Cli {
    /// Path to deployer.yml (default: discovered in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print failures and the summary only
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Output JSON lines for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a deployer.yml template and an example package config
    Init {
        /// Overwrite an existing deployer.yml
        #[arg(short, long)]
        force: bool,

        /// Root for MonitoredDelivery, ReleaseBackup and ReleaseHistory
        #[arg(short, long)]
        working_directory: Option<String>,
    },

    /// Deploy every pending package
    Run {
        /// Report what would be done without touching the host
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the actions each pending package would run
    Plan,
}
