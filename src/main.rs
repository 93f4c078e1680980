// ABOUTME: Entry point for the hoppla-deployer CLI application.
// ABOUTME: Parses arguments, sets up logging and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use hoppla_deployer::config::AppConfig;
use hoppla_deployer::error::Result;
use hoppla_deployer::logging::{LogOptions, init_logging};
use hoppla_deployer::report::OutputMode;
use std::env;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let level = match (cli.verbose, mode) {
        (true, _) => "debug",
        (false, OutputMode::Normal) => "info",
        (false, _) => "warn",
    };

    if let Commands::Init {
        force,
        working_directory,
    } = &cli.command
    {
        let _guard = init_logging(LogOptions { level, file: None })?;
        return commands::init(working_directory.as_deref(), *force);
    }

    let config = load_config(&cli)?;
    let log_file = config.log_file_path();
    let _guard = init_logging(LogOptions {
        level,
        file: log_file.as_deref(),
    })?;

    match cli.command {
        Commands::Run { dry_run } => commands::run(&config, dry_run, mode),
        Commands::Plan => commands::plan(&config, mode),
        Commands::Init { .. } => Ok(()),
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::discover(&env::current_dir()?)?,
    };
    Ok(config)
}
