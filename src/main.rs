// ABOUTME: Entry point for the sshclient CLI application.
// ABOUTME: Parses arguments, sets up tracing, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use sshclient::config::Config;
use sshclient::error::{Error, Result};
use sshclient::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    match run(cli, &mut output).await {
        Ok(code) => std::process::exit(code.min(255) as i32),
        Err(e) => {
            output.error(&e.to_string());
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<u32> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run(args) => commands::run_command(config, args, output).await,
        Commands::Hosts => {
            let config = match config {
                Some(config) => config,
                None => return Err(Error::ConfigNotFound(env::current_dir()?)),
            };
            commands::list_hosts(&config, output);
            Ok(0)
        }
    }
}

/// An explicit --config must load; a missing discovered file is fine.
fn load_config(cli: &Cli) -> Result<Option<Config>> {
    if let Some(path) = &cli.config {
        return Config::load(path).map(Some);
    }

    let cwd = env::current_dir()?;
    match Config::discover(&cwd) {
        Ok(config) => Ok(Some(config)),
        Err(Error::ConfigNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
