//! Erraroo CLI - Command-line interface for the Erraroo reporter
//!
//! Provides commands for:
//! - Minting session ids
//! - Checking a host environment file against the activation rules
//! - Sending a one-off error report

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{check::CheckCommand, send::SendCommand, session::SessionCommand};
use output::OutputFormat;

/// Environment file used when `--config` is not given
const DEFAULT_ENVIRONMENT_FILE: &str = "config/environment.yml";

#[derive(Debug, Parser)]
#[command(name = "erraroo", version, about = "Erraroo error reporting client")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Host environment file
    #[arg(long, global = true, default_value = DEFAULT_ENVIRONMENT_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print a fresh session id
    Session(SessionCommand),
    /// Check the host environment and show the activation decision
    Check(CheckCommand),
    /// Send one error report and wait for the response
    Send(SendCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // stdout is reserved for command output
    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match &cli.command {
        Commands::Session(cmd) => cmd.execute(format).await,
        Commands::Check(cmd) => cmd.execute(&cli.config, format).await,
        Commands::Send(cmd) => cmd.execute(&cli.config, format).await,
    }
}
