//! briq CLI
//!
//! Replays JSON call scripts against a fresh in-memory item ledger and set
//! registry, then prints the final holdings of every account involved.

use std::path::PathBuf;

use anyhow::Result;
use briq_runtime::{telemetry, BriqRuntime, RuntimeConfig};
use clap::{Parser, Subcommand};

mod output;
mod replay;

use output::OutputFormat;

/// briq CLI application
#[derive(Parser)]
#[command(name = "briq")]
#[command(about = "briq - item ledger and set registry", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BRIQ_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Log level, overrides the configured one
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Replay a call script
    Replay {
        /// JSON array of calls
        script: PathBuf,

        /// Record unexpected rejections instead of stopping
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Show effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RuntimeConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.log_json {
        config.logging.json = true;
    }
    telemetry::init(&config.logging)?;

    match cli.command {
        Commands::Replay {
            script,
            continue_on_error,
        } => {
            let steps = replay::load_script(&script)?;
            let runtime = BriqRuntime::new(config)?;
            let report = replay::replay(&runtime, steps, continue_on_error)?;
            output::print_report(&report, cli.output)?;
        }
        Commands::Config => output::print_json(&config)?,
    }

    Ok(())
}
