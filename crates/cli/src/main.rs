//! Proctor CLI - Main Entry Point
//!
//! Operator commands for the Proctor test harness: merge report shards,
//! list discovered spec files, inspect or initialise configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{config, merge, specs};

/// Proctor - lifecycle coordination and report merging for browser test runs
#[derive(Parser)]
#[command(name = "proctor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the run configuration file
    #[arg(long, default_value = "proctor.toml", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge report shards into a single artifact
    Merge(merge::MergeArgs),

    /// List the spec files the configured globs discover
    Specs(specs::SpecsArgs),

    /// Inspect or initialise configuration
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Merge(args) => merge::execute(args, &cli.config, cli.format).await?,
        Commands::Specs(args) => specs::execute(args, &cli.config, cli.format).await?,
        Commands::Config(cmd) => config::execute(cmd, &cli.config, cli.format).await?,
        Commands::Version => {
            println!("Proctor CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Lifecycle coordination and report merging for parallel browser test runs");
        }
    }

    Ok(())
}
