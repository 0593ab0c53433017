//! Config Commands
//!
//! Show the effective run configuration (after environment overrides) or
//! write a default configuration file to start from.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use proctor_harness::config::RunConfig;

use crate::commands::load_config;
use crate::output::{print_success, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init(InitArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the file (defaults to the global --config path)
    pub path: Option<PathBuf>,
}

pub async fn execute(cmd: ConfigCommands, config_path: &Path, format: OutputFormat) -> Result<()> {
    match cmd {
        ConfigCommands::Show => execute_show(config_path, format),
        ConfigCommands::Init(args) => execute_init(args, config_path),
    }
}

fn execute_show(config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        _ => print!("{}", toml::to_string_pretty(&config)?),
    }
    Ok(())
}

fn execute_init(args: InitArgs, config_path: &Path) -> Result<()> {
    let target = args.path.unwrap_or_else(|| config_path.to_path_buf());
    if target.exists() {
        bail!("refusing to overwrite existing file: {}", target.display());
    }
    RunConfig::default().save(&target)?;
    print_success(&format!("Wrote default configuration to {}", target.display()));
    Ok(())
}
