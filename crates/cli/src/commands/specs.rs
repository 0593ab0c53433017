//! Specs Command
//!
//! Runs discovery with the configured include and exclude globs and lists
//! what the engine would execute.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use proctor_harness::discovery::{discover, SpecFilter};

use crate::commands::load_config;
use crate::output::{print_list, print_message, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct SpecsArgs {
    /// Root directory to search
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

/// Discovered spec file for display
#[derive(Serialize, Clone)]
struct SpecEntry {
    path: String,
}

impl TableDisplay for SpecEntry {
    fn headers() -> Vec<&'static str> {
        vec!["Spec"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.path.clone()]
    }
}

pub async fn execute(args: SpecsArgs, config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;
    let filter = SpecFilter::from_config(&config)?;
    let specs = discover(&args.root, &filter)?;

    let entries: Vec<SpecEntry> = specs
        .iter()
        .map(|p| SpecEntry {
            path: p
                .strip_prefix(&args.root)
                .unwrap_or(p)
                .display()
                .to_string(),
        })
        .collect();

    print_list(&entries, format);
    if !matches!(format, OutputFormat::Json) {
        print_message(&format!("{} spec files", entries.len()), format);
    }

    Ok(())
}
