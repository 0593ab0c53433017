//! Merge Command
//!
//! Standalone shard merge: scan the report directory, fold every matching
//! shard, write the combined artifact. Flags override the configured
//! directory, pattern, and output name.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use proctor_harness::error::Error;
use proctor_harness::merge::merge_shards;

use crate::commands::load_config;
use crate::output::{print_error, print_item, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct MergeArgs {
    /// Directory containing the shard files
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Shard filename glob
    #[arg(long)]
    pub pattern: Option<String>,

    /// Name of the merged artifact
    #[arg(long)]
    pub out: Option<String>,
}

/// Merge result for display
#[derive(Serialize)]
struct MergeSummary {
    path: String,
    shards: usize,
    passed: u32,
    failed: u32,
    skipped: u32,
    duration_ms: u64,
}

impl TableDisplay for MergeSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Artifact", "Shards", "Passed", "Failed", "Skipped", "Duration (ms)"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.path.clone(),
            self.shards.to_string(),
            self.passed.to_string(),
            self.failed.to_string(),
            self.skipped.to_string(),
            self.duration_ms.to_string(),
        ]
    }
}

pub async fn execute(args: MergeArgs, config_path: &Path, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;
    let dir = args.dir.unwrap_or_else(|| config.report.dir.clone());
    let pattern = args.pattern.unwrap_or_else(|| config.report.shard_pattern());
    let out = args.out.unwrap_or_else(|| config.report.merged_name.clone());

    let outcome = match merge_shards(&dir, &pattern, &out) {
        Ok(outcome) => outcome,
        Err(e @ Error::NoShards { .. }) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let stats = outcome.report.stats;
    let summary = MergeSummary {
        path: outcome.path.display().to_string(),
        shards: outcome.shard_count,
        passed: stats.passed,
        failed: stats.failed,
        skipped: stats.skipped,
        duration_ms: stats.duration_ms,
    };
    print_item(&summary, format);

    if matches!(format, OutputFormat::Table) {
        let verdict = if stats.failed > 0 {
            format!("{} failed", stats.failed).red().to_string()
        } else {
            "all passed".green().to_string()
        };
        println!(
            "Merged {} shards: {} tests, {}",
            outcome.shard_count,
            stats.total(),
            verdict
        );
    }

    Ok(())
}
