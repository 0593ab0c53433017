//! Report-shard merging
//!
//! The terminal consolidation step: scan the report directory for per-worker
//! shard files, parse and fold them, and write one combined artifact. The
//! fold is deterministic (shard order is filename order, nothing merge-time
//! is introduced), so re-merging the same shard set yields a byte-identical
//! artifact.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::capability::SessionCapabilities;
use crate::error::{Error, Result};
use crate::pattern::Pattern;
use crate::reporter::{ReportShard, ReportStats, SuiteReport};

/// The combined artifact written next to the shards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedReport {
    /// Shard filenames folded in, in fold order.
    pub sources: Vec<String>,
    /// One capability record per shard, same order as `sources`.
    pub capabilities: Vec<SessionCapabilities>,
    /// Union of the shards' environment facts.
    pub environment: BTreeMap<String, String>,
    pub stats: ReportStats,
    /// Earliest shard start.
    pub start: DateTime<Utc>,
    /// Latest shard end.
    pub end: DateTime<Utc>,
    pub suites: Vec<SuiteReport>,
}

/// What a merge produced.
#[derive(Debug)]
pub struct MergeOutcome {
    pub path: PathBuf,
    pub shard_count: usize,
    pub report: MergedReport,
}

/// Merge every shard in `dir` whose filename matches `pattern` into
/// `dir/out_name`.
///
/// The output file itself is always skipped when scanning, so re-merging a
/// directory that already contains the artifact cannot fold it back in.
/// Zero matching shards is an error, as is any shard that fails to parse;
/// silently dropping a worker's results would corrupt the merged totals.
pub fn merge_shards(dir: &Path, pattern: &str, out_name: &str) -> Result<MergeOutcome> {
    let matcher = Pattern::new(pattern)?;

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name != out_name && matcher.matches_name(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(Error::NoShards {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }
    names.sort();

    let mut shards = Vec::with_capacity(names.len());
    for name in &names {
        let path = dir.join(name);
        let bytes = std::fs::read(&path)?;
        let shard: ReportShard =
            serde_json::from_slice(&bytes).map_err(|e| Error::MalformedShard {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        shards.push(shard);
    }

    let report = fold(&names, shards);
    let path = dir.join(out_name);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, json)?;

    info!(
        shards = names.len(),
        passed = report.stats.passed,
        failed = report.stats.failed,
        path = %path.display(),
        "merged report shards"
    );

    Ok(MergeOutcome {
        path,
        shard_count: names.len(),
        report,
    })
}

fn fold(names: &[String], shards: Vec<ReportShard>) -> MergedReport {
    let mut capabilities = Vec::with_capacity(shards.len());
    let mut environment = BTreeMap::new();
    let mut stats = ReportStats::default();
    let mut suites = Vec::new();
    let mut start = shards[0].start;
    let mut end = shards[0].end;

    for shard in shards {
        start = start.min(shard.start);
        end = end.max(shard.end);
        stats.add(&shard.stats);
        environment.extend(shard.environment);
        capabilities.push(shard.capabilities);
        suites.extend(shard.suites);
    }

    MergedReport {
        sources: names.to_vec(),
        capabilities,
        environment,
        stats,
        start,
        end,
        suites,
    }
}
