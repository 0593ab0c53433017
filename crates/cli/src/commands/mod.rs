//! CLI Commands

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use proctor_harness::config::{EnvOverrides, RunConfig};

pub mod config;
pub mod merge;
pub mod specs;

/// Load the run configuration and apply environment overrides. A missing
/// file yields the defaults, matching what the engine itself would see.
pub(crate) fn load_config(path: &Path) -> Result<RunConfig> {
    let mut config = RunConfig::load(path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    config.apply(&EnvOverrides::from_env());
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}
