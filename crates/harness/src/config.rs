//! Run configuration
//!
//! [`RunConfig`] is the static options record the external engine creates
//! once at process start and treats as immutable for the run. The harness
//! only reads it. Defaults mirror the reference deployment: base URL of the
//! UI playground, one Chrome capability, ten parallel sessions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capability::Capability;
use crate::context::WorkerId;
use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Per-test timeout baseline in milliseconds.
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 120_000;

/// Effectively unbounded per-test timeout used while debugging.
pub const DEBUG_TEST_TIMEOUT_MS: u64 = 99_999_999;

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "PROCTOR_BASE_URL";

/// Environment variable lifting the per-test timeout for debug sessions.
pub const ENV_DEBUG: &str = "PROCTOR_DEBUG";

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Base URL all relative navigation resolves against
    pub base_url: String,

    /// Include globs for test spec files
    pub specs: Vec<String>,

    /// Exclude globs (page-definition files living next to specs)
    pub exclude: Vec<String>,

    /// Global cap on parallel sessions across all capabilities
    pub max_instances: u32,

    /// Engine log verbosity
    pub log_level: LogLevel,

    /// Stop the run after this many test failures; 0 disables bailing
    pub bail: u32,

    /// Element-wait timeout in milliseconds
    pub wait_timeout_ms: u64,

    /// Window for session connect retries in milliseconds
    pub connection_retry_timeout_ms: u64,

    /// Session connect attempts before giving up
    pub connection_retry_count: u32,

    /// Per-test timeout baseline in milliseconds
    pub test_timeout_ms: u64,

    /// Debug mode: lifts the per-test timeout to an effectively unbounded
    /// value. Normally set from the environment, not the config file.
    #[serde(skip)]
    pub debug: bool,

    /// Browsers to launch sessions against
    pub capabilities: Vec<Capability>,

    /// Report output configuration
    pub report: ReportConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: "http://uitestingplayground.com".to_string(),
            specs: vec!["./test/**/*.spec.js".to_string()],
            exclude: vec!["./test/**/*.page.js".to_string()],
            max_instances: 10,
            log_level: LogLevel::Info,
            bail: 0,
            wait_timeout_ms: 10_000,
            connection_retry_timeout_ms: 90_000,
            connection_retry_count: 3,
            test_timeout_ms: DEFAULT_TEST_TIMEOUT_MS,
            debug: false,
            capabilities: vec![Capability::default()],
            report: ReportConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from file, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides.
    pub fn apply(&mut self, overrides: &EnvOverrides) {
        if let Some(url) = &overrides.base_url {
            self.base_url = url.clone();
        }
        if overrides.debug {
            self.debug = true;
        }
    }

    /// Effective per-test timeout.
    ///
    /// Debug sessions get [`DEBUG_TEST_TIMEOUT_MS`] so a test paused in a
    /// debugger is not killed by the engine's timer.
    pub fn test_timeout(&self) -> Duration {
        if self.debug {
            Duration::from_millis(DEBUG_TEST_TIMEOUT_MS)
        } else {
            Duration::from_millis(self.test_timeout_ms)
        }
    }

    /// Element-wait timeout.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Session connect retry window.
    pub fn connection_retry_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_retry_timeout_ms)
    }

    /// Check the configuration for values the run cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.capabilities.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one capability is required".to_string(),
            ));
        }
        if self.max_instances == 0 {
            return Err(Error::InvalidConfig(
                "max_instances must be at least 1".to_string(),
            ));
        }
        if self.specs.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one spec include glob is required".to_string(),
            ));
        }
        for glob in self.specs.iter().chain(self.exclude.iter()) {
            Pattern::new(glob)?;
        }
        Pattern::new(&self.report.shard_pattern())?;
        Ok(())
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory report shards are written into and merged from
    pub dir: PathBuf,

    /// Filename prefix for per-worker shard files
    pub shard_prefix: String,

    /// Filename of the merged artifact
    pub merged_name: String,

    /// Directory failure screenshots are written into
    pub screenshot_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("report/json"),
            shard_prefix: "results".to_string(),
            merged_name: "testResults.json".to_string(),
            screenshot_dir: PathBuf::from("report/screenshots"),
        }
    }
}

impl ReportConfig {
    /// Glob matching every shard this configuration produces.
    pub fn shard_pattern(&self) -> String {
        format!("{}-*", self.shard_prefix)
    }

    /// Shard filename for one worker. Filenames are disjoint across workers
    /// by construction, which is what lets workers write without locking.
    pub fn shard_file_name(&self, worker: &WorkerId) -> String {
        format!("{}-{}.json", self.shard_prefix, worker)
    }

    /// Full path of the merged artifact.
    pub fn merged_path(&self) -> PathBuf {
        self.dir.join(&self.merged_name)
    }
}

/// Engine log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Silent => "silent",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment overrides applied on top of the config file.
///
/// Kept as a plain record so tests can construct overrides directly instead
/// of mutating process-wide environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// `PROCTOR_BASE_URL`
    pub base_url: Option<String>,

    /// `PROCTOR_DEBUG`: anything other than empty, `0`, or `false`
    pub debug: bool,
}

impl EnvOverrides {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(ENV_BASE_URL).ok().filter(|v| !v.is_empty()),
            debug: std::env::var(ENV_DEBUG)
                .map(|v| !matches!(v.as_str(), "" | "0" | "false"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Browser;

    #[test]
    fn defaults_mirror_reference_deployment() {
        let config = RunConfig::default();
        assert_eq!(config.base_url, "http://uitestingplayground.com");
        assert_eq!(config.max_instances, 10);
        assert_eq!(config.bail, 0);
        assert_eq!(config.wait_timeout_ms, 10_000);
        assert_eq!(config.connection_retry_timeout_ms, 90_000);
        assert_eq!(config.connection_retry_count, 3);
        assert_eq!(config.capabilities.len(), 1);
        assert_eq!(config.capabilities[0].browser, Browser::Chrome);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_follows_debug_flag() {
        let mut config = RunConfig::default();
        assert_eq!(config.test_timeout(), Duration::from_millis(120_000));

        config.apply(&EnvOverrides {
            base_url: None,
            debug: true,
        });
        assert!(config.test_timeout() >= Duration::from_millis(DEBUG_TEST_TIMEOUT_MS));
    }

    #[test]
    fn base_url_override_applies() {
        let mut config = RunConfig::default();
        config.apply(&EnvOverrides {
            base_url: Some("http://localhost:3000".to_string()),
            debug: false,
        });
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(!config.debug);
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proctor.toml");

        let mut config = RunConfig::default();
        config.base_url = "http://example.test".to_string();
        config.report.shard_prefix = "wdio".to_string();
        config.save(&path).unwrap();

        let loaded = RunConfig::load(&path).unwrap();
        assert_eq!(loaded.base_url, "http://example.test");
        assert_eq!(loaded.report.shard_prefix, "wdio");
        assert_eq!(loaded.max_instances, 10);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.base_url, RunConfig::default().base_url);
    }

    #[test]
    fn validate_rejects_empty_capabilities() {
        let mut config = RunConfig::default();
        config.capabilities.clear();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_bad_glob() {
        let mut config = RunConfig::default();
        config.specs = vec!["test/[".to_string()];
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn shard_names_match_shard_pattern() {
        let report = ReportConfig::default();
        let worker = WorkerId::new(0, 1);
        let name = report.shard_file_name(&worker);
        let pattern = Pattern::new(&report.shard_pattern()).unwrap();
        assert_eq!(name, "results-0-1.json");
        assert!(pattern.matches_name(&name));
        assert!(!pattern.matches_name(&report.merged_name));
    }
}
