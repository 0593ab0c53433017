//! Reporting handle and the per-worker shard schema
//!
//! Each worker session accumulates suite annotations, environment facts,
//! and per-test records through a [`Reporter`] handle, then drains the lot
//! into a [`ReportShard`] when the session ends. Shards are what the merge
//! step consolidates into the final artifact.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::capability::SessionCapabilities;
use crate::context::{TestDescriptor, TestOutcome, WorkerId};

/// Terminal state of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    Passed,
    Failed,
    Skipped,
}

/// One test entry inside a suite report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    pub title: String,
    pub state: TestState,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub retries: u32,
}

impl TestReport {
    /// Build a report entry from an engine outcome record. An outcome that
    /// carries an error is failed regardless of its `passed` flag; one with
    /// neither error nor pass is skipped.
    pub fn from_outcome(test: &TestDescriptor, outcome: &TestOutcome) -> Self {
        let state = if outcome.error.is_some() {
            TestState::Failed
        } else if outcome.passed {
            TestState::Passed
        } else {
            TestState::Skipped
        };
        Self {
            title: test.title.clone(),
            state,
            duration_ms: outcome.duration.as_millis() as u64,
            error: outcome.error.as_ref().map(|e| e.to_string()),
            retries: outcome.retries.attempts,
        }
    }
}

/// One suite and its tests, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default)]
    pub tests: Vec<TestReport>,
}

impl SuiteReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feature: None,
            tests: Vec::new(),
        }
    }
}

/// Pass/fail tallies for a shard or a merged report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub duration_ms: u64,
}

impl ReportStats {
    pub fn tally(suites: &[SuiteReport]) -> Self {
        let mut stats = Self::default();
        for test in suites.iter().flat_map(|s| &s.tests) {
            match test.state {
                TestState::Passed => stats.passed += 1,
                TestState::Failed => stats.failed += 1,
                TestState::Skipped => stats.skipped += 1,
            }
            stats.duration_ms += test.duration_ms;
        }
        stats
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.skipped
    }

    pub fn add(&mut self, other: &ReportStats) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.duration_ms += other.duration_ms;
    }
}

/// The JSON document one worker writes when its session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportShard {
    pub worker: String,
    pub capabilities: SessionCapabilities,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    pub stats: ReportStats,
    #[serde(default)]
    pub suites: Vec<SuiteReport>,
}

#[derive(Debug)]
struct ReporterState {
    started: DateTime<Utc>,
    environment: BTreeMap<String, String>,
    suites: Vec<SuiteReport>,
    open: Option<SuiteReport>,
    pending_feature: Option<String>,
}

impl Default for ReporterState {
    fn default() -> Self {
        Self {
            started: Utc::now(),
            environment: BTreeMap::new(),
            suites: Vec::new(),
            open: None,
            pending_feature: None,
        }
    }
}

/// Cheap-clone reporting handle shared between hook services and spec code.
///
/// All annotation methods take `&self`; state lives behind a mutex so clones
/// handed out through the spec context observe the same shard.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    inner: Arc<Mutex<ReporterState>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag the open suite with a feature label. With no suite open the
    /// label is held and applied to the next suite that opens.
    pub fn add_feature(&self, label: impl Into<String>) {
        let label = label.into();
        let mut state = self.inner.lock();
        match state.open.as_mut() {
            Some(suite) => suite.feature = Some(label),
            None => state.pending_feature = Some(label),
        }
    }

    /// Record an environment fact. Re-recording a key overwrites its value.
    pub fn add_environment(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.lock().environment.insert(key.into(), value.into());
    }

    pub fn begin_suite(&self, name: impl Into<String>) {
        let mut state = self.inner.lock();
        if let Some(previous) = state.open.take() {
            state.suites.push(previous);
        }
        let mut suite = SuiteReport::new(name);
        suite.feature = state.pending_feature.take();
        state.open = Some(suite);
    }

    pub fn end_suite(&self) {
        let mut state = self.inner.lock();
        if let Some(suite) = state.open.take() {
            state.suites.push(suite);
        }
    }

    pub fn record_test(&self, test: TestReport) {
        let mut state = self.inner.lock();
        match state.open.as_mut() {
            Some(suite) => suite.tests.push(test),
            None => {
                let mut suite = SuiteReport::new("(no suite)");
                suite.tests.push(test);
                state.suites.push(suite);
            }
        }
    }

    /// Drain everything recorded so far into a shard and reset the handle
    /// for the next session.
    pub fn take_shard(&self, worker: &WorkerId, capabilities: &SessionCapabilities) -> ReportShard {
        let mut state = self.inner.lock();
        if let Some(suite) = state.open.take() {
            state.suites.push(suite);
        }
        let drained = std::mem::take(&mut *state);
        let stats = ReportStats::tally(&drained.suites);
        ReportShard {
            worker: worker.to_string(),
            capabilities: capabilities.clone(),
            start: drained.started,
            end: Utc::now(),
            environment: drained.environment,
            stats,
            suites: drained.suites,
        }
    }
}
