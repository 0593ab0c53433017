//! Engine-owned lifecycle records and the injected spec context
//!
//! Everything here except [`SpecContext`] is created and mutated by the
//! external engine; hooks receive borrows and only observe. [`SpecContext`]
//! is the one record the harness itself builds: the explicit
//! dependency-injection replacement for ambient globals, assembled during
//! the before-run hook and handed to each spec's execution scope.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::reporter::Reporter;
use crate::screenshot::Screenshots;

/// Identity of one parallel worker: capability index plus instance index
/// within that capability. Formats as `"0-1"`, which is also what shard
/// filenames embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    pub capability: usize,
    pub instance: usize,
}

impl WorkerId {
    pub fn new(capability: usize, instance: usize) -> Self {
        Self {
            capability,
            instance,
        }
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.capability, self.instance)
    }
}

/// Per-suite record, read-only to hooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl SuiteDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
        }
    }
}

/// Per-test record, read-only to hooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDescriptor {
    /// Title of the test itself
    pub title: String,

    /// Title including the enclosing suite chain
    pub full_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl TestDescriptor {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            full_title: title.clone(),
            title,
            file: None,
        }
    }

    pub fn in_suite(suite: &SuiteDescriptor, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            full_title: format!("{} {}", suite.name, title),
            title,
            file: suite.file.clone(),
        }
    }
}

/// The error a failed test carries.
///
/// Failures travel as data inside [`TestOutcome`], never as hook errors;
/// the presence of this record is what makes a test "failed" to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestFailure {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
        }
    }
}

impl std::fmt::Display for TestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{}: {}", kind, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Retry bookkeeping for one test
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RetryInfo {
    /// Attempts already made
    pub attempts: u32,

    /// Configured retry limit
    pub limit: u32,
}

/// Outcome record the engine hands to after-test observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Present exactly when the test failed. Screenshot capture keys off
    /// `error.is_some()`, not off `passed`.
    pub error: Option<TestFailure>,

    pub duration: Duration,

    pub passed: bool,

    pub retries: RetryInfo,
}

impl TestOutcome {
    pub fn passed(duration: Duration) -> Self {
        Self {
            error: None,
            duration,
            passed: true,
            retries: RetryInfo::default(),
        }
    }

    pub fn failed(error: TestFailure, duration: Duration) -> Self {
        Self {
            error: Some(error),
            duration,
            passed: false,
            retries: RetryInfo::default(),
        }
    }
}

/// Aggregate results for the whole run, handed to on-complete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Handles injected into each spec's execution scope.
///
/// The reference runner registered these on a process-wide namespace before
/// the run; here the before-run dispatch builds one context and the engine
/// passes it along explicitly.
#[derive(Debug, Clone, Default)]
pub struct SpecContext {
    /// Reporting handle: feature labels, environment facts
    pub reporter: Reporter,

    /// Screenshot utility
    pub screenshots: Screenshots,

    /// Assertion helper
    pub checks: Checks,
}

/// Assertion helper exposed to spec code.
///
/// Checks return `Result` so spec code propagates with `?`; a failed check
/// converts into the [`TestFailure`] the outcome record carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checks;

impl Checks {
    pub fn require(&self, condition: bool, message: impl Into<String>) -> CheckResult {
        if condition {
            Ok(())
        } else {
            Err(CheckFailure {
                message: message.into(),
            })
        }
    }

    pub fn require_eq<T>(&self, left: T, right: T, context: &str) -> CheckResult
    where
        T: PartialEq + std::fmt::Debug,
    {
        if left == right {
            Ok(())
        } else {
            Err(CheckFailure {
                message: format!("{}: expected {:?}, got {:?}", context, right, left),
            })
        }
    }
}

pub type CheckResult = std::result::Result<(), CheckFailure>;

/// A failed spec-code check
#[derive(Debug, Clone)]
pub struct CheckFailure {
    pub message: String,
}

impl std::fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CheckFailure {}

impl From<CheckFailure> for TestFailure {
    fn from(failure: CheckFailure) -> Self {
        Self {
            message: failure.message,
            kind: Some("check".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_formats_as_shard_suffix() {
        assert_eq!(WorkerId::new(0, 0).to_string(), "0-0");
        assert_eq!(WorkerId::new(2, 13).to_string(), "2-13");
    }

    #[test]
    fn outcome_error_presence_tracks_failure() {
        let ok = TestOutcome::passed(Duration::from_millis(40));
        assert!(ok.error.is_none());
        assert!(ok.passed);

        let failed = TestOutcome::failed(
            TestFailure::new("element not visible"),
            Duration::from_millis(900),
        );
        assert!(failed.error.is_some());
        assert!(!failed.passed);
    }

    #[test]
    fn checks_convert_into_test_failures() {
        let checks = Checks;
        assert!(checks.require(true, "fine").is_ok());

        let err = checks.require_eq(2 + 2, 5, "arithmetic").unwrap_err();
        let failure: TestFailure = err.into();
        assert_eq!(failure.kind.as_deref(), Some("check"));
        assert!(failure.message.contains("expected 5"));
    }

    #[test]
    fn full_title_includes_suite() {
        let suite = SuiteDescriptor::new("Dynamic ID");
        let test = TestDescriptor::in_suite(&suite, "clicks a button with a dynamic id");
        assert_eq!(
            test.full_title,
            "Dynamic ID clicks a button with a dynamic id"
        );
    }

    #[test]
    fn summary_success_means_zero_failures() {
        let mut summary = RunSummary {
            total: 4,
            passed: 4,
            ..Default::default()
        };
        assert!(summary.success());
        summary.failed = 1;
        assert!(!summary.success());
    }
}
