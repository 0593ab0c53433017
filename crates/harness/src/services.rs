//! Built-in lifecycle services
//!
//! The coordinator behaviors as composable [`LifecycleHooks`] services:
//! shard-writing JSON reporting, suite feature tagging, session environment
//! tagging, failure screenshots, and the terminal shard merge. `Coordinator`
//! wires them in the order the behaviors depend on: the reporter must open a
//! suite before the tagger labels it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::capability::{Capability, SessionCapabilities};
use crate::config::{ReportConfig, RunConfig};
use crate::context::{RunSummary, SpecContext, SuiteDescriptor, TestDescriptor, TestOutcome, WorkerId};
use crate::error::Result;
use crate::lifecycle::{HookDispatcher, LifecycleHooks};
use crate::merge::merge_shards;
use crate::reporter::{Reporter, TestReport};
use crate::screenshot::Screenshots;
use crate::session::Session;

/// Records suites and tests through the run and writes this worker's shard
/// file when the session ends.
pub struct JsonReporter {
    worker: WorkerId,
    report: ReportConfig,
    reporter: Reporter,
    session: Arc<Mutex<Option<SessionCapabilities>>>,
}

impl JsonReporter {
    pub fn new(worker: WorkerId, report: ReportConfig) -> Self {
        Self {
            worker,
            report,
            reporter: Reporter::new(),
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// The shared reporting handle; clones observe the same shard.
    pub fn reporter(&self) -> Reporter {
        self.reporter.clone()
    }

    fn session_capabilities(&self) -> SessionCapabilities {
        self.session.lock().clone().unwrap_or_default()
    }
}

#[async_trait]
impl LifecycleHooks for JsonReporter {
    fn name(&self) -> &str {
        "json-reporter"
    }

    async fn before_run(
        &self,
        capabilities: &SessionCapabilities,
        _specs: &[PathBuf],
        context: &mut SpecContext,
    ) -> Result<()> {
        *self.session.lock() = Some(capabilities.clone());
        context.reporter = self.reporter.clone();
        Ok(())
    }

    async fn before_suite(&self, suite: &SuiteDescriptor) -> Result<()> {
        self.reporter.begin_suite(&suite.name);
        Ok(())
    }

    async fn after_test(
        &self,
        test: &TestDescriptor,
        _session: &dyn Session,
        outcome: &TestOutcome,
    ) -> Result<()> {
        self.reporter.record_test(TestReport::from_outcome(test, outcome));
        Ok(())
    }

    async fn after_suite(&self, _suite: &SuiteDescriptor) -> Result<()> {
        self.reporter.end_suite();
        Ok(())
    }

    async fn after_session(
        &self,
        _config: &RunConfig,
        _capability: &Capability,
        _specs: &[PathBuf],
    ) -> Result<()> {
        let shard = self
            .reporter
            .take_shard(&self.worker, &self.session_capabilities());
        std::fs::create_dir_all(&self.report.dir)?;
        let path = self.report.dir.join(self.report.shard_file_name(&self.worker));
        let json = serde_json::to_string_pretty(&shard)?;
        std::fs::write(&path, json)?;
        info!(
            worker = %self.worker,
            passed = shard.stats.passed,
            failed = shard.stats.failed,
            path = %path.display(),
            "wrote report shard"
        );
        Ok(())
    }
}

/// Labels each suite with a feature named after it.
pub struct SuiteTagger {
    reporter: Reporter,
}

impl SuiteTagger {
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl LifecycleHooks for SuiteTagger {
    fn name(&self) -> &str {
        "suite-tagger"
    }

    async fn before_suite(&self, suite: &SuiteDescriptor) -> Result<()> {
        self.reporter.add_feature(&suite.name);
        Ok(())
    }
}

/// Records the active session's facts as environment entries before every
/// test: browser name, browser version, platform.
pub struct SessionTagger {
    reporter: Reporter,
}

impl SessionTagger {
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl LifecycleHooks for SessionTagger {
    fn name(&self) -> &str {
        "session-tagger"
    }

    async fn before_test(&self, _test: &TestDescriptor, session: &dyn Session) -> Result<()> {
        let caps = session.capabilities();
        self.reporter.add_environment("BROWSER", &caps.browser_name);
        self.reporter.add_environment("BROWSER_VERSION", &caps.version);
        self.reporter.add_environment("PLATFORM", &caps.platform);
        Ok(())
    }
}

/// Captures a screenshot after each test that carries an error.
///
/// One attempt per failing test; a capture error is logged and swallowed
/// here, so this hook never fails a suite.
pub struct FailureScreenshots {
    screenshots: Screenshots,
}

impl FailureScreenshots {
    pub fn new(screenshots: Screenshots) -> Self {
        Self { screenshots }
    }
}

#[async_trait]
impl LifecycleHooks for FailureScreenshots {
    fn name(&self) -> &str {
        "failure-screenshots"
    }

    async fn before_run(
        &self,
        _capabilities: &SessionCapabilities,
        _specs: &[PathBuf],
        context: &mut SpecContext,
    ) -> Result<()> {
        context.screenshots = self.screenshots.clone();
        Ok(())
    }

    async fn after_test(
        &self,
        test: &TestDescriptor,
        session: &dyn Session,
        outcome: &TestOutcome,
    ) -> Result<()> {
        if outcome.error.is_none() {
            return Ok(());
        }
        match self.screenshots.capture(session, &test.title).await {
            Ok(path) => {
                info!(test = %test.full_title, path = %path.display(), "captured failure screenshot");
            }
            Err(error) => {
                warn!(test = %test.full_title, %error, "failure screenshot not captured");
            }
        }
        Ok(())
    }
}

/// Runs the terminal shard merge once all workers have finished.
pub struct ShardMerger {
    report: ReportConfig,
}

impl ShardMerger {
    pub fn new(report: ReportConfig) -> Self {
        Self { report }
    }
}

#[async_trait]
impl LifecycleHooks for ShardMerger {
    fn name(&self) -> &str {
        "shard-merger"
    }

    async fn on_complete(
        &self,
        _exit_code: i32,
        _capabilities: &[Capability],
        _summary: &RunSummary,
    ) -> Result<()> {
        let outcome = merge_shards(
            &self.report.dir,
            &self.report.shard_pattern(),
            &self.report.merged_name,
        )?;
        info!(
            shards = outcome.shard_count,
            path = %outcome.path.display(),
            "report shards merged"
        );
        Ok(())
    }
}

/// Standard service compositions.
pub struct Coordinator;

impl Coordinator {
    /// The per-worker stack: shard reporting, suite and session tagging,
    /// failure screenshots. Registration order matters: the reporter opens
    /// the suite before the tagger labels it.
    pub fn worker(config: &RunConfig, worker: WorkerId) -> HookDispatcher {
        let mut dispatcher = HookDispatcher::new();
        let json = JsonReporter::new(worker, config.report.clone());
        let reporter = json.reporter();
        dispatcher.register(json);
        dispatcher.register(SuiteTagger::new(reporter.clone()));
        dispatcher.register(SessionTagger::new(reporter));
        dispatcher.register(FailureScreenshots::new(Screenshots::new(
            config.report.screenshot_dir.clone(),
        )));
        dispatcher
    }

    /// The launcher stack: just the terminal merge.
    pub fn launcher(config: &RunConfig) -> HookDispatcher {
        let mut dispatcher = HookDispatcher::new();
        dispatcher.register(ShardMerger::new(config.report.clone()));
        dispatcher
    }

    /// Worker stack plus the merge, for single-process embeddings that run
    /// one dispatcher end to end.
    pub fn standard(config: &RunConfig, worker: WorkerId) -> HookDispatcher {
        let mut dispatcher = Self::worker(config, worker);
        dispatcher.register(ShardMerger::new(config.report.clone()));
        dispatcher
    }
}
