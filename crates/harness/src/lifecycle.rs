//! Lifecycle hook slots and the ordered dispatcher
//!
//! The engine calls one dispatch method per lifecycle point; registered
//! services run strictly sequentially in registration order, each awaited
//! before the next. Error policy is encoded in the dispatch signatures.
//! Setup hooks propagate the first failure and observer hooks absorb
//! failures into `warn` logs; completion runs every service before
//! returning the first failure.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::capability::{Capability, SessionCapabilities};
use crate::config::RunConfig;
use crate::context::{
    RunSummary, SpecContext, SuiteDescriptor, TestDescriptor, TestOutcome, WorkerId,
};
use crate::error::{Error, Result};
use crate::session::Session;

/// Every lifecycle slot, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    OnPrepare,
    OnWorkerStart,
    BeforeSession,
    BeforeRun,
    BeforeCommand,
    BeforeSuite,
    BeforeTest,
    BeforeHook,
    AfterHook,
    AfterTest,
    AfterSuite,
    AfterCommand,
    AfterRun,
    AfterSession,
    OnReload,
    OnComplete,
}

impl HookPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::OnPrepare => "on_prepare",
            HookPoint::OnWorkerStart => "on_worker_start",
            HookPoint::BeforeSession => "before_session",
            HookPoint::BeforeRun => "before_run",
            HookPoint::BeforeCommand => "before_command",
            HookPoint::BeforeSuite => "before_suite",
            HookPoint::BeforeTest => "before_test",
            HookPoint::BeforeHook => "before_hook",
            HookPoint::AfterHook => "after_hook",
            HookPoint::AfterTest => "after_test",
            HookPoint::AfterSuite => "after_suite",
            HookPoint::AfterCommand => "after_command",
            HookPoint::AfterRun => "after_run",
            HookPoint::AfterSession => "after_session",
            HookPoint::OnReload => "on_reload",
            HookPoint::OnComplete => "on_complete",
        }
    }

    /// The documented once-per-scope sequence. Command, reload, and hook
    /// wrapper slots interleave with test execution and are not part of it.
    pub fn run_order() -> [HookPoint; 11] {
        [
            HookPoint::OnPrepare,
            HookPoint::OnWorkerStart,
            HookPoint::BeforeSession,
            HookPoint::BeforeRun,
            HookPoint::BeforeSuite,
            HookPoint::BeforeTest,
            HookPoint::AfterTest,
            HookPoint::AfterSuite,
            HookPoint::AfterRun,
            HookPoint::AfterSession,
            HookPoint::OnComplete,
        ]
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lifecycle service. Every slot defaults to a no-op; implement the
/// ones the service cares about.
///
/// Inputs are read-only borrows of engine records; the only thing a service
/// may write to is the spec context it is handed at `before_run`.
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    /// Stable name used in log lines and dispatch errors.
    fn name(&self) -> &str;

    /// Launcher scope, once before any worker starts.
    async fn on_prepare(&self, _config: &RunConfig, _capabilities: &[Capability]) -> Result<()> {
        Ok(())
    }

    /// Worker process scope, once per spawned worker.
    async fn on_worker_start(
        &self,
        _worker: &WorkerId,
        _capability: &Capability,
        _specs: &[PathBuf],
    ) -> Result<()> {
        Ok(())
    }

    /// Just before the WebDriver session is created.
    async fn before_session(
        &self,
        _config: &RunConfig,
        _capability: &Capability,
        _specs: &[PathBuf],
    ) -> Result<()> {
        Ok(())
    }

    /// Session is live, specs are about to execute. Services contribute
    /// their handles to the injected context here.
    async fn before_run(
        &self,
        _capabilities: &SessionCapabilities,
        _specs: &[PathBuf],
        _context: &mut SpecContext,
    ) -> Result<()> {
        Ok(())
    }

    async fn before_command(&self, _name: &str, _args: &[String]) -> Result<()> {
        Ok(())
    }

    async fn before_suite(&self, _suite: &SuiteDescriptor) -> Result<()> {
        Ok(())
    }

    async fn before_test(&self, _test: &TestDescriptor, _session: &dyn Session) -> Result<()> {
        Ok(())
    }

    /// A setup or teardown block inside a suite is about to run. The
    /// descriptor names the block, not a test body.
    async fn before_hook(&self, _test: &TestDescriptor) -> Result<()> {
        Ok(())
    }

    /// A setup or teardown block finished, with the outcome recorded for it.
    async fn after_hook(&self, _test: &TestDescriptor, _outcome: &TestOutcome) -> Result<()> {
        Ok(())
    }

    /// After each test, with the outcome the engine recorded for it.
    async fn after_test(
        &self,
        _test: &TestDescriptor,
        _session: &dyn Session,
        _outcome: &TestOutcome,
    ) -> Result<()> {
        Ok(())
    }

    async fn after_suite(&self, _suite: &SuiteDescriptor) -> Result<()> {
        Ok(())
    }

    async fn after_command(
        &self,
        _name: &str,
        _args: &[String],
        _result: Option<&str>,
        _error: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }

    /// All specs in the session have finished.
    async fn after_run(
        &self,
        _exit_code: i32,
        _capabilities: &SessionCapabilities,
        _specs: &[PathBuf],
    ) -> Result<()> {
        Ok(())
    }

    /// Session is gone; per-worker artifacts get written here.
    async fn after_session(
        &self,
        _config: &RunConfig,
        _capability: &Capability,
        _specs: &[PathBuf],
    ) -> Result<()> {
        Ok(())
    }

    /// The engine replaced the session mid-run.
    async fn on_reload(&self, _old_session_id: &str, _new_session_id: &str) -> Result<()> {
        Ok(())
    }

    /// Launcher scope, once after every worker has finished.
    async fn on_complete(
        &self,
        _exit_code: i32,
        _capabilities: &[Capability],
        _summary: &RunSummary,
    ) -> Result<()> {
        Ok(())
    }
}

/// Ordered registry of lifecycle services.
#[derive(Default)]
pub struct HookDispatcher {
    services: Vec<Box<dyn LifecycleHooks>>,
}

impl HookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: LifecycleHooks + 'static>(&mut self, service: S) {
        self.services.push(Box::new(service));
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    fn fatal(hook: HookPoint, service: &dyn LifecycleHooks, source: Error) -> Error {
        Error::Hook {
            hook: hook.as_str(),
            service: service.name().to_string(),
            source: Box::new(source),
        }
    }

    fn absorb(hook: HookPoint, service: &dyn LifecycleHooks, result: Result<()>) {
        if let Err(error) = result {
            warn!(
                hook = hook.as_str(),
                service = service.name(),
                %error,
                "hook service failed; continuing"
            );
        }
    }

    // Setup class: first failure aborts the run.

    pub async fn on_prepare(&self, config: &RunConfig, capabilities: &[Capability]) -> Result<()> {
        for service in &self.services {
            service
                .on_prepare(config, capabilities)
                .await
                .map_err(|e| Self::fatal(HookPoint::OnPrepare, service.as_ref(), e))?;
        }
        Ok(())
    }

    pub async fn on_worker_start(
        &self,
        worker: &WorkerId,
        capability: &Capability,
        specs: &[PathBuf],
    ) -> Result<()> {
        for service in &self.services {
            service
                .on_worker_start(worker, capability, specs)
                .await
                .map_err(|e| Self::fatal(HookPoint::OnWorkerStart, service.as_ref(), e))?;
        }
        Ok(())
    }

    pub async fn before_session(
        &self,
        config: &RunConfig,
        capability: &Capability,
        specs: &[PathBuf],
    ) -> Result<()> {
        for service in &self.services {
            service
                .before_session(config, capability, specs)
                .await
                .map_err(|e| Self::fatal(HookPoint::BeforeSession, service.as_ref(), e))?;
        }
        Ok(())
    }

    /// Build the spec context for this session and let every service
    /// contribute its handles. The engine hands the returned context to
    /// spec code in place of any process-wide namespace.
    pub async fn before_run(
        &self,
        capabilities: &SessionCapabilities,
        specs: &[PathBuf],
    ) -> Result<SpecContext> {
        let mut context = SpecContext::default();
        for service in &self.services {
            service
                .before_run(capabilities, specs, &mut context)
                .await
                .map_err(|e| Self::fatal(HookPoint::BeforeRun, service.as_ref(), e))?;
        }
        Ok(context)
    }

    // Observer class: failures are logged and never propagate.

    pub async fn before_command(&self, name: &str, args: &[String]) {
        for service in &self.services {
            let result = service.before_command(name, args).await;
            Self::absorb(HookPoint::BeforeCommand, service.as_ref(), result);
        }
    }

    pub async fn before_suite(&self, suite: &SuiteDescriptor) {
        for service in &self.services {
            let result = service.before_suite(suite).await;
            Self::absorb(HookPoint::BeforeSuite, service.as_ref(), result);
        }
    }

    pub async fn before_test(&self, test: &TestDescriptor, session: &dyn Session) {
        for service in &self.services {
            let result = service.before_test(test, session).await;
            Self::absorb(HookPoint::BeforeTest, service.as_ref(), result);
        }
    }

    pub async fn before_hook(&self, test: &TestDescriptor) {
        for service in &self.services {
            let result = service.before_hook(test).await;
            Self::absorb(HookPoint::BeforeHook, service.as_ref(), result);
        }
    }

    pub async fn after_hook(&self, test: &TestDescriptor, outcome: &TestOutcome) {
        for service in &self.services {
            let result = service.after_hook(test, outcome).await;
            Self::absorb(HookPoint::AfterHook, service.as_ref(), result);
        }
    }

    pub async fn after_test(
        &self,
        test: &TestDescriptor,
        session: &dyn Session,
        outcome: &TestOutcome,
    ) {
        for service in &self.services {
            let result = service.after_test(test, session, outcome).await;
            Self::absorb(HookPoint::AfterTest, service.as_ref(), result);
        }
    }

    pub async fn after_suite(&self, suite: &SuiteDescriptor) {
        for service in &self.services {
            let result = service.after_suite(suite).await;
            Self::absorb(HookPoint::AfterSuite, service.as_ref(), result);
        }
    }

    pub async fn after_command(
        &self,
        name: &str,
        args: &[String],
        result: Option<&str>,
        error: Option<&str>,
    ) {
        for service in &self.services {
            let outcome = service.after_command(name, args, result, error).await;
            Self::absorb(HookPoint::AfterCommand, service.as_ref(), outcome);
        }
    }

    pub async fn after_run(
        &self,
        exit_code: i32,
        capabilities: &SessionCapabilities,
        specs: &[PathBuf],
    ) {
        for service in &self.services {
            let result = service.after_run(exit_code, capabilities, specs).await;
            Self::absorb(HookPoint::AfterRun, service.as_ref(), result);
        }
    }

    pub async fn after_session(
        &self,
        config: &RunConfig,
        capability: &Capability,
        specs: &[PathBuf],
    ) {
        for service in &self.services {
            let result = service.after_session(config, capability, specs).await;
            Self::absorb(HookPoint::AfterSession, service.as_ref(), result);
        }
    }

    pub async fn on_reload(&self, old_session_id: &str, new_session_id: &str) {
        for service in &self.services {
            let result = service.on_reload(old_session_id, new_session_id).await;
            Self::absorb(HookPoint::OnReload, service.as_ref(), result);
        }
    }

    // Completion: every service runs, then the first failure surfaces.

    pub async fn on_complete(
        &self,
        exit_code: i32,
        capabilities: &[Capability],
        summary: &RunSummary,
    ) -> Result<()> {
        let mut first_error = None;
        for service in &self.services {
            if let Err(e) = service.on_complete(exit_code, capabilities, summary).await {
                let wrapped = Self::fatal(HookPoint::OnComplete, service.as_ref(), e);
                if first_error.is_none() {
                    first_error = Some(wrapped);
                } else {
                    warn!(
                        service = service.name(),
                        error = %wrapped,
                        "additional completion failure"
                    );
                }
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
