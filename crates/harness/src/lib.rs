//! Proctor test harness
//!
//! Lifecycle coordination and report consolidation for parallel browser
//! test runs. An external execution engine owns scheduling, browser
//! driving, and retries; this crate owns the ordered hook dispatch around
//! test execution and the merge of per-worker report shards into one
//! artifact.
//!
//! # Flow
//!
//! ```text
//! launcher                          worker (one per capability instance)
//!    │ on_prepare                      │ on_worker_start
//!    │                                 │ before_session
//!    │                                 │ before_run ──► SpecContext
//!    │                                 │   before_suite
//!    │                                 │     before_test
//!    │                                 │       ... test executes ...
//!    │                                 │     after_test (screenshot on error)
//!    │                                 │   after_suite
//!    │                                 │ after_run
//!    │                                 │ after_session ──► shard file
//!    │ on_complete ──► merge shards ──► merged artifact
//! ```
//!
//! Hook services run sequentially in registration order. Setup hooks
//! propagate failures and observer hooks absorb them into logs; the
//! completion hook runs every service before surfacing the first failure.

pub mod capability;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod lifecycle;
pub mod merge;
pub mod pattern;
pub mod reporter;
pub mod screenshot;
pub mod services;
pub mod session;

pub use capability::{Browser, Capability, SessionCapabilities};
pub use config::{EnvOverrides, ReportConfig, RunConfig};
pub use context::{
    RunSummary, SpecContext, SuiteDescriptor, TestDescriptor, TestFailure, TestOutcome, WorkerId,
};
pub use error::{Error, Result, ScreenshotError, SessionError};
pub use lifecycle::{HookDispatcher, HookPoint, LifecycleHooks};
pub use merge::{merge_shards, MergeOutcome, MergedReport};
pub use reporter::{ReportShard, ReportStats, Reporter};
pub use screenshot::Screenshots;
pub use services::Coordinator;
pub use session::{Session, StaticSession};

/// Proctor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
