//! Full-run flow: two workers driven through the canonical hook order,
//! then the launcher merge over their shard files.

use std::path::PathBuf;
use std::time::Duration;

use proctor_harness::capability::{Capability, SessionCapabilities};
use proctor_harness::config::RunConfig;
use proctor_harness::context::{
    RunSummary, SuiteDescriptor, TestDescriptor, TestFailure, TestOutcome, WorkerId,
};
use proctor_harness::merge::MergedReport;
use proctor_harness::reporter::ReportShard;
use proctor_harness::services::Coordinator;
use proctor_harness::session::{Session, StaticSession};

fn config_in(dir: &std::path::Path) -> RunConfig {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut config = RunConfig::default();
    config.report.dir = dir.join("report/json");
    config.report.screenshot_dir = dir.join("report/screenshots");
    config
}

/// Drive one worker session through every per-worker hook, in order: one
/// suite with a passing test and, optionally, a failing one.
async fn run_worker(
    config: &RunConfig,
    worker: WorkerId,
    session: &StaticSession,
    suite_name: &str,
    fail_one: bool,
) -> proctor_harness::Result<()> {
    let specs = vec![PathBuf::from(format!(
        "test/{}.spec.js",
        suite_name.replace(' ', "-")
    ))];
    let capability = Capability::default();
    let dispatcher = Coordinator::worker(config, worker);

    dispatcher.on_worker_start(&worker, &capability, &specs).await?;
    dispatcher.before_session(config, &capability, &specs).await?;
    let _context = dispatcher.before_run(session.capabilities(), &specs).await?;

    let suite = SuiteDescriptor::new(suite_name);
    dispatcher.before_suite(&suite).await;

    let passing = TestDescriptor::in_suite(&suite, "loads the page");
    dispatcher.before_test(&passing, session).await;
    dispatcher
        .after_test(&passing, session, &TestOutcome::passed(Duration::from_millis(120)))
        .await;

    if fail_one {
        let failing = TestDescriptor::in_suite(&suite, "reads the hidden row");
        dispatcher.before_test(&failing, session).await;
        dispatcher
            .after_test(
                &failing,
                session,
                &TestOutcome::failed(
                    TestFailure::new("row not found"),
                    Duration::from_millis(340),
                ),
            )
            .await;
    }

    dispatcher.after_suite(&suite).await;
    dispatcher.after_run(0, session.capabilities(), &specs).await;
    dispatcher.after_session(config, &capability, &specs).await;
    Ok(())
}

fn read_merged(config: &RunConfig) -> MergedReport {
    let bytes = std::fs::read(config.report.merged_path()).expect("merged artifact on disk");
    serde_json::from_slice(&bytes).expect("merged artifact parses")
}

#[tokio::test]
async fn two_workers_produce_one_merged_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let launcher = Coordinator::launcher(&config);
    launcher
        .on_prepare(&config, &config.capabilities)
        .await
        .unwrap();

    let session = StaticSession::new(SessionCapabilities::new("chrome", "120.0", "linux"));
    run_worker(&config, WorkerId::new(0, 0), &session, "dynamic table", false)
        .await
        .unwrap();
    run_worker(&config, WorkerId::new(0, 1), &session, "progress bar", true)
        .await
        .unwrap();

    let summary = RunSummary {
        total: 3,
        passed: 2,
        failed: 1,
        skipped: 0,
        duration_ms: 580,
    };
    launcher
        .on_complete(1, &config.capabilities, &summary)
        .await
        .unwrap();

    let merged = read_merged(&config);
    assert_eq!(merged.sources, ["results-0-0.json", "results-0-1.json"]);
    assert_eq!(merged.suites.len(), 2);
    assert_eq!(merged.suites[0].name, "dynamic table");
    assert_eq!(merged.suites[1].name, "progress bar");
    assert_eq!(merged.suites[1].feature.as_deref(), Some("progress bar"));
    assert_eq!(merged.stats.passed, 2);
    assert_eq!(merged.stats.failed, 1);

    // session facts recorded before every test: exactly the three keys
    assert_eq!(merged.environment.len(), 3);
    assert_eq!(merged.environment["BROWSER"], "chrome");
    assert_eq!(merged.environment["BROWSER_VERSION"], "120.0");
    assert_eq!(merged.environment["PLATFORM"], "linux");

    // one failing test, one screenshot
    let shots: Vec<_> = std::fs::read_dir(&config.report.screenshot_dir)
        .expect("screenshot dir created")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(shots.len(), 1, "exactly one capture for the one failure");
    assert!(shots[0].starts_with("reads_the_hidden_row"));
    assert!(shots[0].ends_with(".png"));
}

#[tokio::test]
async fn capture_refusal_does_not_lose_the_test_result() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let session = StaticSession::default().failing_capture("no such window");
    run_worker(&config, WorkerId::new(0, 0), &session, "flaky suite", true)
        .await
        .unwrap();

    let shard_path = config.report.dir.join("results-0-0.json");
    let shard: ReportShard =
        serde_json::from_slice(&std::fs::read(&shard_path).unwrap()).unwrap();
    assert_eq!(shard.stats.failed, 1, "failure reported despite capture refusal");
    assert_eq!(shard.stats.passed, 1);
    assert!(
        !config.report.screenshot_dir.exists(),
        "no partial screenshot output"
    );
}

#[tokio::test]
async fn worker_shards_land_under_disjoint_names() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let session = StaticSession::default();

    run_worker(&config, WorkerId::new(0, 0), &session, "alpha", false)
        .await
        .unwrap();
    run_worker(&config, WorkerId::new(1, 2), &session, "beta", false)
        .await
        .unwrap();

    assert!(config.report.dir.join("results-0-0.json").exists());
    assert!(config.report.dir.join("results-1-2.json").exists());
}
