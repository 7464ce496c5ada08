//! Retry budget semantics.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use gauntlet_core::testing::{RecordingReporter, TestEvent};
use gauntlet_core::{Gauntlet, RunArgs};
use gauntlet_expect::expect;
use serde_json::json;

fn recording() -> (RunArgs, gauntlet_core::testing::EventLog) {
    let reporter = RecordingReporter::new();
    let log = reporter.log();
    (RunArgs::new().with_reporter(Box::new(reporter)), log)
}

/// A test body that fails its first `failures` invocations, then passes.
fn flaky(failures: u32) -> (Arc<AtomicU32>, impl Fn() -> anyhow::Result<()> + Clone) {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let body = move || {
        if counter.fetch_add(1, Ordering::SeqCst) < failures {
            anyhow::bail!("flaky failure");
        }
        Ok(())
    };
    (attempts, body)
}

#[tokio::test]
async fn flaky_test_passes_within_its_retry_budget() {
    let (attempts, body) = flaky(2);
    let engine = Gauntlet::new();
    engine.suite("flaky").test("settles", move |_, _| {
        let body = body.clone();
        async move { body() }
    });

    let (args, log) = recording();
    let summary = engine.run(args.with_retries(2)).await.unwrap();

    assert_eq!((summary.failed, summary.passed), (0, 1));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    // Intermediate failures are invisible to reporters.
    assert_eq!(log.failed_count(), 0);
    assert_eq!(log.passed_count(), 1);
}

#[tokio::test]
async fn exhausted_retries_report_a_single_failure() {
    let (attempts, body) = flaky(u32::MAX);
    let engine = Gauntlet::new();
    engine.suite("doomed").test("never settles", move |_, _| {
        let body = body.clone();
        async move { body() }
    });

    let (args, log) = recording();
    let summary = engine.run(args.with_retries(3)).await.unwrap();

    assert_eq!((summary.failed, summary.passed), (1, 0));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(log.failed_count(), 1);
    expect(log.failure_messages()[0].as_str())
        .to_contain("flaky failure")
        .unwrap();
}

#[tokio::test]
async fn started_test_is_emitted_once_across_attempts() {
    let (_, body) = flaky(1);
    let engine = Gauntlet::new();
    engine.suite("flaky").test("settles", move |_, _| {
        let body = body.clone();
        async move { body() }
    });

    let (args, log) = recording();
    engine.run(args.with_retries(1)).await.unwrap();

    let starts = log
        .events()
        .iter()
        .filter(|e| matches!(e, TestEvent::StartedTest { .. }))
        .count();
    assert_eq!(starts, 1);
}

#[tokio::test]
async fn retries_reuse_hook_data_without_rerunning_hooks() {
    let hook_runs = Arc::new(AtomicU32::new(0));
    let (_, body) = flaky(2);

    let engine = Gauntlet::new();
    let counter = hook_runs.clone();
    engine
        .suite("stable-setup")
        .before_each(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok(json!({ "ready": true }))
            }
        })
        .test("settles", move |_all, each| {
            let body = body.clone();
            async move {
                expect(&each["ready"]).to_equal(true)?;
                body()
            }
        });

    let summary = engine.run(RunArgs::new().with_retries(5)).await.unwrap();

    assert!(summary.all_passed());
    // One member, one hook run; attempts share the captured data.
    assert_eq!(hook_runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_retries_means_one_attempt() {
    let (attempts, body) = flaky(1);
    let engine = Gauntlet::new();
    engine.suite("strict").test("fails fast", move |_, _| {
        let body = body.clone();
        async move { body() }
    });

    let summary = engine.run(RunArgs::new()).await.unwrap();

    assert_eq!((summary.failed, summary.passed), (1, 0));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
