//! The per-test timeout race and panic containment.

use std::time::Duration;

use gauntlet_core::testing::RecordingReporter;
use gauntlet_core::{Gauntlet, RunArgs};
use gauntlet_expect::expect;

fn recording() -> (RunArgs, gauntlet_core::testing::EventLog) {
    let reporter = RecordingReporter::new();
    let log = reporter.log();
    (RunArgs::new().with_reporter(Box::new(reporter)), log)
}

#[tokio::test]
async fn slow_test_fails_with_a_timeout_message() {
    let engine = Gauntlet::new();
    engine.suite("slow").test("hangs", |_, _| async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(())
    });

    let (args, log) = recording();
    let summary = engine
        .run(args.with_timeout(Duration::from_millis(50)))
        .await
        .unwrap();

    assert_eq!((summary.failed, summary.passed), (1, 0));
    expect(log.failure_messages()[0].as_str())
        .to_contain("test 'hangs' timed out after 50ms")
        .unwrap();
}

#[tokio::test]
async fn fast_test_passes_within_the_timeout() {
    let engine = Gauntlet::new();
    engine.suite("fast").test("returns quickly", |_, _| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(())
    });

    let summary = engine
        .run(RunArgs::new().with_timeout(Duration::from_millis(500)))
        .await
        .unwrap();

    assert!(summary.all_passed());
}

#[tokio::test]
async fn timed_out_test_does_not_stall_its_siblings() {
    let engine = Gauntlet::new();
    engine
        .suite("mixed")
        .test("hangs", |_, _| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .test("still runs", |_, _| async { Ok(()) });

    let (args, log) = recording();
    let summary = engine
        .run(args.with_timeout(Duration::from_millis(50)))
        .await
        .unwrap();

    assert_eq!((summary.failed, summary.passed), (1, 1));
    assert_eq!(log.started_tests(), vec!["hangs", "still runs"]);
}

#[tokio::test]
async fn panicking_test_reports_the_panic_payload() {
    let engine = Gauntlet::new();
    engine.suite("explosive").test("detonates", |_, _| async {
        panic!("wires crossed");
    });

    let (args, log) = recording();
    let summary = engine.run(args).await.unwrap();

    assert_eq!((summary.failed, summary.passed), (1, 0));
    expect(log.failure_messages()[0].as_str())
        .to_contain("test 'detonates' panicked: wires crossed")
        .unwrap();
}

#[tokio::test]
async fn timeouts_respect_the_retry_budget() {
    let engine = Gauntlet::new();
    engine.suite("slow").test("always slow", |_, _| async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    });

    let (args, log) = recording();
    let summary = engine
        .run(args.with_timeout(Duration::from_millis(20)).with_retries(2))
        .await
        .unwrap();

    // Every attempt times out; only the final one is reported.
    assert_eq!((summary.failed, summary.passed), (1, 0));
    assert_eq!(log.failed_count(), 1);
}
