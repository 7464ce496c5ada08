//! Depth-first traversal, event depths, and deferred subsuite registration.

use gauntlet_core::testing::{RecordingReporter, TestEvent};
use gauntlet_core::{Gauntlet, RunArgs};
use gauntlet_expect::expect;
use serde_json::json;

fn recording() -> (RunArgs, gauntlet_core::testing::EventLog) {
    let reporter = RecordingReporter::new();
    let log = reporter.log();
    (RunArgs::new().with_reporter(Box::new(reporter)), log)
}

#[tokio::test]
async fn traversal_is_depth_first_in_declaration_order() {
    let engine = Gauntlet::new();
    engine
        .suite("outer")
        .test("first", |_, _| async { Ok(()) })
        .subsuite("middle", |sub| {
            sub.test("nested", |_, _| async { Ok(()) });
        })
        .test("last", |_, _| async { Ok(()) });

    let (args, log) = recording();
    engine.run(args).await.unwrap();

    let events = log.events();
    assert_eq!(
        events,
        vec![
            TestEvent::StartedAll,
            TestEvent::StartedSuite {
                name: "outer".into(),
                depth: 0,
            },
            TestEvent::StartedTest {
                name: "first".into(),
                depth: 1,
            },
            TestEvent::PassedTest { depth: 2 },
            TestEvent::StartedSuite {
                name: "middle".into(),
                depth: 1,
            },
            TestEvent::StartedTest {
                name: "nested".into(),
                depth: 2,
            },
            TestEvent::PassedTest { depth: 3 },
            TestEvent::FinishedSuite {
                name: "middle".into(),
                depth: 1,
                failed: 0,
                passed: 1,
            },
            TestEvent::StartedTest {
                name: "last".into(),
                depth: 1,
            },
            TestEvent::PassedTest { depth: 2 },
            TestEvent::FinishedSuite {
                name: "outer".into(),
                depth: 0,
                failed: 0,
                passed: 2,
            },
            TestEvent::FinishedAll {
                failed: 0,
                passed: 3,
            },
        ]
    );
}

#[tokio::test]
async fn root_suite_emits_no_suite_events() {
    let engine = Gauntlet::new();
    engine.root().test("bare", |_, _| async { Ok(()) });

    let (args, log) = recording();
    engine.run(args).await.unwrap();

    let events = log.events();
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, TestEvent::StartedSuite { .. })),
        "root must stay invisible: {events:?}"
    );
    assert_eq!(log.finished_all(), Some((0, 1)));
}

#[tokio::test]
async fn deferred_subsuites_register_with_runtime_data() {
    let engine = Gauntlet::new();
    engine
        .suite("dynamic")
        .before_all(|| async { anyhow::Ok(json!({ "replicas": 2 })) })
        .before_each(|| async { anyhow::Ok(json!({ "request_id": 7 })) })
        .subsuite_with_context("derived", |sub, all, each| {
            let replicas = all["replicas"].as_u64().unwrap_or(0);
            let request_id = each["request_id"].clone();
            sub.test(format!("spawns {replicas} replicas"), move |_, _| {
                let request_id = request_id.clone();
                async move {
                    expect(&request_id).to_equal(7)?;
                    Ok(())
                }
            });
        });

    let (args, log) = recording();
    let summary = engine.run(args).await.unwrap();

    assert!(summary.all_passed(), "failures: {:?}", log.failure_messages());
    assert_eq!(log.started_tests(), vec!["spawns 2 replicas"]);
}

#[tokio::test]
async fn sibling_suites_are_isolated_from_each_other() {
    let engine = Gauntlet::new();
    engine
        .suite("first")
        .test("fails", |_, _| async { Err(anyhow::anyhow!("broken")) });
    engine.suite("second").test("passes", |_, _| async { Ok(()) });
    engine.suite("third").test("also passes", |_, _| async { Ok(()) });

    let (args, log) = recording();
    let summary = engine.run(args).await.unwrap();

    assert_eq!((summary.failed, summary.passed), (1, 2));
    assert_eq!(
        log.started_tests(),
        vec!["fails", "passes", "also passes"]
    );
}

#[tokio::test]
async fn suite_counters_cover_only_direct_tests() {
    let engine = Gauntlet::new();
    engine.suite("parent").subsuite("child", |sub| {
        sub.test("one", |_, _| async { Ok(()) })
            .test("two", |_, _| async { Err(anyhow::anyhow!("nope")) });
    });

    let (args, log) = recording();
    engine.run(args).await.unwrap();

    let finishes: Vec<_> = log
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TestEvent::FinishedSuite {
                name,
                failed,
                passed,
                ..
            } => Some((name, failed, passed)),
            _ => None,
        })
        .collect();
    assert_eq!(
        finishes,
        vec![
            ("child".to_string(), 1, 1),
            ("parent".to_string(), 0, 0),
        ]
    );
    // The run total still aggregates everything at the root.
    assert_eq!(log.finished_all(), Some((1, 1)));
}
