//! End-to-end demonstration of suite authoring and execution.
//!
//! Run with `cargo run --example demo`; set `RUST_LOG=gauntlet_core=debug`
//! for executor tracing. Exits non-zero if any test fails, which for this
//! tree is always: a few tests fail on purpose to show failure reporting.

use std::process::ExitCode;
use std::time::Duration;

use gauntlet_core::{ConsoleReporter, Gauntlet, RunArgs};
use gauntlet_expect::expect;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let engine = Gauntlet::new();

    engine
        .suite("arithmetic")
        .before_all(|| async { anyhow::Ok(json!({ "base": 10 })) })
        .test("adds", |all, _each| async move {
            let base = all["base"].as_i64().unwrap_or(0);
            expect(base + 5).to_be(15)?;
            Ok(())
        })
        .test_each("doubles", vec![1, 2, 3], |_, _, n: i64| async move {
            expect(n * 2).to_be_greater_than(n)?;
            Ok(())
        })
        .test("fails on purpose", |all, _each| async move {
            let base = all["base"].as_i64().unwrap_or(0);
            expect(base).to_be(11)?;
            Ok(())
        });

    engine
        .suite("sessions")
        .before_each(|| async { anyhow::Ok(json!({ "user": "alice", "logged_in": true })) })
        .test("starts logged in", |_all, each| async move {
            expect(&each["logged_in"]).to_equal(true)?;
            Ok(())
        })
        .subsuite("logout", |sub| {
            sub.test("clears the user", |_all, mut each| async move {
                each.remove("user");
                expect(each.contains_key("user")).to_be(false)?;
                Ok(())
            });
        })
        .after_each(|_each| async { Ok(()) });

    engine
        .suite("hazards")
        .test("panics on purpose", |_, _| async {
            panic!("this panic is expected");
        })
        .test("times out on purpose", |_, _| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        });

    let summary = engine
        .run(
            RunArgs::new()
                .with_reporter(Box::new(ConsoleReporter::new()))
                .with_timeout(Duration::from_millis(500)),
        )
        .await?;

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
