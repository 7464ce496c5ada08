//! # gauntlet-core
//!
//! Suite tree, staged builder, and executor for the Gauntlet test framework.
//!
//! This crate provides:
//! - Hierarchical test suites with composed `before_all`/`before_each`/
//!   `after_each`/`after_all` hooks
//! - A stage-typed fluent builder that enforces declaration order at compile
//!   time
//! - An async executor with per-test timeout racing, bounded retries, and
//!   failure isolation at member boundaries
//! - A pluggable [`Reporter`] event stream and a colored console reporter
//!
//! File discovery, CLI parsing, and config loading are external concerns; the
//! engine consumes [`RunArgs`] and emits reporter events.
//!
//! # Example
//!
//! ```
//! use gauntlet_core::{ConsoleReporter, Gauntlet, RunArgs};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let engine = Gauntlet::new();
//! engine
//!     .suite("arithmetic")
//!     .before_all(|| async { anyhow::Ok(json!({ "two": 2 })) })
//!     .test("adds", |all, _each| async move {
//!         anyhow::ensure!(all["two"] == json!(2), "wrong constant");
//!         Ok(())
//!     });
//!
//! let summary = engine
//!     .run(RunArgs::new().with_reporter(Box::new(ConsoleReporter::new())))
//!     .await?;
//! assert!(summary.all_passed());
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod error;
mod hooks;
mod reporter;
mod runner;
mod suite;
pub mod testing;

pub use builder::{
    AcceptsAfterAll, AcceptsAfterEach, AcceptsBeforeAll, AcceptsBeforeEach, AcceptsTests,
    AfterAllStage, AfterEachStage, BeforeAllStage, BeforeEachStage, Stage, SuiteBuilder,
    TestStage,
};
pub use config::{DEFAULT_RETRIES, DEFAULT_TEST_TIMEOUT, RunArgs, RunSummary};
pub use error::EngineError;
pub use hooks::Data;
pub use reporter::{ConsoleReporter, Reporter};
pub use runner::Gauntlet;
