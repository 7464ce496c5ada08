//! The engine and executor.
//!
//! [`Gauntlet`] owns one suite tree and walks it depth-first on
//! [`run`](Gauntlet::run): pre-order for `before_all`/suite entry, post-order
//! for `after_all`/suite exit, members in declaration order. Execution is
//! strictly sequential; the only suspension points are hook evaluation, test
//! bodies, and the per-test timeout race. Failures are contained at the
//! member boundary and never abort the traversal.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, trace};

use crate::builder::{BeforeAllStage, SuiteBuilder};
use crate::config::{RunArgs, RunSummary};
use crate::error::EngineError;
use crate::hooks::{Data, merge};
use crate::reporter::Reporter;
use crate::suite::{Suite, SuiteHandle, SuiteMember, TestCase, bump_failed, bump_passed, lock};

/// A test engine: one suite tree plus the run state guard.
///
/// Construct one engine per run, register suites through
/// [`suite`](Gauntlet::suite) or [`root`](Gauntlet::root), then
/// [`run`](Gauntlet::run). Counters live in the tree and are reset only by
/// building a fresh engine; independent engines share nothing.
pub struct Gauntlet {
    root: SuiteHandle,
    running: Arc<AtomicBool>,
}

impl Default for Gauntlet {
    fn default() -> Self {
        Self::new()
    }
}

impl Gauntlet {
    /// Creates an engine with an empty implicit root suite.
    pub fn new() -> Self {
        Self {
            root: Suite::named("root"),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Declares a new top-level suite and returns a builder for it.
    pub fn suite(&self, name: impl Into<String>) -> SuiteBuilder<BeforeAllStage> {
        let child = Suite::named(name);
        lock(&self.root).members.push(SuiteMember::Subsuite {
            suite: child.clone(),
            deferred: None,
        });
        SuiteBuilder::for_suite(child)
    }

    /// Returns a builder for the implicit root suite, for registering
    /// top-level tests and hooks directly.
    pub fn root(&self) -> SuiteBuilder<BeforeAllStage> {
        SuiteBuilder::for_suite(self.root.clone())
    }

    /// Executes the whole tree.
    ///
    /// Resolves after every member has been visited and all reporters have
    /// received `finished_all`. Test and hook failures are communicated
    /// exclusively through reporter events and the returned counts; the only
    /// error here is invoking `run` concurrently on one engine.
    pub async fn run(&self, args: RunArgs) -> Result<RunSummary, EngineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(EngineError::RunInProgress);
        }
        let running = self.running.clone();
        let _reset = scopeguard::guard((), move |()| {
            running.store(false, Ordering::SeqCst);
        });

        let start = Instant::now();
        let mut executor = Executor {
            reporters: args.reporters,
            timeout: args.test_timeout,
            retries: args.retries,
            root: self.root.clone(),
        };

        executor.each(|r| r.started_all());
        if let Err(error) = executor
            .execute_suite(self.root.clone(), -1, Data::new(), Data::new())
            .await
        {
            // A failing hook on the root itself has no member boundary above
            // it; account for it here.
            executor.report_member_failure(&self.root, -1, &error);
        }

        let (failed, passed) = {
            let root = lock(&self.root);
            (root.failed, root.passed)
        };
        executor.each(|r| r.finished_all(failed, passed));
        debug!(failed, passed, "run finished");

        Ok(RunSummary {
            failed,
            passed,
            duration: start.elapsed(),
        })
    }
}

struct Executor {
    reporters: Vec<Box<dyn Reporter>>,
    timeout: Duration,
    retries: u32,
    root: SuiteHandle,
}

impl Executor {
    fn each(&mut self, mut f: impl FnMut(&mut dyn Reporter)) {
        for reporter in &mut self.reporters {
            f(reporter.as_mut());
        }
    }

    /// Counts and reports a failure surfaced at the member boundary of
    /// `suite` (hook errors, subsuite-level errors).
    fn report_member_failure(&mut self, suite: &SuiteHandle, depth: i32, error: &anyhow::Error) {
        debug!(depth, error = %error, "member failed");
        bump_failed(suite, &self.root);
        self.each(|r| r.failed_test(error, depth + 1));
    }

    fn execute_suite(
        &mut self,
        suite: SuiteHandle,
        depth: i32,
        parent_all: Data,
        parent_each: Data,
    ) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            let (name, hooks, members) = {
                let guard = lock(&suite);
                (guard.name.clone(), guard.hooks.clone(), guard.members.clone())
            };
            trace!(suite = %name, depth, members = members.len(), "entering suite");

            if depth >= 0 {
                self.each(|r| r.started_suite(&name, depth));
            }

            let own_all = contained((hooks.before_all)())
                .await
                .with_context(|| format!("before-all hook failed in suite '{name}'"))?;
            let all = merge(parent_all, own_all.clone());

            for member in members {
                let each = match contained((hooks.before_each)())
                    .await
                    .with_context(|| format!("before-each hook failed in suite '{name}'"))
                {
                    Ok(own_each) => merge(parent_each.clone(), own_each),
                    Err(error) => {
                        // No iteration data was produced; skip the member and
                        // its after-each.
                        self.report_member_failure(&suite, depth, &error);
                        continue;
                    }
                };

                match member {
                    SuiteMember::Test(test) => {
                        self.execute_test(&test, &suite, depth + 1, &all, &each)
                            .await;
                    }
                    SuiteMember::Subsuite {
                        suite: child,
                        deferred,
                    } => {
                        if let Some(register) = deferred {
                            register(SuiteBuilder::for_suite(child.clone()), &all, &each);
                        }
                        if let Err(error) = self
                            .execute_suite(child, depth + 1, all.clone(), each.clone())
                            .await
                        {
                            self.report_member_failure(&suite, depth, &error);
                        }
                    }
                }

                if let Err(error) = contained((hooks.after_each)(each))
                    .await
                    .with_context(|| format!("after-each hook failed in suite '{name}'"))
                {
                    self.report_member_failure(&suite, depth, &error);
                }
            }

            contained((hooks.after_all)(own_all))
                .await
                .with_context(|| format!("after-all hook failed in suite '{name}'"))?;

            if depth >= 0 {
                let (failed, passed) = {
                    let guard = lock(&suite);
                    (guard.failed, guard.passed)
                };
                self.each(|r| r.finished_suite(&name, depth, failed, passed));
            }
            trace!(suite = %name, depth, "leaving suite");
            Ok(())
        }
        .boxed()
    }

    /// Runs one test with the timeout race and retry loop.
    ///
    /// `started_test` is emitted exactly once, before the attempt loop; hook
    /// data is captured once and reused across attempts; only the final
    /// exhausted attempt is counted and reported.
    async fn execute_test(
        &mut self,
        test: &TestCase,
        suite: &SuiteHandle,
        depth: i32,
        all: &Data,
        each: &Data,
    ) {
        self.each(|r| r.started_test(&test.name, depth));
        let max_attempts = self.retries + 1;

        for attempt in 1..=max_attempts {
            let start = Instant::now();
            let body = (test.run)(all.clone(), each.clone());
            let outcome = tokio::time::timeout(
                self.timeout,
                AssertUnwindSafe(body).catch_unwind(),
            )
            .await;

            let result = match outcome {
                Err(_elapsed) => Err(anyhow!(
                    "test '{}' timed out after {}ms",
                    test.name,
                    self.timeout.as_millis()
                )),
                Ok(Err(panic)) => Err(anyhow!(
                    "test '{}' panicked: {}",
                    test.name,
                    panic_message(panic.as_ref())
                )),
                Ok(Ok(result)) => result,
            };

            match result {
                Ok(()) => {
                    let elapsed = start.elapsed().as_millis() as u64;
                    trace!(test = %test.name, attempt, elapsed, "test passed");
                    bump_passed(suite, &self.root);
                    self.each(|r| r.passed_test(elapsed, depth + 1));
                    return;
                }
                Err(error) if attempt == max_attempts => {
                    debug!(test = %test.name, attempt, error = %error, "test failed");
                    bump_failed(suite, &self.root);
                    self.each(|r| r.failed_test(&error, depth + 1));
                    return;
                }
                Err(error) => {
                    debug!(test = %test.name, attempt, error = %error, "attempt failed, retrying");
                }
            }
        }
    }
}

/// Awaits a hook future with a panic unwound into an `Err`, so a panicking
/// hook takes the same member-boundary path as one returning an error.
async fn contained<T>(
    future: impl std::future::Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(anyhow!("panicked: {}", panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
