//! Run configuration.

use std::fmt;
use std::time::Duration;

use crate::reporter::Reporter;

/// Default per-test timeout when none is configured.
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default retry budget: a test gets one attempt.
pub const DEFAULT_RETRIES: u32 = 0;

/// Configuration for a single run.
///
/// The engine is agnostic to where these values come from; a CLI or config
/// loader supplies them. Reporters receive every lifecycle event, in
/// registration order.
pub struct RunArgs {
    /// Event sinks for this run.
    pub reporters: Vec<Box<dyn Reporter>>,

    /// Maximum time a single test attempt may take before it is failed.
    pub test_timeout: Duration,

    /// Additional attempts granted to a failing test (`retries + 1` attempts
    /// total).
    pub retries: u32,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            reporters: Vec::new(),
            test_timeout: DEFAULT_TEST_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl RunArgs {
    /// Creates run arguments with default timeout and retries and no
    /// reporters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a reporter. May be called multiple times; events fan out in
    /// registration order.
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    /// Sets the per-test timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = timeout;
        self
    }

    /// Sets the retry budget.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

impl fmt::Debug for RunArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunArgs")
            .field("reporters", &self.reporters.len())
            .field("test_timeout", &self.test_timeout)
            .field("retries", &self.retries)
            .finish()
    }
}

/// Final counts for a completed run.
///
/// `run` resolves normally even when tests fail; the driver decides the
/// process outcome from these counts (or from `finished_all`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Tests that exhausted their attempts, plus hook failures surfaced at
    /// member boundaries.
    pub failed: u32,

    /// Tests that settled successfully within their timeout.
    pub passed: u32,

    /// Wall time for the whole traversal.
    pub duration: Duration,
}

impl RunSummary {
    /// Returns true if nothing failed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Total reported outcomes.
    pub fn total(&self) -> u32 {
        self.failed + self.passed
    }
}
