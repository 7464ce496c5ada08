//! Test doubles for the reporter seam.
//!
//! [`RecordingReporter`] captures the full event stream into a shared log so
//! tests can assert on ordering, depths, and counts. Used by this crate's own
//! test suites and available to downstream users testing reporter-driven
//! tooling.

use std::sync::{Arc, Mutex};

use crate::reporter::Reporter;

/// One recorded lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestEvent {
    StartedAll,
    FinishedAll {
        failed: u32,
        passed: u32,
    },
    StartedSuite {
        name: String,
        depth: i32,
    },
    FinishedSuite {
        name: String,
        depth: i32,
        failed: u32,
        passed: u32,
    },
    StartedTest {
        name: String,
        depth: i32,
    },
    PassedTest {
        depth: i32,
    },
    FailedTest {
        message: String,
        depth: i32,
    },
}

/// Shared, cloneable view of a recorded event stream.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<TestEvent>>>,
}

impl EventLog {
    fn push(&self, event: TestEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// All events recorded so far, in emission order.
    pub fn events(&self) -> Vec<TestEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of `PassedTest` events.
    pub fn passed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TestEvent::PassedTest { .. }))
            .count()
    }

    /// Number of `FailedTest` events.
    pub fn failed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, TestEvent::FailedTest { .. }))
            .count()
    }

    /// Names from `StartedTest` events, in order.
    pub fn started_tests(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                TestEvent::StartedTest { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Messages from `FailedTest` events, in order.
    pub fn failure_messages(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                TestEvent::FailedTest { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// The `(failed, passed)` counts from `FinishedAll`, if the run finished.
    pub fn finished_all(&self) -> Option<(u32, u32)> {
        self.events().iter().find_map(|e| match e {
            TestEvent::FinishedAll { failed, passed } => Some((*failed, *passed)),
            _ => None,
        })
    }
}

/// Reporter that records every event into an [`EventLog`].
#[derive(Debug, Default)]
pub struct RecordingReporter {
    log: EventLog,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to the shared log; keep it before moving the reporter into
    /// [`RunArgs`](crate::RunArgs).
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }
}

impl Reporter for RecordingReporter {
    fn started_all(&mut self) {
        self.log.push(TestEvent::StartedAll);
    }

    fn finished_all(&mut self, failed: u32, passed: u32) {
        self.log.push(TestEvent::FinishedAll { failed, passed });
    }

    fn started_suite(&mut self, name: &str, depth: i32) {
        self.log.push(TestEvent::StartedSuite {
            name: name.to_string(),
            depth,
        });
    }

    fn finished_suite(&mut self, name: &str, depth: i32, failed: u32, passed: u32) {
        self.log.push(TestEvent::FinishedSuite {
            name: name.to_string(),
            depth,
            failed,
            passed,
        });
    }

    fn started_test(&mut self, name: &str, depth: i32) {
        self.log.push(TestEvent::StartedTest {
            name: name.to_string(),
            depth,
        });
    }

    fn passed_test(&mut self, _elapsed_ms: u64, depth: i32) {
        self.log.push(TestEvent::PassedTest { depth });
    }

    fn failed_test(&mut self, error: &anyhow::Error, depth: i32) {
        self.log.push(TestEvent::FailedTest {
            message: format!("{error:#}"),
            depth,
        });
    }
}
