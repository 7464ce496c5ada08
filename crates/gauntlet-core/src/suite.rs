//! The suite tree.
//!
//! A [`Suite`] is one node in the hierarchy: a name, hook slots, pass/fail
//! counters, and an ordered list of members. Declaration order is execution
//! order. The tree is built by [`SuiteBuilder`](crate::SuiteBuilder) and
//! walked by the executor; it lives for one run and is rebuilt per engine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::builder::{BeforeAllStage, SuiteBuilder};
use crate::hooks::{Data, Hooks, TestFn};

/// Shared handle to a suite node.
///
/// Builders and the executor share nodes through this handle; execution is
/// strictly sequential, the lock only bridges the `Send` requirement of the
/// executor's futures and is never held across an await.
pub(crate) type SuiteHandle = Arc<Mutex<Suite>>;

/// Deferred registration callback for a context-aware subsuite.
///
/// Invoked by the executor just before recursing into the subsuite, with a
/// fresh builder and the ancestor-accumulated before-all/before-each data.
pub(crate) type DeferredRegistration =
    Arc<dyn Fn(SuiteBuilder<BeforeAllStage>, &Data, &Data) + Send + Sync>;

/// One node in the suite hierarchy.
pub(crate) struct Suite {
    /// Display name; not required to be unique.
    pub name: String,

    /// Tests and nested suites, in declaration order.
    pub members: Vec<SuiteMember>,

    /// Composed hook slots.
    pub hooks: Hooks,

    /// Tests failed under this suite; bumped only by the executor.
    pub failed: u32,

    /// Tests passed under this suite; bumped only by the executor.
    pub passed: u32,
}

impl Suite {
    /// Creates a fresh suite with identity hooks and zero counters.
    pub fn named(name: impl Into<String>) -> SuiteHandle {
        Arc::new(Mutex::new(Suite {
            name: name.into(),
            members: Vec::new(),
            hooks: Hooks::default(),
            failed: 0,
            passed: 0,
        }))
    }
}

/// A member of a suite: a test leaf or a nested suite.
#[derive(Clone)]
pub(crate) enum SuiteMember {
    /// A leaf test.
    Test(TestCase),

    /// A nested suite, optionally carrying a deferred registration callback.
    Subsuite {
        suite: SuiteHandle,
        deferred: Option<DeferredRegistration>,
    },
}

/// A registered test: name plus type-erased body.
#[derive(Clone)]
pub(crate) struct TestCase {
    pub name: String,
    pub run: TestFn,
}

/// Locks a suite node, recovering from poisoning.
pub(crate) fn lock(suite: &SuiteHandle) -> MutexGuard<'_, Suite> {
    suite.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bumps the passed counter on `suite` and on the root (once if they are the
/// same node).
pub(crate) fn bump_passed(suite: &SuiteHandle, root: &SuiteHandle) {
    lock(suite).passed += 1;
    if !Arc::ptr_eq(suite, root) {
        lock(root).passed += 1;
    }
}

/// Bumps the failed counter on `suite` and on the root (once if they are the
/// same node).
pub(crate) fn bump_failed(suite: &SuiteHandle, root: &SuiteHandle) {
    lock(suite).failed += 1;
    if !Arc::ptr_eq(suite, root) {
        lock(root).failed += 1;
    }
}
