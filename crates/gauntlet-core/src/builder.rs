//! The staged suite builder.
//!
//! A [`SuiteBuilder`] is a fluent view over one shared suite node. The stage
//! type parameter enforces declaration order at compile time: before-hooks,
//! then tests and subsuites, then after-hooks. All stages share the same
//! underlying suite; advancing a stage changes only what the next call in the
//! chain may be.
//!
//! ```
//! use gauntlet_core::Gauntlet;
//! use serde_json::json;
//!
//! let engine = Gauntlet::new();
//! engine
//!     .suite("math")
//!     .before_all(|| async { anyhow::Ok(json!({ "base": 2 })) })
//!     .test("squares", |all, _each| async move {
//!         anyhow::ensure!(all["base"] == json!(2), "unexpected base");
//!         Ok(())
//!     })
//!     .after_all(|_all| async { Ok(()) });
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;

use crate::hooks::{AfterFn, BeforeFn, Data, TestFn, coerce, compose_after, compose_before};
use crate::suite::{Suite, SuiteHandle, SuiteMember, TestCase, lock};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::BeforeAllStage {}
    impl Sealed for super::BeforeEachStage {}
    impl Sealed for super::TestStage {}
    impl Sealed for super::AfterEachStage {}
    impl Sealed for super::AfterAllStage {}
}

/// Marker for a builder stage. Sealed; the five stages below are the only
/// implementors.
pub trait Stage: sealed::Sealed {}

/// Initial stage: any declaration is legal.
pub enum BeforeAllStage {}
/// At least one `before_each` has been declared; `before_all` is closed.
pub enum BeforeEachStage {}
/// Tests or subsuites have been declared; before-hooks are closed.
pub enum TestStage {}
/// `after_each` has been declared; only after-hooks remain.
pub enum AfterEachStage {}
/// Terminal stage: only further `after_all` declarations are legal.
pub enum AfterAllStage {}

impl Stage for BeforeAllStage {}
impl Stage for BeforeEachStage {}
impl Stage for TestStage {}
impl Stage for AfterEachStage {}
impl Stage for AfterAllStage {}

/// Stages on which `before_all` may still be declared.
pub trait AcceptsBeforeAll: Stage {}
impl AcceptsBeforeAll for BeforeAllStage {}

/// Stages on which `before_each` may still be declared.
pub trait AcceptsBeforeEach: Stage {}
impl AcceptsBeforeEach for BeforeAllStage {}
impl AcceptsBeforeEach for BeforeEachStage {}

/// Stages on which tests and subsuites may still be declared.
pub trait AcceptsTests: Stage {}
impl AcceptsTests for BeforeAllStage {}
impl AcceptsTests for BeforeEachStage {}
impl AcceptsTests for TestStage {}

/// Stages on which `after_each` may still be declared.
pub trait AcceptsAfterEach: Stage {}
impl AcceptsAfterEach for BeforeAllStage {}
impl AcceptsAfterEach for BeforeEachStage {}
impl AcceptsAfterEach for TestStage {}
impl AcceptsAfterEach for AfterEachStage {}

/// Stages on which `after_all` may still be declared.
pub trait AcceptsAfterAll: Stage {}
impl AcceptsAfterAll for BeforeAllStage {}
impl AcceptsAfterAll for BeforeEachStage {}
impl AcceptsAfterAll for TestStage {}
impl AcceptsAfterAll for AfterEachStage {}
impl AcceptsAfterAll for AfterAllStage {}

/// Fluent, stage-typed view over a single suite node.
pub struct SuiteBuilder<S: Stage = BeforeAllStage> {
    suite: SuiteHandle,
    _stage: PhantomData<S>,
}

impl SuiteBuilder<BeforeAllStage> {
    pub(crate) fn for_suite(suite: SuiteHandle) -> Self {
        SuiteBuilder {
            suite,
            _stage: PhantomData,
        }
    }
}

impl<S: Stage> SuiteBuilder<S> {
    fn advance<N: Stage>(self) -> SuiteBuilder<N> {
        SuiteBuilder {
            suite: self.suite,
            _stage: PhantomData,
        }
    }

    /// Declares a `before_all` hook. Composes with previously declared
    /// `before_all` hooks on this suite; results shallow-merge, later keys
    /// win.
    pub fn before_all<F, Fut, T>(self, hook: F) -> SuiteBuilder<BeforeAllStage>
    where
        S: AcceptsBeforeAll,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize,
    {
        let wrapped = wrap_before(hook);
        {
            let mut suite = lock(&self.suite);
            suite.hooks.before_all = compose_before(suite.hooks.before_all.clone(), wrapped);
        }
        self.advance()
    }

    /// Declares a `before_each` hook, run once per member of this suite.
    /// Composes like [`before_all`](Self::before_all).
    pub fn before_each<F, Fut, T>(self, hook: F) -> SuiteBuilder<BeforeEachStage>
    where
        S: AcceptsBeforeEach,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize,
    {
        let wrapped = wrap_before(hook);
        {
            let mut suite = lock(&self.suite);
            suite.hooks.before_each = compose_before(suite.hooks.before_each.clone(), wrapped);
        }
        self.advance()
    }

    /// Appends a test. The body receives the accumulated before-all and
    /// before-each data and fails by returning an error (or panicking).
    pub fn test<F, Fut>(self, name: impl Into<String>, test: F) -> SuiteBuilder<TestStage>
    where
        S: AcceptsTests,
        F: Fn(Data, Data) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let case = TestCase {
            name: name.into(),
            run: wrap_test(test),
        };
        lock(&self.suite).members.push(SuiteMember::Test(case));
        self.advance()
    }

    /// Appends one test per case, named `"<name> - <case as JSON>"`.
    ///
    /// The cases live in a child suite that snapshots this suite's hooks at
    /// declaration time, so each case gets its own before-each/after-each
    /// iteration. Hooks declared on this suite afterwards are not inherited.
    ///
    /// # Panics
    ///
    /// Panics at declaration time if `cases` is empty.
    pub fn test_each<C, F, Fut>(
        self,
        name: impl Into<String>,
        cases: Vec<C>,
        test: F,
    ) -> SuiteBuilder<TestStage>
    where
        S: AcceptsTests,
        C: Serialize + Clone + Send + Sync + 'static,
        F: Fn(Data, Data, C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        assert!(
            !cases.is_empty(),
            "test_each requires a non-empty list of test cases"
        );
        let name = name.into();
        let names = cases
            .iter()
            .map(|case| format!("{name} - {}", case_json(case)))
            .collect();
        self.test_group(name, names, cases, test)
    }

    /// Like [`test_each`](Self::test_each), but derives each test's name
    /// from its case. The child suite takes the first case's name.
    ///
    /// # Panics
    ///
    /// Panics at declaration time if `cases` is empty.
    pub fn test_each_named<C, F, Fut, N>(
        self,
        name: N,
        cases: Vec<C>,
        test: F,
    ) -> SuiteBuilder<TestStage>
    where
        S: AcceptsTests,
        C: Serialize + Clone + Send + Sync + 'static,
        N: Fn(&C) -> String,
        F: Fn(Data, Data, C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        assert!(
            !cases.is_empty(),
            "test_each requires a non-empty list of test cases"
        );
        let names: Vec<String> = cases.iter().map(|case| name(case)).collect();
        let group = names[0].clone();
        self.test_group(group, names, cases, test)
    }

    fn test_group<C, F, Fut>(
        self,
        group: String,
        names: Vec<String>,
        cases: Vec<C>,
        test: F,
    ) -> SuiteBuilder<TestStage>
    where
        S: AcceptsTests,
        C: Clone + Send + Sync + 'static,
        F: Fn(Data, Data, C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let child = Suite::named(group);
        // Snapshot: the group inherits this suite's composed hooks as they
        // are right now, by reference-copy.
        lock(&child).hooks = lock(&self.suite).hooks.clone();

        let test = Arc::new(test);
        for (case, case_name) in cases.into_iter().zip(names) {
            let test = test.clone();
            let run: TestFn = Arc::new(move |all, each| {
                let test = test.clone();
                let case = case.clone();
                async move { test(all, each, case).await }.boxed()
            });
            lock(&child).members.push(SuiteMember::Test(TestCase {
                name: case_name,
                run,
            }));
        }

        lock(&self.suite).members.push(SuiteMember::Subsuite {
            suite: child,
            deferred: None,
        });
        self.advance()
    }

    /// Declares a nested suite and registers its contents immediately.
    ///
    /// The callback receives a fresh builder scoped to the subsuite. It runs
    /// at declaration time and therefore cannot observe runtime hook data;
    /// use [`subsuite_with_context`](Self::subsuite_with_context) for that.
    pub fn subsuite<F>(self, name: impl Into<String>, register: F) -> SuiteBuilder<TestStage>
    where
        S: AcceptsTests,
        F: FnOnce(SuiteBuilder<BeforeAllStage>),
    {
        let child = Suite::named(name);
        lock(&self.suite).members.push(SuiteMember::Subsuite {
            suite: child.clone(),
            deferred: None,
        });
        register(SuiteBuilder::for_suite(child));
        self.advance()
    }

    /// Declares a nested suite whose registration is deferred to execution
    /// time.
    ///
    /// The executor invokes the callback just before recursing into the
    /// subsuite, passing the before-all and before-each data accumulated from
    /// ancestor suites, so hook and test registration can depend on runtime
    /// values.
    pub fn subsuite_with_context<F>(
        self,
        name: impl Into<String>,
        register: F,
    ) -> SuiteBuilder<TestStage>
    where
        S: AcceptsTests,
        F: Fn(SuiteBuilder<BeforeAllStage>, &Data, &Data) + Send + Sync + 'static,
    {
        let child = Suite::named(name);
        lock(&self.suite).members.push(SuiteMember::Subsuite {
            suite: child,
            deferred: Some(Arc::new(register)),
        });
        self.advance()
    }

    /// Declares an `after_each` hook, run once per member regardless of the
    /// member's outcome. Successive declarations run in declaration order.
    pub fn after_each<F, Fut>(self, hook: F) -> SuiteBuilder<AfterEachStage>
    where
        S: AcceptsAfterEach,
        F: Fn(Data) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let wrapped = wrap_after(hook);
        {
            let mut suite = lock(&self.suite);
            suite.hooks.after_each = compose_after(suite.hooks.after_each.clone(), wrapped);
        }
        self.advance()
    }

    /// Declares an `after_all` hook, run once after every member of this
    /// suite. Receives the suite's own before-all data contribution.
    /// Successive declarations run in declaration order.
    pub fn after_all<F, Fut>(self, hook: F) -> SuiteBuilder<AfterAllStage>
    where
        S: AcceptsAfterAll,
        F: Fn(Data) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let wrapped = wrap_after(hook);
        {
            let mut suite = lock(&self.suite);
            suite.hooks.after_all = compose_after(suite.hooks.after_all.clone(), wrapped);
        }
        self.advance()
    }
}

fn wrap_before<F, Fut, T>(hook: F) -> BeforeFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Serialize,
{
    let hook = Arc::new(hook);
    Arc::new(move || {
        let hook = hook.clone();
        async move {
            let value = hook().await?;
            Ok(coerce(serde_json::to_value(value)?))
        }
        .boxed()
    })
}

fn wrap_after<F, Fut>(hook: F) -> AfterFn
where
    F: Fn(Data) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let hook = Arc::new(hook);
    Arc::new(move |data| {
        let hook = hook.clone();
        async move { hook(data).await }.boxed()
    })
}

fn wrap_test<F, Fut>(test: F) -> TestFn
where
    F: Fn(Data, Data) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let test = Arc::new(test);
    Arc::new(move |all, each| {
        let test = test.clone();
        async move { test(all, each).await }.boxed()
    })
}

fn case_json<C: Serialize>(case: &C) -> String {
    serde_json::to_string(case).unwrap_or_else(|_| "<unserializable case>".to_string())
}
