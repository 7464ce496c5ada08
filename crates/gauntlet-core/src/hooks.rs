//! Hook composition.
//!
//! Each suite owns four hook slots: `before_all`/`after_all` operate on
//! accumulated before-all data, `before_each`/`after_each` on accumulated
//! before-each data. Registering the same kind of hook twice composes with the
//! previous registration rather than replacing it: before-hooks run in order
//! and shallow-merge their results (later keys win), after-hooks run in order
//! and discard their results.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

/// Accumulated hook data, a flat record of JSON values.
///
/// Shallow merge over these maps is how data from chained hooks and from
/// ancestor suites flows into tests.
pub type Data = serde_json::Map<String, Value>;

/// A composed before-hook: produces this suite's data contribution.
pub(crate) type BeforeFn =
    Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Data>> + Send + Sync>;

/// A composed after-hook: consumes the data its before-counterpart produced.
pub(crate) type AfterFn =
    Arc<dyn Fn(Data) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A registered test body.
pub(crate) type TestFn =
    Arc<dyn Fn(Data, Data) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// The four hook slots of a suite. Cloning shares the composed functions.
#[derive(Clone)]
pub(crate) struct Hooks {
    pub before_all: BeforeFn,
    pub after_all: AfterFn,
    pub before_each: BeforeFn,
    pub after_each: AfterFn,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            before_all: identity_before(),
            after_all: identity_after(),
            before_each: identity_before(),
            after_each: identity_after(),
        }
    }
}

/// The identity before-hook: contributes an empty record.
fn identity_before() -> BeforeFn {
    Arc::new(|| async { Ok(Data::new()) }.boxed())
}

/// The identity after-hook.
fn identity_after() -> AfterFn {
    Arc::new(|_data| async { Ok(()) }.boxed())
}

/// Shallow-merges `layer` on top of `base`; keys in `layer` win.
pub(crate) fn merge(mut base: Data, layer: Data) -> Data {
    for (key, value) in layer {
        base.insert(key, value);
    }
    base
}

/// Coerces a hook's serialized return value into a data record.
///
/// Hooks returning `()` or any non-object value contribute nothing.
pub(crate) fn coerce(value: Value) -> Data {
    match value {
        Value::Object(map) => map,
        _ => Data::new(),
    }
}

/// Chains two before-hooks: `prev` runs first, `next` layers on top.
pub(crate) fn compose_before(prev: BeforeFn, next: BeforeFn) -> BeforeFn {
    Arc::new(move || {
        let prev = prev.clone();
        let next = next.clone();
        async move {
            let base = prev().await?;
            let layer = next().await?;
            Ok(merge(base, layer))
        }
        .boxed()
    })
}

/// Chains two after-hooks: `prev` runs strictly before `next`, both see the
/// same data, an error in `prev` short-circuits `next`.
pub(crate) fn compose_after(prev: AfterFn, next: AfterFn) -> AfterFn {
    Arc::new(move |data: Data| {
        let prev = prev.clone();
        let next = next.clone();
        async move {
            prev(data.clone()).await?;
            next(data).await?;
            Ok(())
        }
        .boxed()
    })
}
