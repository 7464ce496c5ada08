//! Engine error types.
//!
//! Test and hook failures never surface here; they are counted and reported
//! through the [`Reporter`](crate::Reporter) stream. `EngineError` covers
//! only misuse of the engine itself.

use thiserror::Error;

/// Errors returned by [`Gauntlet::run`](crate::Gauntlet::run).
#[derive(Debug, Error)]
pub enum EngineError {
    /// `run` was invoked while a run was already in progress on the same
    /// engine.
    #[error("a test run is already in progress on this engine")]
    RunInProgress,
}
