//! The `to_throw` family.
//!
//! The subject must be invocable; the matcher invokes it once, capturing both
//! error returns and panics as "thrown", and optionally matches the captured
//! error against an expectation.

use std::fmt;
use std::panic::AssertUnwindSafe;

use anyhow::anyhow;
use regex::Regex;

use crate::{ExpectResult, Expectation, check};

/// What a thrown error is expected to look like.
#[derive(Debug, Clone)]
pub enum ThrowExpectation {
    /// The error message contains this substring.
    Substring(String),
    /// The error message matches this pattern.
    Pattern(Regex),
    /// The error message equals this string exactly.
    Message(String),
}

impl ThrowExpectation {
    /// Expects the error message to equal `message` exactly.
    pub fn exact(message: impl Into<String>) -> Self {
        ThrowExpectation::Message(message.into())
    }

    fn matches(&self, message: &str) -> bool {
        match self {
            ThrowExpectation::Substring(fragment) => message.contains(fragment),
            ThrowExpectation::Pattern(pattern) => pattern.is_match(message),
            ThrowExpectation::Message(expected) => message == expected,
        }
    }
}

impl From<&str> for ThrowExpectation {
    fn from(fragment: &str) -> Self {
        ThrowExpectation::Substring(fragment.to_string())
    }
}

impl From<String> for ThrowExpectation {
    fn from(fragment: String) -> Self {
        ThrowExpectation::Substring(fragment)
    }
}

impl From<Regex> for ThrowExpectation {
    fn from(pattern: Regex) -> Self {
        ThrowExpectation::Pattern(pattern)
    }
}

impl fmt::Display for ThrowExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThrowExpectation::Substring(fragment) => write!(f, "containing {fragment:?}"),
            ThrowExpectation::Pattern(pattern) => write!(f, "matching /{pattern}/"),
            ThrowExpectation::Message(message) => write!(f, "with message {message:?}"),
        }
    }
}

/// Return values a `to_throw` subject may produce.
///
/// `Err` returns count as thrown; `Ok` and `()` do not. Panics are captured
/// separately by the matcher itself.
pub trait ThrownOutcome {
    fn thrown(self) -> Option<anyhow::Error>;
}

impl ThrownOutcome for () {
    fn thrown(self) -> Option<anyhow::Error> {
        None
    }
}

impl<T, E: Into<anyhow::Error>> ThrownOutcome for Result<T, E> {
    fn thrown(self) -> Option<anyhow::Error> {
        self.err().map(Into::into)
    }
}

impl<F, R> Expectation<F>
where
    F: FnOnce() -> R,
    R: ThrownOutcome,
{
    /// Expects the subject to throw: return an error or panic.
    pub fn to_throw(self) -> ExpectResult {
        let negated = self.negated;
        let thrown = invoke(self.actual);
        check(negated, thrown.is_some(), |not| {
            format!("Expected function {not}to throw an error")
        })
    }

    /// Expects the subject to throw an error matching `expected` (substring,
    /// pattern, or exact message).
    pub fn to_throw_matching(self, expected: impl Into<ThrowExpectation>) -> ExpectResult {
        let negated = self.negated;
        let expected = expected.into();
        let thrown = invoke(self.actual);
        let pass = thrown
            .as_ref()
            .is_some_and(|error| expected.matches(&error.to_string()));
        check(negated, pass, |not| {
            format!("Expected function {not}to throw an error {expected}")
        })
    }

    /// Expects the subject to throw an error of kind `E`.
    ///
    /// Works on error-returning subjects; panics carry only a message and
    /// never match a kind.
    pub fn to_throw_error<E>(self) -> ExpectResult
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        let negated = self.negated;
        let thrown = invoke(self.actual);
        let pass = thrown
            .as_ref()
            .is_some_and(|error| error.downcast_ref::<E>().is_some());
        check(negated, pass, |not| {
            format!(
                "Expected function {not}to throw an error of kind {}",
                std::any::type_name::<E>()
            )
        })
    }
}

fn invoke<F, R>(subject: F) -> Option<anyhow::Error>
where
    F: FnOnce() -> R,
    R: ThrownOutcome,
{
    match std::panic::catch_unwind(AssertUnwindSafe(subject)) {
        Ok(returned) => returned.thrown(),
        Err(panic) => Some(anyhow!("{}", panic_message(panic.as_ref()))),
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
