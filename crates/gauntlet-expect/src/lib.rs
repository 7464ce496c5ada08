//! # gauntlet-expect
//!
//! Assertion matchers for the Gauntlet test framework.
//!
//! [`expect`] wraps a value in an [`Expectation`]; every matcher returns
//! `Result<(), ExpectationError>` so a failed assertion propagates out of a
//! test body with `?` like any other error, carrying a human-readable
//! expected-vs-actual message. [`Expectation::not`] flips the polarity of
//! every matcher.
//!
//! ```
//! use gauntlet_expect::expect;
//!
//! fn checks() -> anyhow::Result<()> {
//!     expect(1 + 1).to_be(2)?;
//!     expect("hello world").to_contain("world")?;
//!     expect(Some(3)).to_be_defined()?;
//!     expect(4).not().to_be_greater_than(10)?;
//!     Ok(())
//! }
//! # checks().unwrap();
//! ```

use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

mod throw;
mod traits;

pub use throw::{ThrowExpectation, ThrownOutcome};
pub use traits::{Contains, HasLength, MaybeNan, Nullish, Truthy};

/// A failed assertion.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExpectationError {
    message: String,
}

impl ExpectationError {
    fn new(message: String) -> Self {
        Self { message }
    }

    /// The expected-vs-actual description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of a single matcher.
pub type ExpectResult = Result<(), ExpectationError>;

/// Wraps a value for assertion.
pub fn expect<T>(actual: T) -> Expectation<T> {
    Expectation {
        actual,
        negated: false,
    }
}

/// A value under assertion, with polarity.
pub struct Expectation<T> {
    pub(crate) actual: T,
    pub(crate) negated: bool,
}

/// Evaluates a matcher outcome against the polarity.
pub(crate) fn check(
    negated: bool,
    pass: bool,
    message: impl FnOnce(&str) -> String,
) -> ExpectResult {
    let failed = if negated { pass } else { !pass };
    if failed {
        Err(ExpectationError::new(message(if negated {
            "not "
        } else {
            ""
        })))
    } else {
        Ok(())
    }
}

impl<T> Expectation<T> {
    /// Flips the polarity: every matcher then asserts the opposite.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    fn verdict(&self, pass: bool, message: impl FnOnce(&str) -> String) -> ExpectResult {
        check(self.negated, pass, message)
    }

    /// Expects identity equality.
    pub fn to_be(&self, expected: T) -> ExpectResult
    where
        T: PartialEq + fmt::Debug,
    {
        let pass = self.actual == expected;
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to be {:?}", self.actual, expected)
        })
    }

    /// Expects structural equality through serialization, so values of
    /// different but compatible types compare.
    pub fn to_equal<U: Serialize>(&self, expected: U) -> ExpectResult
    where
        T: Serialize,
    {
        let actual = to_json(&self.actual)?;
        let expected = to_json(&expected)?;
        let pass = actual == expected;
        self.verdict(pass, |not| {
            format!("Expected {actual} {not}to equal {expected}")
        })
    }

    /// Expects a truthy value.
    pub fn to_be_truthy(&self) -> ExpectResult
    where
        T: Truthy + fmt::Debug,
    {
        let pass = self.actual.truthy();
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to be truthy", self.actual)
        })
    }

    /// Expects a falsy value.
    pub fn to_be_falsy(&self) -> ExpectResult
    where
        T: Truthy + fmt::Debug,
    {
        let pass = !self.actual.truthy();
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to be falsy", self.actual)
        })
    }

    /// Expects `None` or JSON null.
    pub fn to_be_nullish(&self) -> ExpectResult
    where
        T: Nullish + fmt::Debug,
    {
        let pass = self.actual.nullish();
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to be nullish", self.actual)
        })
    }

    /// Expects NaN.
    pub fn to_be_nan(&self) -> ExpectResult
    where
        T: MaybeNan + fmt::Debug,
    {
        let pass = self.actual.nan();
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to be NaN", self.actual)
        })
    }

    /// Expects the value to be of type `U`.
    pub fn to_be_instance_of<U: std::any::Any>(&self) -> ExpectResult
    where
        T: std::any::Any + fmt::Debug,
    {
        let actual: &dyn std::any::Any = &self.actual;
        let pass = actual.is::<U>();
        self.verdict(pass, |not| {
            format!(
                "Expected {:?} {not}to be an instance of {}",
                self.actual,
                std::any::type_name::<U>()
            )
        })
    }

    /// Expects `actual > expected`.
    pub fn to_be_greater_than(&self, expected: T) -> ExpectResult
    where
        T: PartialOrd + fmt::Debug,
    {
        let pass = self.actual > expected;
        self.verdict(pass, |not| {
            format!(
                "Expected {:?} {not}to be greater than {:?}",
                self.actual, expected
            )
        })
    }

    /// Expects `actual >= expected`.
    pub fn to_be_greater_than_or_equal(&self, expected: T) -> ExpectResult
    where
        T: PartialOrd + fmt::Debug,
    {
        let pass = self.actual >= expected;
        self.verdict(pass, |not| {
            format!(
                "Expected {:?} {not}to be greater than or equal to {:?}",
                self.actual, expected
            )
        })
    }

    /// Expects `actual < expected`.
    pub fn to_be_less_than(&self, expected: T) -> ExpectResult
    where
        T: PartialOrd + fmt::Debug,
    {
        let pass = self.actual < expected;
        self.verdict(pass, |not| {
            format!(
                "Expected {:?} {not}to be less than {:?}",
                self.actual, expected
            )
        })
    }

    /// Expects `actual <= expected`.
    pub fn to_be_less_than_or_equal(&self, expected: T) -> ExpectResult
    where
        T: PartialOrd + fmt::Debug,
    {
        let pass = self.actual <= expected;
        self.verdict(pass, |not| {
            format!(
                "Expected {:?} {not}to be less than or equal to {:?}",
                self.actual, expected
            )
        })
    }

    /// Expects containment: substring for strings, element equality for
    /// sequences.
    pub fn to_contain<I>(&self, item: I) -> ExpectResult
    where
        T: Contains<I> + fmt::Debug,
        I: fmt::Debug,
    {
        let pass = self.actual.contains_item(&item);
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to contain {:?}", self.actual, item)
        })
    }

    /// Expects an exact length.
    pub fn to_have_length(&self, length: usize) -> ExpectResult
    where
        T: HasLength + fmt::Debug,
    {
        let pass = self.actual.length() == length;
        self.verdict(pass, |not| {
            format!(
                "Expected {:?} {not}to have length {length} (was {})",
                self.actual,
                self.actual.length()
            )
        })
    }

    /// Expects the string to match `pattern`.
    pub fn to_match(&self, pattern: &str) -> ExpectResult
    where
        T: AsRef<str> + fmt::Debug,
    {
        let regex = Regex::new(pattern).map_err(|e| {
            ExpectationError::new(format!("Invalid pattern {pattern:?}: {e}"))
        })?;
        let pass = regex.is_match(self.actual.as_ref());
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to match {pattern:?}", self.actual)
        })
    }

    /// Expects a property at a dot-separated `path` in the serialized value.
    pub fn to_have_property(&self, path: &str) -> ExpectResult
    where
        T: Serialize,
    {
        let actual = to_json(&self.actual)?;
        let pass = walk_path(&actual, path).is_some();
        self.verdict(pass, |not| {
            format!("Expected {actual} {not}to have property {path:?}")
        })
    }

    /// Expects a property at `path` with the given value.
    pub fn to_have_property_with_value(
        &self,
        path: &str,
        value: impl Serialize,
    ) -> ExpectResult
    where
        T: Serialize,
    {
        let actual = to_json(&self.actual)?;
        let expected = to_json(&value)?;
        let pass = walk_path(&actual, path) == Some(&expected);
        self.verdict(pass, |not| {
            format!("Expected {actual} {not}to have property {path:?} with value {expected}")
        })
    }
}

impl<T: fmt::Debug> Expectation<Option<T>> {
    /// Expects `Some`.
    pub fn to_be_defined(&self) -> ExpectResult {
        let pass = self.actual.is_some();
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to be defined", self.actual)
        })
    }

    /// Expects `None`.
    pub fn to_be_undefined(&self) -> ExpectResult {
        let pass = self.actual.is_none();
        self.verdict(pass, |not| {
            format!("Expected {:?} {not}to be undefined", self.actual)
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ExpectationError> {
    serde_json::to_value(value).map_err(|e| {
        ExpectationError::new(format!("Could not serialize value for comparison: {e}"))
    })
}

fn walk_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_be_compares_identity() {
        expect(1).to_be(1).unwrap();
        let err = expect(1).to_be(2).unwrap_err();
        assert_eq!(err.message(), "Expected 1 to be 2");
    }

    #[test]
    fn negated_messages_carry_not() {
        let err = expect(1).not().to_be(1).unwrap_err();
        assert_eq!(err.message(), "Expected 1 not to be 1");
    }

    #[test]
    fn to_equal_is_structural() {
        expect(json!({ "a": 1 })).to_equal(json!({ "a": 1 })).unwrap();
        expect(vec![1, 2]).to_equal(json!([1, 2])).unwrap();
        assert!(expect(json!({ "a": 1 })).to_equal(json!({ "a": 2 })).is_err());
    }

    #[test]
    fn property_paths_walk_nested_objects() {
        let value = json!({ "outer": { "inner": 3 } });
        expect(&value).to_have_property("outer.inner").unwrap();
        expect(&value)
            .to_have_property_with_value("outer.inner", 3)
            .unwrap();
        assert!(expect(&value).to_have_property("outer.missing").is_err());
    }

    #[test]
    fn instance_of_checks_concrete_type() {
        expect(5_i32).to_be_instance_of::<i32>().unwrap();
        assert!(expect(5_i32).to_be_instance_of::<u8>().is_err());
    }

    #[test]
    fn invalid_pattern_fails_regardless_of_polarity() {
        assert!(expect("abc").to_match("(").is_err());
        assert!(expect("abc").not().to_match("(").is_err());
    }
}
