//! Capability traits backing the generic matchers.
//!
//! Each trait captures one notion a matcher needs (truthiness, emptiness of
//! an option, containment, length) so the matcher can stay a single generic
//! method on [`Expectation`](crate::Expectation).

use serde_json::Value;

/// Values with a truthiness interpretation.
pub trait Truthy {
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

macro_rules! impl_truthy_int {
    ($($ty:ty),+) => {
        $(impl Truthy for $ty {
            fn truthy(&self) -> bool {
                *self != 0
            }
        })+
    };
}

impl_truthy_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Truthy for f32 {
    fn truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for f64 {
    fn truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for &str {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<V> Truthy for Option<V> {
    fn truthy(&self) -> bool {
        self.is_some()
    }
}

impl Truthy for Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }
}

/// Values that can be "nothing": `None` or JSON null.
pub trait Nullish {
    fn nullish(&self) -> bool;
}

impl<V> Nullish for Option<V> {
    fn nullish(&self) -> bool {
        self.is_none()
    }
}

impl Nullish for Value {
    fn nullish(&self) -> bool {
        self.is_null()
    }
}

/// Floating-point values that may be NaN.
pub trait MaybeNan {
    fn nan(&self) -> bool;
}

impl MaybeNan for f32 {
    fn nan(&self) -> bool {
        self.is_nan()
    }
}

impl MaybeNan for f64 {
    fn nan(&self) -> bool {
        self.is_nan()
    }
}

/// Containers that may contain an item: substring for strings, element
/// equality for sequences.
pub trait Contains<Item: ?Sized> {
    fn contains_item(&self, item: &Item) -> bool;
}

impl Contains<&str> for &str {
    fn contains_item(&self, item: &&str) -> bool {
        self.contains(item)
    }
}

impl Contains<&str> for String {
    fn contains_item(&self, item: &&str) -> bool {
        self.contains(item)
    }
}

impl<V: PartialEq> Contains<V> for Vec<V> {
    fn contains_item(&self, item: &V) -> bool {
        self.contains(item)
    }
}

impl<V: PartialEq> Contains<V> for &[V] {
    fn contains_item(&self, item: &V) -> bool {
        self.contains(item)
    }
}

/// Values with a length.
pub trait HasLength {
    fn length(&self) -> usize;
}

impl HasLength for &str {
    fn length(&self) -> usize {
        self.len()
    }
}

impl HasLength for String {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<V> HasLength for Vec<V> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<V> HasLength for &[V] {
    fn length(&self) -> usize {
        self.len()
    }
}
