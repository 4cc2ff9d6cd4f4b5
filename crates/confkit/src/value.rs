//! Dynamically-typed configuration values.
//!
//! The [`Value`] enum is the leaf-or-branch type stored in a [`Partial`].
//! Decoders produce values through the same [`Value::normalized`] routine so
//! that content is comparable regardless of which format it came from:
//!
//! - every mapping key is lower-cased
//! - every float with no fractional part (and within `i64` range) becomes an `Int`
//!
//! # Example
//!
//! ```rust
//! use confkit::Value;
//!
//! let value = Value::Float(8080.0).normalized();
//! assert_eq!(value, Value::Int(8080));
//! assert_eq!(value.type_name(), "int");
//! ```

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use serde_json as SJSON;

use crate::Partial;

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates `From<T>` implementations for integer types.
macro_rules! impl_from_integer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )+
    };
}

// ============================================================================
// Value Enum
// ============================================================================

/// A configuration value: a scalar, an ordered list, or a nested tree.
///
/// | Variant | Rust Types |
/// |---------|------------|
/// | `Bool` | `bool` |
/// | `Int` | `i8` - `i64`, `u8` - `u32` |
/// | `Float` | `f32`, `f64` |
/// | `String` | `String`, `&str` |
/// | `List` | `Vec<Value>` |
/// | `Partial` | [`Partial`] |
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A boolean value.
    Bool(bool),

    /// A signed integer.
    Int(i64),

    /// A floating-point value with a fractional part.
    Float(f64),

    /// A string value.
    String(String),

    /// An ordered list of values.
    List(Vec<Value>),

    /// A nested tree.
    Partial(Partial),
}

impl Value {
    /// Returns the name of this value's dynamic type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Partial(_) => "partial",
        }
    }

    /// Returns the boolean if this is a `Bool`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as `f64`. Integers widen, since normalisation
    /// stores integral floats as `Int`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the string slice if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is a `List`.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the tree if this is a `Partial`.
    #[must_use]
    pub const fn as_partial(&self) -> Option<&Partial> {
        match self {
            Value::Partial(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the tree mutably if this is a `Partial`.
    pub fn as_partial_mut(&mut self) -> Option<&mut Partial> {
        match self {
            Value::Partial(p) => Some(p),
            _ => None,
        }
    }

    /// Applies the decode-boundary normalisation to this value and every
    /// value nested inside it.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Value::Float(f) => Self::coerce_float(f),
            Value::List(items) => Value::List(items.into_iter().map(Value::normalized).collect()),
            Value::Partial(p) => Value::Partial(p.normalized()),
            other => other,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn coerce_float(f: f64) -> Self {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
        if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Value::Int(f as i64)
        } else {
            Value::Float(f)
        }
    }

    /// Converts a JSON value, returning `None` for `null`.
    ///
    /// `null` entries inside objects and arrays are dropped. In a list this
    /// shifts later elements down, so `[1, null, 2]` becomes `[1, 2]` and
    /// element indices do not survive. The result is not yet normalised.
    #[must_use]
    pub fn from_json(json: SJSON::Value) -> Option<Self> {
        match json {
            SJSON::Value::Null => None,

            SJSON::Value::Bool(b) => Some(Value::Bool(b)),

            SJSON::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),

            SJSON::Value::String(s) => Some(Value::String(s)),

            SJSON::Value::Array(items) => Some(Value::List(
                items.into_iter().filter_map(Value::from_json).collect(),
            )),

            SJSON::Value::Object(map) => Some(Value::Partial(
                map.into_iter()
                    .filter_map(|(k, v)| Value::from_json(v).map(|v| (k, v)))
                    .collect(),
            )),
        }
    }

    /// Infers a typed value from a raw string.
    ///
    /// Inference order: bool -> int -> float -> string. Used for sources
    /// that only carry strings, such as environment variables.
    #[must_use]
    pub fn from_str_infer(s: &str) -> Self {
        if s.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }

        if let Ok(n) = s.parse::<i64>() {
            return Value::Int(n);
        }

        if (s.contains('.') || s.contains('e') || s.contains('E'))
            && let Ok(f) = s.parse::<f64>()
        {
            return Self::coerce_float(f);
        }

        Value::String(s.to_string())
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Partial> for Value {
    fn from(p: Partial) -> Self {
        Value::Partial(p)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::List(_) | Value::Partial(_) => {
                let json = SJSON::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_float_becomes_int() {
        assert_eq!(Value::Float(3.0).normalized(), Value::Int(3));
        assert_eq!(Value::Float(-0.0).normalized(), Value::Int(0));
        assert_eq!(Value::Float(3.5).normalized(), Value::Float(3.5));
        assert_eq!(Value::Float(1e300).normalized(), Value::Float(1e300));
        assert!(matches!(Value::Float(f64::NAN).normalized(), Value::Float(_)));
    }

    #[test]
    fn test_normalized_recurses_into_lists() {
        let value = Value::List(vec![Value::Float(1.0), Value::Float(1.5)]).normalized();
        assert_eq!(value, Value::List(vec![Value::Int(1), Value::Float(1.5)]));
    }

    #[test]
    fn test_from_json_drops_null() {
        let json = SJSON::json!({"a": null, "b": [1, null, 2.5]});
        let value = Value::from_json(json).unwrap();
        let tree = value.as_partial().unwrap();
        assert!(!tree.has("a"));
        assert_eq!(
            tree.get("b").unwrap(),
            &Value::List(vec![Value::Int(1), Value::Float(2.5)])
        );
        assert!(Value::from_json(SJSON::Value::Null).is_none());
    }

    #[test]
    fn test_from_str_infer() {
        assert_eq!(Value::from_str_infer("TRUE"), Value::Bool(true));
        assert_eq!(Value::from_str_infer("-42"), Value::Int(-42));
        assert_eq!(Value::from_str_infer("2.0"), Value::Int(2));
        assert_eq!(Value::from_str_infer("2.5"), Value::Float(2.5));
        assert_eq!(
            Value::from_str_infer("localhost"),
            Value::String("localhost".to_string())
        );
    }

    #[test]
    fn test_float_accessor_widens_int() {
        assert_eq!(Value::Int(2).as_float(), Some(2.0));
        assert_eq!(Value::Bool(true).as_float(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(8080).to_string(), "8080");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1,2]");
    }
}
