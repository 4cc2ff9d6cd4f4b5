//! Reflection-free population of typed records from a [`Partial`].
//!
//! A record declares its mapping once, by implementing [`Populate`] (by hand
//! or with `#[derive(Populate)]`), listing which key feeds which field. The
//! [`Populator`] then walks that list against a tree:
//!
//! - keys absent from the tree are skipped, leaving the field's current value
//! - present values must convert through [`FromValue`], or population fails
//!   with [`Error::Conversion`] naming the full path
//! - nested records recurse through [`Populator::nested`]
//!
//! # Example
//!
//! ```rust
//! use confkit::{Partial, Populate, Populator, Result};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! impl Populate for Server {
//!     fn populate(&mut self, from: &mut Populator<'_>) -> Result<()> {
//!         from.field("host", &mut self.host)?
//!             .field("port", &mut self.port)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut tree = Partial::new();
//! tree.set("server.PORT", 8080)?;
//!
//! let mut server = Server { host: "localhost".into(), ..Server::default() };
//! tree.populate("server", &mut server, true)?;
//! assert_eq!(server.host, "localhost");
//! assert_eq!(server.port, 8080);
//! # Ok::<(), confkit::Error>(())
//! ```

use crate::{Error, Partial, Result, Value};

// ============================================================================
// Leaf conversion
// ============================================================================

/// Conversion from a stored [`Value`] into a field type.
pub trait FromValue: Sized {
    /// Name of the target type, used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Converts the value, returning `None` on a type mismatch.
    fn from_value(value: &Value) -> Option<Self>;
}

/// Generates range-checked `FromValue` implementations for integers.
macro_rules! impl_from_value_integer {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FromValue for $t {
                const TYPE_NAME: &'static str = stringify!($t);

                fn from_value(value: &Value) -> Option<Self> {
                    value.as_int().and_then(|n| <$t>::try_from(n).ok())
                }
            }
        )+
    };
}

impl_from_value_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_float()
    }
}

impl FromValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_float().map(|f| f as f32)
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(ToString::to_string)
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for Partial {
    const TYPE_NAME: &'static str = "partial";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_partial().cloned()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE_NAME: &'static str = "list";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_value(value: &Value) -> Option<Self> {
        T::from_value(value).map(Some)
    }
}

// ============================================================================
// Record population
// ============================================================================

/// A record whose fields can be filled from a tree.
///
/// Implementations list their field-to-key mapping through the
/// [`Populator`] builder.
pub trait Populate {
    /// Fills `self` from the tree behind `from`.
    ///
    /// # Errors
    ///
    /// Returns the first conversion failure.
    fn populate(&mut self, from: &mut Populator<'_>) -> Result<()>;
}

/// Builder walking a record's declared fields against one tree level.
pub struct Populator<'a> {
    source: &'a Partial,
    prefix: String,
    case_insensitive: bool,
}

impl<'a> Populator<'a> {
    /// Creates a populator over `source`.
    ///
    /// `prefix` is the path of `source` inside its root, used in error messages.
    pub fn new(source: &'a Partial, prefix: impl Into<String>, case_insensitive: bool) -> Self {
        Self {
            source,
            prefix: prefix.into(),
            case_insensitive,
        }
    }

    /// Finds the value stored under `key` at this level.
    fn find(&self, key: &str) -> Option<&'a Value> {
        let source: &'a Partial = self.source;
        if let Some((_, value)) = source.iter().find(|(k, _)| k.as_str() == key) {
            return Some(value);
        }

        if self.case_insensitive {
            return source
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v);
        }

        None
    }

    fn full_path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    /// Fills a leaf field from `key`; an absent key leaves it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] when the stored value does not convert
    /// to `T`.
    pub fn field<T: FromValue>(&mut self, key: &str, target: &mut T) -> Result<&mut Self> {
        if let Some(value) = self.find(key) {
            *target = T::from_value(value).ok_or_else(|| {
                Error::conversion(self.full_path(key), T::TYPE_NAME, value.type_name())
            })?;
        }

        Ok(self)
    }

    /// Fills a nested record from the tree under `key`; an absent key leaves
    /// it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] when the stored value is not a tree, or
    /// the nested population fails.
    pub fn nested<T: Populate + ?Sized>(&mut self, key: &str, target: &mut T) -> Result<&mut Self> {
        if let Some(value) = self.find(key) {
            let path = self.full_path(key);
            let tree = value
                .as_partial()
                .ok_or_else(|| Error::conversion(path.clone(), "partial", value.type_name()))?;

            let mut inner = Populator::new(tree, path, self.case_insensitive);
            target.populate(&mut inner)?;
        }

        Ok(self)
    }

    /// Returns `true` if keys are matched ignoring ASCII case.
    #[must_use]
    pub const fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }
}
