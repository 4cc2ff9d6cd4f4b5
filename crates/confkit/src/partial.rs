//! The path-addressed configuration tree.
//!
//! A [`Partial`] maps string keys to [`Value`]s, where a value may itself be
//! a nested `Partial`. Every supplier exposes its content as a `Partial`, and
//! the manager merges them into one.
//!
//! # Merge Rule
//!
//! [`Partial::merge`] is the single conflict-resolution rule of the crate:
//! when both sides hold a tree at a key the merge recurses, otherwise the
//! incoming value replaces the existing one.
//!
//! ```rust
//! use confkit::Partial;
//!
//! let mut base = Partial::new();
//! base.set("a.x", 1)?;
//! base.set("a.y", 2)?;
//!
//! let mut overlay = Partial::new();
//! overlay.set("a.y", 3)?;
//! overlay.set("a.z", 4)?;
//!
//! base.merge(overlay);
//! assert_eq!(base.int("a.x")?, 1);
//! assert_eq!(base.int("a.y")?, 3);
//! assert_eq!(base.int("a.z")?, 4);
//! # Ok::<(), confkit::Error>(())
//! ```

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::populate::{FromValue, Populate, Populator};
use crate::{Error, Path, Result, Value};

/// A nested, order-insensitive mapping from key to [`Value`].
///
/// Cloning is deep: a clone never aliases the original, including nested
/// trees and lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Partial {
    entries: BTreeMap<String, Value>,
}

impl Partial {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys at the top level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the tree has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the top-level entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Walks the tree, returning `None` when a segment is missing or an
    /// intermediate value is not a tree.
    fn lookup(&self, path: Path<'_>) -> Option<&Value> {
        let mut segments = path.segments();
        let mut current = self.entries.get(segments.next()?)?;

        for segment in segments {
            current = current.as_partial()?.entries.get(segment)?;
        }

        Some(current)
    }

    /// Returns `true` if a value exists at `path`.
    pub fn has<'a>(&self, path: impl Into<Path<'a>>) -> bool {
        self.lookup(path.into()).is_some()
    }

    /// Reads the value at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPath`] for the root path and
    /// [`Error::PathNotFound`] when any segment is missing or an
    /// intermediate value is not a tree.
    pub fn get<'a>(&self, path: impl Into<Path<'a>>) -> Result<&Value> {
        let path = path.into();
        if path.is_root() {
            return Err(Error::EmptyPath);
        }

        self.lookup(path)
            .ok_or_else(|| Error::path_not_found(path.as_str()))
    }

    /// Reads the value at `path`, falling back to `default` when absent.
    pub fn get_or<'a>(&self, path: impl Into<Path<'a>>, default: Value) -> Value {
        self.lookup(path.into()).cloned().unwrap_or(default)
    }

    /// Writes `value` at `path`, creating missing intermediate trees.
    ///
    /// A non-tree value found at an intermediate segment is overwritten with
    /// an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyPath`] if the path has no segments.
    pub fn set<'a>(&mut self, path: impl Into<Path<'a>>, value: impl Into<Value>) -> Result<()> {
        let path = path.into();
        let segments: Vec<&str> = path.segments().collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(Error::EmptyPath);
        };

        let mut current = self;
        for segment in parents {
            let slot = current
                .entries
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Partial(Partial::new()));

            if !matches!(slot, Value::Partial(_)) {
                *slot = Value::Partial(Partial::new());
            }

            let Value::Partial(next) = slot else {
                unreachable!("slot was just replaced with a tree");
            };
            current = next;
        }

        current.entries.insert((*leaf).to_string(), value.into());
        Ok(())
    }

    /// Removes and returns the value at `path`, if any.
    pub fn remove<'a>(&mut self, path: impl Into<Path<'a>>) -> Option<Value> {
        let path = path.into();
        let segments: Vec<&str> = path.segments().collect();
        let (leaf, parents) = segments.split_last()?;

        let mut current = self;
        for segment in parents {
            current = current.entries.get_mut(*segment)?.as_partial_mut()?;
        }

        current.entries.remove(*leaf)
    }

    /// Recursively merges `other` into this tree; `other` wins on conflicts.
    pub fn merge(&mut self, other: Partial) {
        for (key, incoming) in other.entries {
            match (self.entries.get_mut(&key), incoming) {
                (Some(Value::Partial(existing)), Value::Partial(incoming)) => {
                    existing.merge(incoming);
                }
                (_, incoming) => {
                    self.entries.insert(key, incoming);
                }
            }
        }
    }

    /// Lower-cases every key and coerces integral floats to integers,
    /// recursively.
    ///
    /// When two keys fold to the same lower-case form, the one sorting last
    /// in the original key order wins.
    #[must_use]
    pub fn normalized(self) -> Self {
        self.entries
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.normalized()))
            .collect()
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    fn typed<'s, 'a, T>(
        &'s self,
        path: Path<'a>,
        expected: &'static str,
        cast: impl FnOnce(&'s Value) -> Option<T>,
    ) -> Result<T> {
        let value = self.get(path)?;
        cast(value).ok_or_else(|| Error::conversion(path.as_str(), expected, value.type_name()))
    }

    /// Reads a boolean.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `bool`.
    pub fn bool<'a>(&self, path: impl Into<Path<'a>>) -> Result<bool> {
        self.typed(path.into(), "bool", Value::as_bool)
    }

    /// Reads an integer.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not an `int`.
    pub fn int<'a>(&self, path: impl Into<Path<'a>>) -> Result<i64> {
        self.typed(path.into(), "int", Value::as_int)
    }

    /// Reads a float; integers widen to `f64`.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not numeric.
    pub fn float<'a>(&self, path: impl Into<Path<'a>>) -> Result<f64> {
        self.typed(path.into(), "float", Value::as_float)
    }

    /// Reads a string.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `string`.
    pub fn string<'a>(&self, path: impl Into<Path<'a>>) -> Result<&str> {
        self.typed(path.into(), "string", Value::as_str)
    }

    /// Reads a list.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `list`.
    pub fn list<'a>(&self, path: impl Into<Path<'a>>) -> Result<&[Value]> {
        self.typed(path.into(), "list", Value::as_list)
    }

    /// Reads a nested tree.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `partial`.
    pub fn partial<'a>(&self, path: impl Into<Path<'a>>) -> Result<&Partial> {
        self.typed(path.into(), "partial", Value::as_partial)
    }

    /// Reads and converts a value through [`FromValue`].
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the conversion does not apply.
    pub fn get_as<'a, T: FromValue>(&self, path: impl Into<Path<'a>>) -> Result<T> {
        let path = path.into();
        let value = self.get(path)?;
        T::from_value(value)
            .ok_or_else(|| Error::conversion(path.as_str(), T::TYPE_NAME, value.type_name()))
    }

    /// Like [`get_as`](Self::get_as), returning `default` when the path is absent.
    ///
    /// # Errors
    ///
    /// Fails only if a value exists and cannot be converted.
    pub fn get_as_or<'a, T: FromValue>(&self, path: impl Into<Path<'a>>, default: T) -> Result<T> {
        let path = path.into();
        match self.lookup(path) {
            None => Ok(default),
            Some(value) => T::from_value(value)
                .ok_or_else(|| Error::conversion(path.as_str(), T::TYPE_NAME, value.type_name())),
        }
    }

    // ========================================================================
    // Typed population
    // ========================================================================

    /// Maps the subtree at `path` onto `target`.
    ///
    /// Keys absent from the tree leave the target's current values in place.
    /// The root path populates from the whole tree.
    ///
    /// # Errors
    ///
    /// Fails if `path` does not resolve to a tree, or a present value does
    /// not match the declared type of its field.
    pub fn populate<'a, T: Populate + ?Sized>(
        &self,
        path: impl Into<Path<'a>>,
        target: &mut T,
        case_insensitive: bool,
    ) -> Result<()> {
        let path = path.into();
        let source = if path.is_root() {
            self
        } else {
            self.partial(path)?
        };

        let mut populator = Populator::new(source, path.as_str(), case_insensitive);
        target.populate(&mut populator)
    }

    /// Deserializes the value at `path` into `T` via serde.
    ///
    /// The root path deserializes the whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`] naming the failing inner field.
    pub fn extract<'a, T: DeserializeOwned>(&self, path: impl Into<Path<'a>>) -> Result<T> {
        let path = path.into();
        let json = if path.is_root() {
            serde_json::to_value(self)
        } else {
            serde_json::to_value(self.get(path)?)
        }
        .map_err(|e| Error::Deserialize {
            path: path.as_str().to_string(),
            message: e.to_string(),
        })?;

        serde_path_to_error::deserialize(json).map_err(|e| {
            let inner = e.path().to_string();
            let full = match (path.as_str(), inner.as_str()) {
                (outer, ".") => outer.to_string(),
                ("", inner) => inner.to_string(),
                (outer, inner) => format!("{outer}.{inner}"),
            };
            Error::Deserialize {
                path: full,
                message: e.into_inner().to_string(),
            }
        })
    }
}

impl FromIterator<(String, Value)> for Partial {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Partial {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'p> IntoIterator for &'p Partial {
    type Item = (&'p String, &'p Value);
    type IntoIter = btree_map::Iter<'p, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
