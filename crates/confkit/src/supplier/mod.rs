//! Configuration suppliers: one per configuration origin.
//!
//! A [`Supplier`] is a read-only view over one subtree of configuration.
//! Suppliers whose backing source can change expose [`ObservableSupplier`],
//! which the manager polls for changes.
//!
//! # Built-in Suppliers
//!
//! | `type` | Supplier | Observable |
//! |--------|----------|------------|
//! | `env` | [`EnvSupplier`] | no |
//! | `file` | [`FileSupplier`] | no |
//! | `observable-file` | [`ObservableFileSupplier`] | yes |
//! | `dir` | [`DirSupplier`] | no |
//! | `rest` | [`RestSupplier`] | no |
//! | `observable-rest` | [`ObservableRestSupplier`] | yes |
//! | `aggregate` | [`AggregateSupplier`] | no |
//!
//! [`PartialSupplier`] serves a fixed in-memory tree and has no description.
//!
//! # Custom Suppliers
//!
//! ```rust
//! use confkit::{Partial, Path, Result, Value};
//! use confkit::supplier::{Supplier, read_tree};
//!
//! struct Constants(Partial);
//!
//! impl Supplier for Constants {
//!     fn has(&self, path: Path<'_>) -> bool {
//!         path.is_root() || self.0.has(path)
//!     }
//!
//!     fn get(&self, path: Path<'_>) -> Result<Value> {
//!         read_tree(&self.0, path)
//!     }
//! }
//! ```

mod aggregate;
mod dir;
mod env;
mod factory;
mod file;
mod partial;
mod rest;

pub use aggregate::{AggregateCreator, AggregateSupplier};
pub use dir::{DirCreator, DirSupplier};
pub use env::{EnvCreator, EnvSupplier};
pub use factory::{SupplierCreator, SupplierFactory};
pub use file::{FileCreator, FileSupplier, ObservableFileCreator, ObservableFileSupplier};
pub use partial::PartialSupplier;
#[cfg(feature = "rest")]
pub use rest::ReqwestClient;
pub use rest::{
    Endpoint, HttpClient, ObservableRestCreator, ObservableRestSupplier, RestCreator,
    RestSupplier,
};

use crate::{Partial, Path, Result, Value};

/// A read-only provider of one configuration subtree.
pub trait Supplier: Send + Sync {
    /// Returns `true` if a value exists at `path`. The root path always exists.
    fn has(&self, path: Path<'_>) -> bool;

    /// Reads the value at `path`; the root path yields the whole subtree as
    /// [`Value::Partial`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathNotFound`](crate::Error::PathNotFound) when the
    /// path is absent.
    fn get(&self, path: Path<'_>) -> Result<Value>;

    /// Reads the value at `path`, falling back to `default` when absent.
    fn get_or(&self, path: Path<'_>, default: Value) -> Value {
        self.get(path).unwrap_or(default)
    }

    /// Releases resources held by the supplier.
    ///
    /// # Errors
    ///
    /// Implementations report release failures; the default does nothing.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns the reloadable view of this supplier, if it has one.
    fn as_observable(&mut self) -> Option<&mut dyn ObservableSupplier> {
        None
    }
}

/// A supplier whose backing source can change after construction.
pub trait ObservableSupplier: Supplier {
    /// Checks the backing source and reloads it if it changed.
    ///
    /// Returns `true` when new content was installed.
    ///
    /// # Errors
    ///
    /// Returns the I/O, HTTP or decode failure; the previous content is kept.
    fn reload(&mut self) -> Result<bool>;
}

/// Reads `path` from `tree` with supplier semantics: the root path returns
/// a clone of the whole tree.
///
/// # Errors
///
/// Returns [`Error::PathNotFound`](crate::Error::PathNotFound) when the
/// path is absent.
pub fn read_tree(tree: &Partial, path: Path<'_>) -> Result<Value> {
    if path.is_root() {
        return Ok(Value::Partial(tree.clone()));
    }

    tree.get(path).cloned()
}

/// Supplier-semantics presence check: the root path always exists.
pub(crate) fn tree_has(tree: &Partial, path: Path<'_>) -> bool {
    path.is_root() || tree.has(path)
}
