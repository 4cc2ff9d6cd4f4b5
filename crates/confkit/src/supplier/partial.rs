use super::{Supplier, read_tree, tree_has};
use crate::{Partial, Path, Result, Value};

/// Serves a fixed in-memory tree.
///
/// Useful for programmatic defaults and for composing suppliers in tests.
///
/// ```rust
/// use confkit::{Partial, Path};
/// use confkit::supplier::{PartialSupplier, Supplier};
///
/// let mut defaults = Partial::new();
/// defaults.set("server.port", 8080)?;
///
/// let supplier = PartialSupplier::new(defaults);
/// assert!(supplier.has(Path::new("server.port")));
/// assert!(supplier.get(Path::root())?.as_partial().is_some());
/// # Ok::<(), confkit::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct PartialSupplier {
    tree: Partial,
}

impl PartialSupplier {
    /// Creates a supplier over `tree`.
    #[must_use]
    pub fn new(tree: Partial) -> Self {
        Self { tree }
    }

    /// The served tree.
    #[must_use]
    pub fn tree(&self) -> &Partial {
        &self.tree
    }
}

impl From<Partial> for PartialSupplier {
    fn from(tree: Partial) -> Self {
        Self::new(tree)
    }
}

impl Supplier for PartialSupplier {
    fn has(&self, path: Path<'_>) -> bool {
        tree_has(&self.tree, path)
    }

    fn get(&self, path: Path<'_>) -> Result<Value> {
        read_tree(&self.tree, path)
    }
}
