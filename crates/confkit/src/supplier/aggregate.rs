use tracing::debug;

use super::factory::has_type;
use super::{Supplier, SupplierCreator, read_tree, tree_has};
use crate::{Error, Partial, Path, Result, Value};

/// Merges a fixed list of suppliers into one subtree.
///
/// Children are merged once, at construction, in list order with later
/// children winning. Closing the aggregate closes every child.
pub struct AggregateSupplier {
    children: Vec<Box<dyn Supplier>>,
    tree: Partial,
}

impl AggregateSupplier {
    /// Merges the full subtree of each child.
    ///
    /// # Errors
    ///
    /// Returns the first child read failure.
    pub fn new(children: Vec<Box<dyn Supplier>>) -> Result<Self> {
        let mut tree = Partial::new();

        for child in &children {
            if let Value::Partial(subtree) = child.get(Path::root())? {
                tree.merge(subtree);
            }
        }

        debug!(children = children.len(), "built aggregate supplier");
        Ok(Self { children, tree })
    }

    /// Number of wrapped suppliers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` when no suppliers are wrapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Supplier for AggregateSupplier {
    fn has(&self, path: Path<'_>) -> bool {
        tree_has(&self.tree, path)
    }

    fn get(&self, path: Path<'_>) -> Result<Value> {
        read_tree(&self.tree, path)
    }

    /// Closes every child, returning the first failure after trying all.
    fn close(&mut self) -> Result<()> {
        let mut first: Option<Error> = None;

        for child in &mut self.children {
            if let Err(e) = child.close() {
                first.get_or_insert(e);
            }
        }

        first.map_or(Ok(()), Err)
    }
}

/// Source of the children for an aggregate description.
type ChildSource = dyn Fn(&Partial) -> Result<Vec<Box<dyn Supplier>>> + Send + Sync;

/// Creates [`AggregateSupplier`]s from `type: aggregate` descriptions.
///
/// Children are not described declaratively; the closure given to
/// [`new`](Self::new) produces them, and may read any extra field of the
/// description (for example a tag) to decide which.
///
/// ```rust
/// use confkit::{Partial, Path, SupplierFactory};
/// use confkit::supplier::{AggregateCreator, PartialSupplier, Supplier};
///
/// let mut factory = SupplierFactory::empty();
/// factory.register(AggregateCreator::new(|_description| {
///     let mut base = Partial::new();
///     base.set("a", 1)?;
///     let mut overlay = Partial::new();
///     overlay.set("a", 2)?;
///
///     Ok(vec![
///         Box::new(PartialSupplier::new(base)) as Box<dyn Supplier>,
///         Box::new(PartialSupplier::new(overlay)),
///     ])
/// }));
///
/// let mut description = Partial::new();
/// description.set("type", "aggregate")?;
/// let supplier = factory.create(&description)?;
/// assert_eq!(supplier.get(Path::new("a"))?.as_int(), Some(2));
/// # Ok::<(), confkit::Error>(())
/// ```
pub struct AggregateCreator {
    children: Box<ChildSource>,
}

impl AggregateCreator {
    /// Creates a creator drawing children from `children`.
    pub fn new<F>(children: F) -> Self
    where
        F: Fn(&Partial) -> Result<Vec<Box<dyn Supplier>>> + Send + Sync + 'static,
    {
        Self {
            children: Box::new(children),
        }
    }
}

impl SupplierCreator for AggregateCreator {
    fn accepts(&self, description: &Partial) -> bool {
        has_type(description, "aggregate")
    }

    fn create(&self, description: &Partial) -> Result<Box<dyn Supplier>> {
        let children = (self.children)(description)?;
        Ok(Box::new(AggregateSupplier::new(children)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supplier::PartialSupplier;

    struct FailingClose;

    impl Supplier for FailingClose {
        fn has(&self, path: Path<'_>) -> bool {
            path.is_root()
        }

        fn get(&self, _path: Path<'_>) -> Result<Value> {
            Ok(Value::Partial(Partial::new()))
        }

        fn close(&mut self) -> Result<()> {
            Err(Error::invalid_supplier("close failed"))
        }
    }

    fn tree(path: &str, value: i64) -> Box<dyn Supplier> {
        let mut tree = Partial::new();
        tree.set(path, value).unwrap();
        Box::new(PartialSupplier::new(tree))
    }

    #[test]
    fn test_later_children_win() {
        let aggregate = AggregateSupplier::new(vec![tree("a.x", 1), tree("a.y", 2), tree("a.x", 3)])
            .unwrap();

        assert_eq!(aggregate.len(), 3);
        assert_eq!(aggregate.get(Path::new("a.x")).unwrap(), Value::Int(3));
        assert_eq!(aggregate.get(Path::new("a.y")).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_close_reports_child_failure() {
        let mut aggregate =
            AggregateSupplier::new(vec![tree("a", 1), Box::new(FailingClose)]).unwrap();
        assert!(aggregate.close().is_err());
    }
}
