//! Priority-ordered supplier registrations.

use tracing::{debug, warn};

use crate::supplier::Supplier;
use crate::{Error, Partial, Path, Result, Value};

/// One registered supplier.
struct Entry {
    id: String,
    priority: i64,
    supplier: Box<dyn Supplier>,
}

/// Suppliers kept sorted by ascending priority, stable for ties.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// `(id, priority)` pairs in merge order.
    pub(crate) fn entries(&self) -> Vec<(String, i64)> {
        self.entries
            .iter()
            .map(|e| (e.id.clone(), e.priority))
            .collect()
    }

    fn sort(&mut self) {
        self.entries.sort_by_key(|e| e.priority);
    }

    /// Registers a supplier; an existing id is left untouched.
    pub(crate) fn insert(
        &mut self,
        id: String,
        priority: i64,
        supplier: Box<dyn Supplier>,
    ) -> Result<()> {
        if self.contains(&id) {
            return Err(Error::DuplicateSupplier { id });
        }

        debug!(id = %id, priority, "supplier added");
        self.entries.push(Entry {
            id,
            priority,
            supplier,
        });
        self.sort();

        Ok(())
    }

    /// Closes and forgets the supplier under `id`.
    ///
    /// Returns `false` for an unknown id. A close failure leaves the supplier
    /// registered.
    pub(crate) fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        self.entries[index].supplier.close()?;
        self.entries.remove(index);
        debug!(id, "supplier removed");

        Ok(true)
    }

    /// Closes every supplier in merge order, then forgets them all.
    ///
    /// The first close failure aborts the call and leaves every supplier
    /// registered.
    pub(crate) fn remove_all(&mut self) -> Result<()> {
        for entry in &mut self.entries {
            if let Err(e) = entry.supplier.close() {
                warn!(id = %entry.id, error = %e, "failed to close supplier");
                return Err(e);
            }
        }

        debug!(count = self.entries.len(), "suppliers removed");
        self.entries.clear();

        Ok(())
    }

    /// Changes a supplier's priority and re-sorts.
    pub(crate) fn set_priority(&mut self, id: &str, priority: i64) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| Error::SupplierNotFound { id: id.to_string() })?;

        self.entries[index].priority = priority;
        self.sort();
        debug!(id, priority, "supplier reprioritised");

        Ok(())
    }

    /// Merges every supplier's subtree in ascending priority order.
    ///
    /// A supplier whose subtree cannot be read contributes nothing.
    pub(crate) fn merged(&self) -> Partial {
        let mut tree = Partial::new();

        for entry in &self.entries {
            match entry.supplier.get(Path::root()) {
                Ok(Value::Partial(subtree)) => tree.merge(subtree),
                Ok(other) => warn!(
                    id = %entry.id,
                    found = other.type_name(),
                    "supplier root is not a tree; skipped"
                ),
                Err(e) => warn!(id = %entry.id, error = %e, "supplier read failed; skipped"),
            }
        }

        tree
    }

    /// Reloads every observable supplier. Returns `true` if any changed.
    ///
    /// Every observable supplier is polled even after one reports a change.
    pub(crate) fn reload(&mut self) -> bool {
        let mut changed = false;

        for entry in &mut self.entries {
            let Some(observable) = entry.supplier.as_observable() else {
                continue;
            };

            match observable.reload() {
                Ok(true) => {
                    debug!(id = %entry.id, "supplier changed");
                    changed = true;
                }
                Ok(false) => {}
                Err(e) => warn!(id = %entry.id, error = %e, "supplier reload failed"),
            }
        }

        changed
    }

    /// Closes every supplier, keeping them registered. Returns the first
    /// failure after trying all.
    pub(crate) fn close_all(&mut self) -> Result<()> {
        let mut first: Option<Error> = None;

        for entry in &mut self.entries {
            if let Err(e) = entry.supplier.close() {
                warn!(id = %entry.id, error = %e, "failed to close supplier");
                first.get_or_insert(e);
            }
        }

        first.map_or(Ok(()), Err)
    }
}
