//! Path observers and change detection.

use std::fmt::{self, Display, Formatter};

use crate::supplier::read_tree;
use crate::{Partial, Path, Value};

/// Callback invoked with `(old, new)` when an observed value changes.
///
/// `old` is `None` when the path was absent at registration time.
pub type Callback = Box<dyn FnMut(Option<&Value>, &Value) + Send>;

/// Handle identifying one observer registration.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObserverId(u64);

impl Display for ObserverId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

struct Observer {
    id: ObserverId,
    path: String,
    snapshot: Option<Value>,
    callback: Callback,
}

/// Observers in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    list: Vec<Observer>,
    next: u64,
}

/// Reads a path from the merged tree with supplier semantics.
pub(crate) fn current(tree: &Partial, path: &str, separator: char) -> Option<Value> {
    read_tree(tree, Path::with_separator(path, separator)).ok()
}

impl Observers {
    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    pub(crate) fn add(
        &mut self,
        path: String,
        snapshot: Option<Value>,
        callback: Callback,
    ) -> ObserverId {
        let id = ObserverId(self.next);
        self.next += 1;
        self.list.push(Observer {
            id,
            path,
            snapshot,
            callback,
        });

        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.list.len();
        self.list.retain(|o| o.id != id);
        self.list.len() != before
    }

    pub(crate) fn remove_path(&mut self, path: &str) -> usize {
        let before = self.list.len();
        self.list.retain(|o| o.path != path);
        before - self.list.len()
    }

    /// Compares every observer's snapshot with `tree` and fires callbacks for
    /// changed paths, in registration order. A path now absent fires
    /// nothing and keeps its snapshot.
    ///
    /// Returns the number of callbacks fired.
    pub(crate) fn notify(&mut self, tree: &Partial, separator: char) -> usize {
        let mut fired = 0;

        for observer in &mut self.list {
            let Some(new) = current(tree, &observer.path, separator) else {
                continue;
            };

            if observer.snapshot.as_ref() == Some(&new) {
                continue;
            }

            (observer.callback)(observer.snapshot.as_ref(), &new);
            observer.snapshot = Some(new);
            fired += 1;
        }

        fired
    }
}
