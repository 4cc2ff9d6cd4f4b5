//! The configuration manager: priority merge, observers and hot reload.
//!
//! A [`ConfigManager`] holds suppliers ordered by ascending priority and
//! exposes one merged tree. Every registry change rebuilds that tree:
//!
//! 1. start from an empty tree
//! 2. merge each supplier's full subtree in ascending priority order, so
//!    higher priorities override lower ones
//! 3. install the result as the new exposed tree
//! 4. compare every observed path with its snapshot and fire callbacks for
//!    changed values, in registration order
//!
//! # Locking
//!
//! One mutex guards suppliers, observers and the exposed tree. Rebuilds run
//! entirely under it, so observer callbacks must not call back into the
//! same manager.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use confkit::{ConfigManager, Options, Partial};
//! use confkit::supplier::PartialSupplier;
//!
//! let manager = ConfigManager::new(Options::default())?;
//!
//! let mut defaults = Partial::new();
//! defaults.set("server.port", 8080)?;
//! manager.add_supplier("defaults", 0, Box::new(PartialSupplier::new(defaults)))?;
//!
//! let port = Arc::new(AtomicI64::new(0));
//! let seen = Arc::clone(&port);
//! manager.add_observer("server.port", move |_old, new| {
//!     seen.store(new.as_int().unwrap_or_default(), Ordering::SeqCst);
//! });
//!
//! let mut overrides = Partial::new();
//! overrides.set("server.port", 9090)?;
//! manager.add_supplier("overrides", 10, Box::new(PartialSupplier::new(overrides)))?;
//!
//! assert_eq!(manager.int("server.port")?, 9090);
//! assert_eq!(port.load(Ordering::SeqCst), 9090);
//! # Ok::<(), confkit::Error>(())
//! ```

mod observer;
mod registry;

pub use observer::{Callback, ObserverId};

use std::fmt::{self, Debug, Formatter};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::populate::{FromValue, Populate};
use crate::supplier::{Supplier, read_tree};
use crate::trigger::{Recurring, Trigger};
use crate::{Error, Options, Partial, Path, Result, Value};

use observer::Observers;
use registry::Registry;

// ============================================================================
// Shared state
// ============================================================================

/// Everything guarded by the manager's lock.
struct Inner {
    registry: Registry,
    observers: Observers,
    tree: Arc<Partial>,
    separator: char,
    epoch: u64,
}

impl Inner {
    /// Merges, installs, then notifies.
    fn rebuild(&mut self) {
        let merged = self.registry.merged();
        self.tree = Arc::new(merged);
        self.epoch += 1;

        let notified = self.observers.notify(&self.tree, self.separator);
        debug!(
            suppliers = self.registry.len(),
            notified,
            epoch = self.epoch,
            "configuration rebuilt"
        );
    }

    /// Polls observable suppliers; rebuilds once if any changed.
    fn reload(&mut self) -> bool {
        if !self.registry.reload() {
            return false;
        }

        self.rebuild();
        true
    }
}

// ============================================================================
// ConfigManager
// ============================================================================

/// Aggregates suppliers into one merged tree and notifies path observers.
pub struct ConfigManager {
    inner: Arc<Mutex<Inner>>,
    trigger: Mutex<Option<Recurring>>,
    options: Options,
}

impl ConfigManager {
    /// Creates an empty manager.
    ///
    /// With a non-zero [`Options::poll_interval`], a background trigger polls
    /// observable suppliers at that interval and rebuilds when one changed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Trigger`] if the polling thread cannot be started.
    pub fn new(options: Options) -> Result<Self> {
        let inner = Arc::new(Mutex::new(Inner {
            registry: Registry::default(),
            observers: Observers::default(),
            tree: Arc::new(Partial::new()),
            separator: options.separator,
            epoch: 0,
        }));

        let trigger = if options.polls() {
            let weak = Arc::downgrade(&inner);
            let trigger = Recurring::start(options.poll_interval, move || poll(&weak))?;
            info!(interval = ?options.poll_interval, "hot reload enabled");
            Some(trigger)
        } else {
            None
        };

        Ok(Self {
            inner,
            trigger: Mutex::new(trigger),
            options,
        })
    }

    /// The options this manager was created with.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    fn path<'a>(&self, raw: &'a str) -> Path<'a> {
        Path::with_separator(raw, self.options.separator)
    }

    // ========================================================================
    // Supplier registry
    // ========================================================================

    /// Registers `supplier` under `id` and rebuilds.
    ///
    /// Lower priorities merge first; higher priorities override them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSupplier`] if `id` is taken; the existing
    /// registration is untouched and `supplier` is dropped.
    pub fn add_supplier(
        &self,
        id: impl Into<String>,
        priority: i64,
        supplier: Box<dyn Supplier>,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.registry.insert(id.into(), priority, supplier)?;
        inner.rebuild();
        Ok(())
    }

    /// Closes and unregisters the supplier under `id`, then rebuilds.
    ///
    /// An unknown id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the supplier's close failure; it then stays registered.
    pub fn remove_supplier(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.registry.remove(id)? {
            inner.rebuild();
        }
        Ok(())
    }

    /// Closes and unregisters every supplier, then rebuilds.
    ///
    /// # Errors
    ///
    /// Returns the first close failure. Every supplier then stays registered
    /// and the tree is not rebuilt.
    pub fn remove_all_suppliers(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.registry.remove_all()?;
        inner.rebuild();
        Ok(())
    }

    /// Changes the priority of the supplier under `id`, then rebuilds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SupplierNotFound`] for an unknown id.
    pub fn supplier_priority(&self, id: &str, priority: i64) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.registry.set_priority(id, priority)?;
        inner.rebuild();
        Ok(())
    }

    /// Returns `true` if a supplier is registered under `id`.
    #[must_use]
    pub fn has_supplier(&self, id: &str) -> bool {
        self.inner.lock().registry.contains(id)
    }

    /// `(id, priority)` pairs in merge order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, i64)> {
        self.inner.lock().registry.entries()
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Registers `callback` to fire with `(old, new)` whenever the value at
    /// `path` changes.
    ///
    /// The current value is captured as the initial snapshot, so only later
    /// changes are reported. A rebuild where the path is absent fires
    /// nothing.
    pub fn add_observer<F>(&self, path: &str, callback: F) -> ObserverId
    where
        F: FnMut(Option<&Value>, &Value) + Send + 'static,
    {
        let mut inner = self.inner.lock();
        let snapshot = observer::current(&inner.tree, path, inner.separator);
        let id = inner
            .observers
            .add(path.to_string(), snapshot, Box::new(callback));
        debug!(%id, path, "observer added");
        id
    }

    /// Removes one observer. Returns `false` if it was not registered.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.inner.lock().observers.remove(id)
    }

    /// Removes every observer on `path`, returning how many were removed.
    pub fn remove_observers(&self, path: &str) -> usize {
        self.inner.lock().observers.remove_path(path)
    }

    // ========================================================================
    // Rebuild and reload
    // ========================================================================

    /// Forces a merge-and-notify pass.
    pub fn rebuild(&self) {
        self.inner.lock().rebuild();
    }

    /// Polls every observable supplier once, rebuilding once if any changed.
    ///
    /// This is what the background trigger runs. Returns `true` if a rebuild
    /// happened.
    pub fn reload(&self) -> bool {
        self.inner.lock().reload()
    }

    /// Number of rebuilds performed so far.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    /// Closes every supplier, then stops the background trigger.
    ///
    /// Suppliers stay registered. Closing again is harmless.
    ///
    /// # Errors
    ///
    /// Returns the first supplier close failure; the trigger is stopped
    /// regardless.
    pub fn close(&self) -> Result<()> {
        let closed = self.inner.lock().registry.close_all();
        self.stop_trigger();
        closed
    }

    /// Stops polling. The inner lock must not be held: the trigger thread
    /// may be waiting on it.
    fn stop_trigger(&self) {
        let trigger = self.trigger.lock().take();
        if let Some(mut trigger) = trigger {
            // Recurring::close is infallible.
            let _ = trigger.close();
            info!("hot reload stopped");
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// A snapshot of the merged tree; later rebuilds do not affect it.
    #[must_use]
    pub fn partial(&self) -> Arc<Partial> {
        Arc::clone(&self.inner.lock().tree)
    }

    /// Returns `true` if a value exists at `path`. The root path always
    /// exists.
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        let path = self.path(path);
        path.is_root() || self.partial().has(path)
    }

    /// Reads the value at `path`; the root path yields the whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathNotFound`] when the path is absent.
    pub fn get(&self, path: &str) -> Result<Value> {
        read_tree(&self.partial(), self.path(path))
    }

    /// Reads the value at `path`, falling back to `default` when absent.
    #[must_use]
    pub fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).unwrap_or(default)
    }

    /// Reads a boolean.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `bool`.
    pub fn bool(&self, path: &str) -> Result<bool> {
        self.partial().bool(self.path(path))
    }

    /// Reads an integer.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not an `int`.
    pub fn int(&self, path: &str) -> Result<i64> {
        self.partial().int(self.path(path))
    }

    /// Reads a float; integers widen to `f64`.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not numeric.
    pub fn float(&self, path: &str) -> Result<f64> {
        self.partial().float(self.path(path))
    }

    /// Reads a string.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `string`.
    pub fn string(&self, path: &str) -> Result<String> {
        self.partial().string(self.path(path)).map(str::to_string)
    }

    /// Reads a list.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `list`.
    pub fn list(&self, path: &str) -> Result<Vec<Value>> {
        self.partial().list(self.path(path)).map(<[Value]>::to_vec)
    }

    /// Reads a subtree; the root path yields the whole tree.
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the value is not a `partial`.
    pub fn subtree(&self, path: &str) -> Result<Partial> {
        let path = self.path(path);
        let tree = self.partial();
        if path.is_root() {
            return Ok(Partial::clone(&tree));
        }

        tree.partial(path).cloned()
    }

    /// Reads and converts a value through [`FromValue`].
    ///
    /// # Errors
    ///
    /// Fails if the path is absent or the conversion does not apply.
    pub fn get_as<T: FromValue>(&self, path: &str) -> Result<T> {
        self.partial().get_as(self.path(path))
    }

    /// Like [`get_as`](Self::get_as), returning `default` when the path is absent.
    ///
    /// # Errors
    ///
    /// Fails only if a value exists and cannot be converted.
    pub fn get_as_or<T: FromValue>(&self, path: &str, default: T) -> Result<T> {
        self.partial().get_as_or(self.path(path), default)
    }

    /// Maps the subtree at `path` onto `target`; see [`Partial::populate`].
    ///
    /// # Errors
    ///
    /// Fails if `path` is not a tree or a present value has the wrong type.
    pub fn populate<T: Populate + ?Sized>(
        &self,
        path: &str,
        target: &mut T,
        case_insensitive: bool,
    ) -> Result<()> {
        self.partial()
            .populate(self.path(path), target, case_insensitive)
    }

    /// Deserializes the value at `path`; see [`Partial::extract`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`] naming the failing field.
    pub fn extract<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.partial().extract(self.path(path))
    }
}

/// One background polling pass. Stops the trigger once the manager is gone.
fn poll(inner: &Weak<Mutex<Inner>>) -> Result<()> {
    let inner = inner.upgrade().ok_or(Error::Closed)?;
    inner.lock().reload();
    Ok(())
}

impl Drop for ConfigManager {
    fn drop(&mut self) {
        self.stop_trigger();
    }
}

impl Debug for ConfigManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ConfigManager")
            .field("suppliers", &inner.registry.entries())
            .field("observers", &inner.observers.len())
            .field("epoch", &inner.epoch)
            .field("options", &self.options)
            .finish()
    }
}
