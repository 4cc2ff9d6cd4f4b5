//! Background timers driving hot reload.
//!
//! Each trigger owns one named background thread. The thread waits on a
//! crossbeam timer channel and a stop channel; closing the trigger drops the
//! stop sender, which wakes the thread and ends it.
//!
//! - [`Pulse`] runs a callback once after its delay.
//! - [`Recurring`] runs a callback every delay until closed, or until the
//!   callback returns an error.

mod pulse;
mod recurring;

pub use pulse::Pulse;
pub use recurring::Recurring;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{trace, warn};

use crate::{Error, Result};

/// A timer running a callback on its own background thread.
pub trait Trigger: Send {
    /// The delay before (or between) callback runs.
    fn delay(&self) -> Duration;

    /// Stops future callback runs. A run already in progress completes.
    ///
    /// Closing is idempotent, and safe after the trigger stopped itself.
    ///
    /// # Errors
    ///
    /// The built-in triggers always succeed.
    fn close(&mut self) -> Result<()>;
}

/// Signals shared with the background thread.
#[derive(Clone)]
pub(crate) struct Signals {
    stop: Receiver<()>,
    closed: Arc<AtomicBool>,
}

impl Signals {
    /// Wakes when the owning trigger is closed.
    pub(crate) const fn stop(&self) -> &Receiver<()> {
        &self.stop
    }

    /// Returns `true` once the owning trigger has been closed.
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// An owned background thread with its stop channel.
pub(crate) struct Worker {
    stop: Option<Sender<()>>,
    closed: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns `body` on a thread called `name`.
    pub(crate) fn spawn<F>(name: &str, body: F) -> Result<Self>
    where
        F: FnOnce(Signals) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let closed = Arc::new(AtomicBool::new(false));
        let signals = Signals {
            stop: stop_rx,
            closed: Arc::clone(&closed),
        };

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(signals))
            .map_err(|source| Error::Trigger {
                message: format!("failed to spawn {name} thread"),
                source,
            })?;

        trace!(thread = name, "trigger started");
        Ok(Self {
            stop: Some(stop_tx),
            closed,
            handle: Some(handle),
        })
    }

    /// Returns `true` while the background thread is alive.
    pub(crate) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread to stop and waits for it, unless called from the
    /// thread itself.
    pub(crate) fn stop(&mut self) {
        self.closed.store(true, Ordering::Release);
        drop(self.stop.take());

        let Some(handle) = self.handle.take() else {
            return;
        };

        if handle.thread().id() == thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            warn!("trigger thread panicked");
        } else {
            trace!("trigger stopped");
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Rejects a zero delay, which would spin the timer.
pub(crate) fn check_delay(delay: Duration) -> Result<()> {
    if delay.is_zero() {
        return Err(Error::Trigger {
            message: "trigger delay must be non-zero".to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "zero delay"),
        });
    }

    Ok(())
}
