use std::time::Duration;

use crossbeam_channel::{after, select};
use tracing::trace;

use super::{Trigger, Worker};
use crate::Result;

/// Runs a callback once, after a delay.
///
/// Closing the pulse before the delay elapses prevents the callback from
/// ever running.
///
/// ```rust
/// use std::sync::mpsc;
/// use std::time::Duration;
/// use confkit::trigger::Pulse;
///
/// let (tx, rx) = mpsc::channel();
/// let _pulse = Pulse::start(Duration::from_millis(10), move || {
///     let _ = tx.send("fired");
/// })?;
/// assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("fired"));
/// # Ok::<(), confkit::Error>(())
/// ```
pub struct Pulse {
    delay: Duration,
    worker: Worker,
}

impl Pulse {
    /// Schedules `callback` to run once after `delay`.
    ///
    /// A zero delay runs the callback as soon as the thread starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Trigger`](crate::Error::Trigger) if the background
    /// thread cannot be spawned.
    pub fn start<F>(delay: Duration, callback: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let worker = Worker::spawn("confkit-pulse", move |signals| {
            let timer = after(delay);

            select! {
                recv(timer) -> _ => {
                    if signals.is_closed() {
                        return;
                    }
                    trace!(?delay, "pulse fired");
                    callback();
                }
                recv(signals.stop()) -> _ => {}
            }
        })?;

        Ok(Self { delay, worker })
    }

    /// Returns `true` until the callback has run or the pulse was closed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.worker.is_running()
    }
}

impl Trigger for Pulse {
    fn delay(&self) -> Duration {
        self.delay
    }

    fn close(&mut self) -> Result<()> {
        self.worker.stop();
        Ok(())
    }
}
