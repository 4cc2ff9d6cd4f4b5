use std::time::Duration;

use crossbeam_channel::{select, tick};
use tracing::{debug, warn};

use super::{Trigger, Worker, check_delay};
use crate::Result;

/// Runs a callback every delay until closed.
///
/// A callback error stops the trigger permanently; the failing run is not
/// retried. Runs never overlap: a run that outlasts the delay delays the
/// next one, and missed ticks are dropped.
pub struct Recurring {
    delay: Duration,
    worker: Worker,
}

impl Recurring {
    /// Starts running `callback` every `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Trigger`](crate::Error::Trigger) for a zero delay or
    /// if the background thread cannot be spawned.
    pub fn start<F>(delay: Duration, mut callback: F) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        check_delay(delay)?;

        let worker = Worker::spawn("confkit-recurring", move |signals| {
            let ticker = tick(delay);

            loop {
                select! {
                    recv(ticker) -> _ => {
                        if signals.is_closed() {
                            break;
                        }
                        if let Err(error) = callback() {
                            warn!(%error, "recurring trigger stopped by callback error");
                            break;
                        }
                    }
                    recv(signals.stop()) -> _ => break,
                }
            }

            debug!(?delay, "recurring trigger finished");
        })?;

        Ok(Self { delay, worker })
    }

    /// Returns `true` until the trigger is closed or stops itself.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }
}

impl Trigger for Recurring {
    fn delay(&self) -> Duration {
        self.delay
    }

    fn close(&mut self) -> Result<()> {
        self.worker.stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_runs_repeatedly_until_closed() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let mut trigger = Recurring::start(Duration::from_millis(5), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        thread::sleep(Duration::from_millis(200));
        trigger.close().unwrap();
        let after_close = count.load(Ordering::SeqCst);
        assert!(after_close >= 2, "ran {after_close} times");

        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), after_close);
        assert!(!trigger.is_running());
    }

    #[test]
    fn test_error_stops_permanently() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let mut trigger = Recurring::start(Duration::from_millis(5), move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Err(Error::invalid_supplier("boom"))
        })
        .unwrap();

        thread::sleep(Duration::from_millis(200));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!trigger.is_running());

        trigger.close().unwrap();
        trigger.close().unwrap();
    }

    #[test]
    fn test_zero_delay_rejected() {
        let err = Recurring::start(Duration::ZERO, || Ok(())).err().unwrap();
        assert!(matches!(err, Error::Trigger { .. }));
    }
}
