//! One-shot stop broadcast for worker threads.
//!
//! [`StopSignal`] closes a crossbeam channel exactly once. Every thread that
//! includes [`StopSignal::listener`] in a `crossbeam_channel::select!` wakes
//! on the next scheduling opportunity after [`StopSignal::fire`], with no
//! polling. Firing is guarded by `parking_lot::Once`, so concurrent callers
//! race safely and the close runs a single time.
//!
//! ```
//! use prometheus_taskflow::core::StopSignal;
//!
//! let signal = StopSignal::new();
//! assert!(signal.fire());
//! assert!(!signal.fire());
//! assert!(signal.is_fired());
//! ```

use std::fmt;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::{Mutex, Once};

/// Irrevocable broadcast "stop" event shared by a batch's workers.
pub struct StopSignal {
    once: Once,
    /// Only sender of the channel. Dropping it disconnects every listener.
    trigger: Mutex<Option<Sender<()>>>,
    listener: Receiver<()>,
}

impl StopSignal {
    /// Create an unfired signal.
    #[must_use]
    pub fn new() -> Self {
        let (trigger, listener) = bounded(0);
        Self {
            once: Once::new(),
            trigger: Mutex::new(Some(trigger)),
            listener,
        }
    }

    /// Fire the signal.
    ///
    /// Returns `true` only for the call that actually fired it.
    pub fn fire(&self) -> bool {
        let mut fired = false;
        self.once.call_once(|| {
            drop(self.trigger.lock().take());
            fired = true;
        });
        fired
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.once.state().done()
    }

    /// Receiver that becomes ready (disconnected) once the signal fires.
    ///
    /// Intended for `recv(signal.listener())` arms of `crossbeam_channel::select!`.
    #[must_use]
    pub const fn listener(&self) -> &Receiver<()> {
        &self.listener
    }

    /// Block the current thread until the signal fires.
    pub fn wait(&self) {
        // Nothing is ever sent; recv only returns once the trigger is dropped.
        let _ = self.listener.recv();
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSignal")
            .field("fired", &self.is_fired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_signal_starts_unfired() {
        let signal = StopSignal::new();
        assert!(!signal.is_fired());
        assert!(signal.listener().try_recv().is_err());
    }

    #[test]
    fn test_fire_is_idempotent() {
        let signal = StopSignal::new();
        assert!(signal.fire());
        assert!(!signal.fire());
        assert!(!signal.fire());
        assert!(signal.is_fired());
    }

    /// Ten threads race to fire; exactly one wins.
    #[test]
    fn test_fire_concurrent_single_winner() {
        let signal = Arc::new(StopSignal::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..10 {
            let signal = Arc::clone(&signal);
            let winners = Arc::clone(&winners);
            handles.push(thread::spawn(move || {
                if signal.fire() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(signal.is_fired());
    }

    #[test]
    fn test_waiters_wake_on_fire() {
        let signal = Arc::new(StopSignal::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let signal = Arc::clone(&signal);
            handles.push(thread::spawn(move || signal.wait()));
        }

        thread::sleep(Duration::from_millis(20));
        signal.fire();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
