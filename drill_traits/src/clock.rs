//! Time source for the drill controller.
//!
//! The controller captures an epoch `Instant` when it is built and measures
//! everything as a millisecond tick count from it: button press durations,
//! the debounce guard, the knob poll cadence, state timers and the error
//! flash deadline. The scheduler paces its loop with `sleep`.

use std::thread;
use std::time::{Duration, Instant};

/// Millisecond tick source for the controller and its scheduler.
///
/// Ticks never go backwards. `ms_since` truncates to whole milliseconds, so
/// two reads inside the same millisecond give the same tick.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        dur.as_millis() as u64
    }
}

/// Wall-time clock for `drill run` and `drill self-check`. Loop pacing
/// blocks the thread for the configured loop interval.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "manual-clock"))]
pub mod manual {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Virtual clock for `drill simulate` and the tests.
    ///
    /// Time only moves through `advance`, `set_offset` or `sleep`. The
    /// scheduler's idle `sleep` therefore steps the controller exactly one
    /// loop interval per iteration, which makes poll counts, hold durations
    /// and flash expiry reproducible.
    ///
    /// Clones share the same offset, so a test can keep a handle while the
    /// controller owns another.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Advance the clock by `ms` milliseconds.
        pub fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }

        /// Set the absolute offset relative to origin.
        pub fn set_offset(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = d;
            }
        }

        /// Current offset from origin in milliseconds.
        pub fn elapsed_ms(&self) -> u64 {
            self.offset
                .lock()
                .map(|g| g.as_millis() as u64)
                .unwrap_or(0)
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::manual::ManualClock;
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        let epoch = clock.now();
        assert_eq!(clock.ms_since(epoch), 0);
        clock.advance_ms(15);
        assert_eq!(clock.ms_since(epoch), 15);
        clock.sleep(Duration::from_millis(5));
        assert_eq!(clock.ms_since(epoch), 20);
    }

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let epoch = a.now();
        b.advance_ms(42);
        assert_eq!(a.ms_since(epoch), 42);
        assert_eq!(a.elapsed_ms(), 42);
    }

    #[test]
    fn ms_since_saturates_for_future_epoch() {
        let clock = ManualClock::new();
        let later = clock.now() + Duration::from_secs(1);
        assert_eq!(clock.ms_since(later), 0);
    }
}
