use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source for the sampling loop.
///
/// Every blocking wait in the firmware (the tick pacing sleep and the
/// inter-sample delay while calibrating) goes through `sleep`, so a manual
/// clock can drive the whole pipeline without wall-clock time passing.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let ms = self.now().saturating_duration_since(epoch).as_millis();
        u64::try_from(ms).unwrap_or(u64::MAX)
    }
}

/// Wall-clock implementation backed by `std::time::Instant`.
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
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-clock"))]
mod manual {
    use super::Clock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant};

    /// Clock whose time only moves when told to.
    ///
    /// Clones share the same timeline, so a test can keep a handle while the
    /// firmware owns another. `sleep(d)` advances by `d` and returns at once.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        origin: Instant,
        elapsed_us: Arc<AtomicU64>,
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
                elapsed_us: Arc::new(AtomicU64::new(0)),
            }
        }

        pub fn advance(&self, d: Duration) {
            let us = u64::try_from(d.as_micros()).unwrap_or(u64::MAX);
            self.elapsed_us.fetch_add(us, Ordering::Relaxed);
        }

        pub fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }

        /// Total time advanced so far.
        pub fn elapsed(&self) -> Duration {
            Duration::from_micros(self.elapsed_us.load(Ordering::Relaxed))
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_sleep_advances_shared_timeline() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let epoch = clock.now();
        clock.sleep(Duration::from_millis(20));
        handle.advance_ms(5);
        assert_eq!(clock.ms_since(epoch), 25);
        assert_eq!(handle.elapsed(), Duration::from_millis(25));
    }

    #[test]
    fn ms_since_saturates_for_future_epoch() {
        let clock = ManualClock::new();
        let future = clock.now() + Duration::from_secs(1);
        assert_eq!(clock.ms_since(future), 0);
    }
}
