//! Tick pacing.

use std::time::Duration;

const MILLIS_PER_SEC: u64 = 1_000;

/// Tick period for a sample rate: whole milliseconds, never below 1 ms.
///
/// A rate of 0 is treated as 1 Hz.
#[inline]
pub fn tick_period(sample_rate_hz: u32) -> Duration {
    Duration::from_millis((MILLIS_PER_SEC / u64::from(sample_rate_hz.max(1))).max(1))
}

/// Time left in the current tick, zero when the tick overran.
#[inline]
pub fn remaining(period: Duration, spent: Duration) -> Duration {
    period.saturating_sub(spent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_hz_is_twenty_ms() {
        assert_eq!(tick_period(50), Duration::from_millis(20));
    }

    #[test]
    fn rates_clamp_to_one_ms_and_one_hz() {
        assert_eq!(tick_period(5_000), Duration::from_millis(1));
        assert_eq!(tick_period(0), Duration::from_secs(1));
        // 1000 / 3 truncates
        assert_eq!(tick_period(3), Duration::from_millis(333));
    }

    #[test]
    fn overrun_leaves_nothing() {
        let p = Duration::from_millis(20);
        assert_eq!(remaining(p, Duration::from_millis(5)), Duration::from_millis(15));
        assert_eq!(remaining(p, Duration::from_millis(30)), Duration::ZERO);
    }
}
