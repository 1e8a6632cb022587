use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Poll `is_high` until the line reads low or `timeout` expires.
/// Sleeps `poll_interval` between polls so the wait does not spin a core.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Sign-extend a 24-bit two's complement conversion into an `i32`.
#[inline]
pub fn sign_extend_24(raw: u32) -> i32 {
    ((raw << 8) as i32) >> 8
}
