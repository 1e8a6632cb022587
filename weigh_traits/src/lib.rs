//! Collaborator seams for the scale firmware.
//!
//! The core never touches GPIO, UARTs or flash directly; it talks to these
//! traits. Errors cross the boundary boxed so adapters can surface whatever
//! their driver produces.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

#[cfg(any(test, feature = "test-clock"))]
pub use clock::ManualClock;

use std::time::Duration;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Load-cell amplifier delivering one signed 24-bit conversion per call.
pub trait LoadCell {
    fn read_raw(&mut self, timeout: Duration) -> Result<i32, BoxError>;
}

/// Namespaced key/value persistence (float and integer slots).
///
/// Reads fall back to `default` when the key is absent or unreadable.
pub trait KvStore {
    fn get_f32(&self, key: &str, default: f32) -> f32;
    fn put_f32(&mut self, key: &str, value: f32) -> Result<(), BoxError>;
    fn get_i32(&self, key: &str, default: i32) -> i32;
    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), BoxError>;
}

/// Line-oriented serial transport to the host.
pub trait SerialLink {
    /// Write `line` followed by a newline.
    fn write_line(&mut self, line: &str) -> Result<(), BoxError>;
    /// Next byte already received, or `None` without waiting.
    fn try_read_byte(&mut self) -> Result<Option<u8>, BoxError>;
}

impl<T: LoadCell + ?Sized> LoadCell for Box<T> {
    fn read_raw(&mut self, timeout: Duration) -> Result<i32, BoxError> {
        (**self).read_raw(timeout)
    }
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get_f32(&self, key: &str, default: f32) -> f32 {
        (**self).get_f32(key, default)
    }
    fn put_f32(&mut self, key: &str, value: f32) -> Result<(), BoxError> {
        (**self).put_f32(key, value)
    }
    fn get_i32(&self, key: &str, default: i32) -> i32 {
        (**self).get_i32(key, default)
    }
    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), BoxError> {
        (**self).put_i32(key, value)
    }
}

impl<T: SerialLink + ?Sized> SerialLink for Box<T> {
    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        (**self).write_line(line)
    }
    fn try_read_byte(&mut self) -> Result<Option<u8>, BoxError> {
        (**self).try_read_byte()
    }
}
