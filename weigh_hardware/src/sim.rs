//! Simulated collaborators: a load cell whose reading is set from outside
//! and an in-memory serial link. Both hand out cloneable handles so a test
//! (or the CLI) can steer them while the firmware owns the device itself.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use weigh_traits::{BoxError, LoadCell, SerialLink};

use crate::error::HwError;

/// Load cell returning a settable raw value plus optional bounded noise.
#[derive(Debug, Clone)]
pub struct SimulatedLoadCell {
    raw: Arc<AtomicI32>,
    noise_amp: i32,
    rng: Arc<AtomicU32>,
}

impl Default for SimulatedLoadCell {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SimulatedLoadCell {
    pub fn new(raw: i32) -> Self {
        Self {
            raw: Arc::new(AtomicI32::new(raw)),
            noise_amp: 0,
            rng: Arc::new(AtomicU32::new(0x2545_F491)),
        }
    }

    /// Add uniform noise in `[-amp, +amp]` raw counts to every reading.
    pub fn with_noise(mut self, amp: i32) -> Self {
        self.noise_amp = amp.max(0);
        self
    }

    pub fn set_raw(&self, raw: i32) {
        self.raw.store(raw, Ordering::Relaxed);
    }

    pub fn raw(&self) -> i32 {
        self.raw.load(Ordering::Relaxed)
    }

    fn next_noise(&self) -> i32 {
        if self.noise_amp == 0 {
            return 0;
        }
        // xorshift32
        let mut x = self.rng.load(Ordering::Relaxed);
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng.store(x, Ordering::Relaxed);
        let span = (self.noise_amp as u32) * 2 + 1;
        (x % span) as i32 - self.noise_amp
    }
}

impl LoadCell for SimulatedLoadCell {
    fn read_raw(&mut self, _timeout: Duration) -> Result<i32, BoxError> {
        let raw = self.raw().saturating_add(self.next_noise());
        tracing::trace!(raw, "simulated load cell sample");
        Ok(raw)
    }
}

#[derive(Debug, Default)]
struct LinkState {
    inbound: VecDeque<u8>,
    outbound: Vec<String>,
    closed: bool,
}

/// In-memory serial link. Clones share the same buffers.
#[derive(Debug, Clone, Default)]
pub struct MemoryLink {
    state: Arc<Mutex<LinkState>>,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LinkState> {
        // A poisoned buffer is still a usable buffer.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Queue bytes as if the host had sent them.
    pub fn send(&self, text: &str) {
        self.send_bytes(text.as_bytes());
    }

    pub fn send_bytes(&self, bytes: &[u8]) {
        self.lock().inbound.extend(bytes.iter().copied());
    }

    /// Lines written by the firmware since the last call.
    pub fn take_lines(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().outbound)
    }

    pub fn pending_inbound(&self) -> usize {
        self.lock().inbound.len()
    }

    /// Make every subsequent write fail.
    pub fn close(&self) {
        self.lock().closed = true;
    }
}

impl SerialLink for MemoryLink {
    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        let mut st = self.lock();
        if st.closed {
            return Err(Box::new(HwError::LinkClosed));
        }
        st.outbound.push(line.to_string());
        Ok(())
    }

    fn try_read_byte(&mut self) -> Result<Option<u8>, BoxError> {
        Ok(self.lock().inbound.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_cell_follows_handle() {
        let cell = SimulatedLoadCell::new(100);
        let handle = cell.clone();
        let mut dev = cell;
        assert_eq!(dev.read_raw(Duration::from_millis(1)).unwrap(), 100);
        handle.set_raw(-42);
        assert_eq!(dev.read_raw(Duration::from_millis(1)).unwrap(), -42);
    }

    #[test]
    fn noise_stays_within_amplitude() {
        let mut cell = SimulatedLoadCell::new(1000).with_noise(3);
        for _ in 0..500 {
            let v = cell.read_raw(Duration::ZERO).unwrap();
            assert!((997..=1003).contains(&v), "out of band: {v}");
        }
    }

    #[test]
    fn memory_link_round_trips_bytes_and_lines() {
        let link = MemoryLink::new();
        let mut dev = link.clone();
        link.send("T\n");
        assert_eq!(dev.try_read_byte().unwrap(), Some(b'T'));
        assert_eq!(dev.try_read_byte().unwrap(), Some(b'\n'));
        assert_eq!(dev.try_read_byte().unwrap(), None);

        dev.write_line("ACK:T").unwrap();
        assert_eq!(link.take_lines(), vec!["ACK:T".to_string()]);
        assert!(link.take_lines().is_empty());

        link.close();
        assert!(dev.write_line("G:0.00,S:0").is_err());
    }
}
