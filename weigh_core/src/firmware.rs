//! The tick loop tying sensor, filters, stability and the command protocol
//! together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use weigh_traits::{Clock, KvStore, LoadCell, SerialLink};

use crate::calibration::{Calibration, CalibrationStore};
use crate::config::FirmwareCfg;
use crate::deadband::OutputDeadband;
use crate::error::CommandError;
use crate::filter::{IirSmoother, MedianFilter};
use crate::hw_error::map_hw_error;
use crate::protocol::{Command, LineAssembler, LineEvent, Response};
use crate::report::Report;
use crate::stability::StabilityDetector;
use crate::util::remaining;

/// Below this many raw samples the median is skipped and the raw reading is
/// converted directly.
pub const MEDIAN_MIN_SAMPLES: usize = 3;

/// Single-threaded scale firmware.
///
/// Owns every piece of state. `tick()` runs one iteration: sample, filter,
/// decide stability, emit one report line, then service any pending host
/// commands.
pub struct Firmware<L: LoadCell, P: KvStore, S: SerialLink> {
    pub(crate) load_cell: L,
    pub(crate) link: S,
    pub(crate) calibration: CalibrationStore<P>,
    pub(crate) median: MedianFilter,
    pub(crate) iir: IirSmoother,
    pub(crate) stability: StabilityDetector,
    pub(crate) deadband: OutputDeadband,
    pub(crate) assembler: LineAssembler,
    pub(crate) cfg: FirmwareCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) period: Duration,
    pub(crate) sensor_timeout: Duration,
    pub(crate) last_raw: i32,
    pub(crate) ticks: u64,
}

impl<L: LoadCell, P: KvStore, S: SerialLink> core::fmt::Debug for Firmware<L, P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Firmware")
            .field("calibration", &self.calibration.current())
            .field("last_raw", &self.last_raw)
            .field("stable", &self.stability.is_stable())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl<L: LoadCell, P: KvStore, S: SerialLink> Firmware<L, P, S> {
    /// Load persisted calibration and greet the host.
    pub fn boot(&mut self) {
        self.calibration.load();
        let banner = self.cfg.protocol.banner.clone();
        self.send(&banner);
        tracing::info!(
            median_window = self.cfg.filter.median_window,
            sample_rate_hz = self.cfg.filter.sample_rate_hz,
            "firmware booted"
        );
    }

    /// One loop iteration. Never fails: sensor and link faults are logged
    /// and the loop carries on.
    pub fn tick(&mut self) -> Report {
        let raw = self.acquire();
        self.median.add(raw);

        let cal = self.calibration.current();
        let median = if self.median.len() >= MEDIAN_MIN_SAMPLES {
            self.median.median()
        } else {
            None
        };
        let grams = match median {
            Some(m) => self.iir.update(cal.to_grams(m)),
            None => cal.to_grams(raw),
        };

        let now_ms = self.clock.ms_since(self.epoch);
        let stable = self.stability.update(grams, now_ms);
        let out = self.deadband.apply(grams, stable);

        let report = Report {
            grams: out,
            stable,
        };
        tracing::trace!(raw, grams, out, stable, "tick");
        self.send(&report.to_string());

        self.poll_commands();
        self.ticks += 1;
        report
    }

    /// Tick until `shutdown` is set or `max_ticks` have run, pacing each
    /// iteration to the configured sample rate. Returns the ticks run.
    pub fn run(&mut self, shutdown: &AtomicBool, max_ticks: Option<u64>) -> u64 {
        let mut n = 0u64;
        while !shutdown.load(Ordering::Relaxed) {
            if max_ticks.is_some_and(|max| n >= max) {
                break;
            }
            let started = self.clock.now();
            self.tick();
            n += 1;
            let spent = self.clock.now().saturating_duration_since(started);
            let rest = remaining(self.period, spent);
            if !rest.is_zero() {
                self.clock.sleep(rest);
            }
        }
        tracing::info!(ticks = n, "loop stopped");
        n
    }

    /// Feed every byte the link has ready through the line assembler and
    /// answer each completed line.
    pub fn poll_commands(&mut self) {
        loop {
            let byte = match self.link.try_read_byte() {
                Ok(Some(b)) => b,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %map_hw_error(e.as_ref()), "serial read failed");
                    break;
                }
            };
            match self.assembler.feed(byte) {
                Some(LineEvent::Line(line)) => {
                    let resp = self.handle_line(&line);
                    self.send(&resp.to_string());
                }
                Some(LineEvent::Overflow) => {
                    tracing::debug!("command line too long");
                    self.send(&Response::from(CommandError::LineTooLong).to_string());
                }
                None => {}
            }
        }
    }

    /// Parse and execute one command line.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match Command::parse(line) {
            Ok(Command::Tare) => self.tare(),
            Ok(Command::Calibrate(weight_g)) => match self.calibrate(weight_g) {
                Ok(factor) => Response::AckCalibrate(factor),
                Err(e) => e.into(),
            },
            Err(e) => {
                tracing::debug!(line, code = %e, "command rejected");
                e.into()
            }
        }
    }

    /// Take one raw reading as the new zero point.
    pub fn tare(&mut self) -> Response {
        let raw = self.acquire();
        if let Err(e) = self.calibration.tare(raw) {
            tracing::error!(error = %e, tare_offset = raw, "persisting tare failed");
        }
        Response::AckTare
    }

    /// Average raw readings against `weight_g` and store the resulting
    /// factor. Returns the new factor.
    pub fn calibrate(&mut self, weight_g: f32) -> Result<f32, CommandError> {
        if !(weight_g.is_finite() && weight_g > 0.0) {
            return Err(CommandError::CalWeight);
        }
        let n = self.cfg.protocol.calibration_samples.max(1);
        let delay = Duration::from_millis(self.cfg.protocol.calibration_delay_ms);
        let mut acc: i64 = 0;
        for _ in 0..n {
            acc += i64::from(self.acquire());
            self.clock.sleep(delay);
        }
        // Mean of i32 samples always fits back into i32.
        let mean = (acc / i64::from(n)) as i32;
        let net = mean.saturating_sub(self.calibration.current().tare_offset);
        let Some(factor) = Calibration::factor_for(weight_g, net) else {
            tracing::debug!(mean, "calibration rejected: zero net reading");
            return Err(CommandError::CalZero);
        };
        if let Err(e) = self.calibration.set_factor(factor) {
            tracing::error!(error = %e, cal_factor = factor, "persisting calibration failed");
        }
        Ok(factor)
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration.current()
    }

    pub fn is_stable(&self) -> bool {
        self.stability.is_stable()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &FirmwareCfg {
        &self.cfg
    }

    pub fn link(&self) -> &S {
        &self.link
    }

    pub fn store(&self) -> &P {
        self.calibration.store()
    }

    /// Current IIR state in grams, `None` until the median has kicked in.
    pub fn smoothed_grams(&self) -> Option<f32> {
        self.iir.value()
    }

    /// One raw sample. On failure the previous good sample is reused.
    fn acquire(&mut self) -> i32 {
        match self.load_cell.read_raw(self.sensor_timeout) {
            Ok(raw) => {
                self.last_raw = raw;
                raw
            }
            Err(e) => {
                tracing::warn!(
                    error = %map_hw_error(e.as_ref()),
                    reused = self.last_raw,
                    "sensor read failed"
                );
                self.last_raw
            }
        }
    }

    fn send(&mut self, line: &str) {
        if let Err(e) = self.link.write_line(line) {
            tracing::warn!(error = %map_hw_error(e.as_ref()), "serial write failed");
        }
    }
}
