//! Type-state builder for `DynFirmware` and generic `build_firmware` constructor.
//!
//! The builder enforces at compile time that LoadCell, store and link are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use weigh_traits::clock::{Clock, MonotonicClock};
use weigh_traits::{KvStore, LoadCell, SerialLink};

use crate::calibration::CalibrationStore;
use crate::config::*;
use crate::deadband::OutputDeadband;
use crate::error::{BuildError, Result};
use crate::filter::{IirSmoother, MedianFilter};
use crate::firmware::Firmware;
use crate::protocol::LineAssembler;
use crate::stability::StabilityDetector;

/// Largest median or deviation window accepted.
pub const MAX_WINDOW: usize = weigh_config::MAX_WINDOW;

/// Firmware over boxed collaborators, as produced by `FirmwareBuilder`.
pub type DynFirmware = Firmware<Box<dyn LoadCell>, Box<dyn KvStore>, Box<dyn SerialLink>>;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `DynFirmware`. All settings are validated on `build()`.
pub struct FirmwareBuilder<L, P, S> {
    load_cell: Option<Box<dyn LoadCell>>,
    store: Option<Box<dyn KvStore>>,
    link: Option<Box<dyn SerialLink>>,
    cfg: FirmwareCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _l: PhantomData<L>,
    _p: PhantomData<P>,
    _s: PhantomData<S>,
}

impl Default for FirmwareBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            load_cell: None,
            store: None,
            link: None,
            cfg: FirmwareCfg::default(),
            clock: None,
            _l: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

impl DynFirmware {
    /// Start building a firmware instance.
    pub fn builder() -> FirmwareBuilder<Missing, Missing, Missing> {
        FirmwareBuilder::default()
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(cfg: &FirmwareCfg) -> Result<()> {
    let f = &cfg.filter;
    if !(1..=MAX_WINDOW).contains(&f.median_window) {
        return Err(invalid("median_window must be in [1, 255]"));
    }
    if !(f.iir_alpha.is_finite() && f.iir_alpha > 0.0 && f.iir_alpha <= 1.0) {
        return Err(invalid("iir_alpha must be in (0.0, 1.0]"));
    }
    if f.sample_rate_hz == 0 {
        return Err(invalid("sample_rate_hz must be > 0"));
    }

    let s = &cfg.stability;
    if !s.delta_g.is_finite() || s.delta_g.is_sign_negative() {
        return Err(invalid("delta_g must be finite and >= 0"));
    }
    if let Some(gate) = s.stddev {
        if !(1..=MAX_WINDOW).contains(&gate.window) {
            return Err(invalid("stddev window must be in [1, 255]"));
        }
        if !gate.threshold_g.is_finite() || gate.threshold_g.is_sign_negative() {
            return Err(invalid("stddev threshold must be finite and >= 0"));
        }
    }

    let d = &cfg.deadband;
    if !d.threshold_g.is_finite() || d.threshold_g.is_sign_negative() {
        return Err(invalid("deadband threshold must be finite and >= 0"));
    }

    let p = &cfg.protocol;
    if p.max_line_len == 0 {
        return Err(invalid("max_line_len must be >= 1"));
    }
    if p.calibration_samples == 0 {
        return Err(invalid("calibration_samples must be >= 1"));
    }
    if p.banner.contains(['\r', '\n']) {
        return Err(invalid("banner must be a single line"));
    }

    if cfg.timeouts.sensor_ms == 0 {
        return Err(invalid("sensor_ms must be >= 1"));
    }
    Ok(())
}

/// Validate configuration and assemble the pipeline.
///
/// Shared by `FirmwareBuilder::try_build()` and `build_firmware()`.
fn validate_and_build<L: LoadCell, P: KvStore, S: SerialLink>(
    load_cell: L,
    store: P,
    link: S,
    cfg: FirmwareCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Firmware<L, P, S>> {
    validate(&cfg)?;

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();

    let period = crate::util::tick_period(cfg.filter.sample_rate_hz);

    Ok(Firmware {
        load_cell,
        link,
        calibration: CalibrationStore::new(store),
        median: MedianFilter::new(cfg.filter.median_window),
        iir: IirSmoother::new(cfg.filter.iir_alpha),
        stability: StabilityDetector::new(&cfg.stability, 0),
        deadband: OutputDeadband::new(&cfg.deadband),
        assembler: LineAssembler::new(cfg.protocol.max_line_len),
        sensor_timeout: Duration::from_millis(cfg.timeouts.sensor_ms),
        cfg,
        clock,
        epoch,
        period,
        last_raw: 0,
        ticks: 0,
    })
}

impl<L, P, S> FirmwareBuilder<L, P, S> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<DynFirmware> {
        let load_cell = self
            .load_cell
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLoadCell))?;
        let store = self
            .store
            .ok_or_else(|| eyre::Report::new(BuildError::MissingStore))?;
        let link = self
            .link
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLink))?;
        validate_and_build(load_cell, store, link, self.cfg, self.clock)
    }
}

/// Chainable setters that do not affect type-state.
impl<L, P, S> FirmwareBuilder<L, P, S> {
    pub fn with_config(mut self, cfg: FirmwareCfg) -> Self {
        self.cfg = cfg;
        self
    }
    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.cfg.filter = filter;
        self
    }
    pub fn with_stability(mut self, stability: StabilityCfg) -> Self {
        self.cfg.stability = stability;
        self
    }
    pub fn with_deadband(mut self, deadband: DeadbandCfg) -> Self {
        self.cfg.deadband = deadband;
        self
    }
    pub fn with_protocol(mut self, protocol: ProtocolCfg) -> Self {
        self.cfg.protocol = protocol;
        self
    }
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.cfg.timeouts = timeouts;
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<P, S> FirmwareBuilder<Missing, P, S> {
    pub fn with_load_cell(self, load_cell: impl LoadCell + 'static) -> FirmwareBuilder<Set, P, S> {
        FirmwareBuilder {
            load_cell: Some(Box::new(load_cell)),
            store: self.store,
            link: self.link,
            cfg: self.cfg,
            clock: self.clock,
            _l: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<L, S> FirmwareBuilder<L, Missing, S> {
    pub fn with_store(self, store: impl KvStore + 'static) -> FirmwareBuilder<L, Set, S> {
        FirmwareBuilder {
            load_cell: self.load_cell,
            store: Some(Box::new(store)),
            link: self.link,
            cfg: self.cfg,
            clock: self.clock,
            _l: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

impl<L, P> FirmwareBuilder<L, P, Missing> {
    pub fn with_link(self, link: impl SerialLink + 'static) -> FirmwareBuilder<L, P, Set> {
        FirmwareBuilder {
            load_cell: self.load_cell,
            store: self.store,
            link: Some(Box::new(link)),
            cfg: self.cfg,
            clock: self.clock,
            _l: PhantomData,
            _p: PhantomData,
            _s: PhantomData,
        }
    }
}

impl FirmwareBuilder<Set, Set, Set> {
    /// Validate and build. Only available when all three collaborators are set.
    pub fn build(self) -> Result<DynFirmware> {
        self.try_build()
    }
}

/// Build a statically-dispatched `Firmware` from concrete collaborators.
///
/// Delegates to the shared `validate_and_build`.
pub fn build_firmware<L, P, S>(
    load_cell: L,
    store: P,
    link: S,
    cfg: FirmwareCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Firmware<L, P, S>>
where
    L: LoadCell,
    P: KvStore,
    S: SerialLink,
{
    validate_and_build(load_cell, store, link, cfg, clock)
}
