//! Runtime configuration for the firmware pipeline.
//!
//! These are separate from the TOML schema in `weigh_config`; see
//! `conversions` for the mapping.

/// Median + IIR filter settings.
#[derive(Debug, Clone)]
pub struct FilterCfg {
    /// Raw median window; odd sizes give an exact median.
    pub median_window: usize,
    /// IIR weight of the newest value, in (0.0, 1.0]. 1.0 disables smoothing.
    pub iir_alpha: f32,
    /// Tick rate; drives the loop period.
    pub sample_rate_hz: u32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            median_window: 21,
            iir_alpha: 0.08,
            sample_rate_hz: 50,
        }
    }
}

/// Rolling standard-deviation gate for stability.
#[derive(Debug, Clone, Copy)]
pub struct StddevGate {
    /// Smoothed-grams samples kept for the deviation.
    pub window: usize,
    /// Maximum population standard deviation, grams.
    pub threshold_g: f32,
}

#[derive(Debug, Clone)]
pub struct StabilityCfg {
    /// Allowed drift from the reference value, grams.
    pub delta_g: f32,
    /// The condition must hold this long before the reading is stable.
    pub hold_ms: u64,
    /// `None` disables the deviation test.
    pub stddev: Option<StddevGate>,
}

impl Default for StabilityCfg {
    fn default() -> Self {
        Self {
            delta_g: 3.0,
            hold_ms: 1500,
            stddev: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeadbandCfg {
    pub enabled: bool,
    pub threshold_g: f32,
}

impl Default for DeadbandCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_g: 0.20,
        }
    }
}

/// Command protocol limits and calibration sampling.
#[derive(Debug, Clone)]
pub struct ProtocolCfg {
    pub max_line_len: usize,
    pub calibration_samples: u32,
    pub calibration_delay_ms: u64,
    pub banner: String,
}

impl Default for ProtocolCfg {
    fn default() -> Self {
        Self {
            max_line_len: 80,
            calibration_samples: 20,
            calibration_delay_ms: 5,
            banner: "HELLO:ESP32-HX711".to_string(),
        }
    }
}

/// Timeouts and watchdogs.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max sensor wait per read (ms).
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 150 }
    }
}

/// Everything the firmware needs besides its collaborators.
#[derive(Debug, Clone, Default)]
pub struct FirmwareCfg {
    pub filter: FilterCfg,
    pub stability: StabilityCfg,
    pub deadband: DeadbandCfg,
    pub protocol: ProtocolCfg,
    pub timeouts: Timeouts,
}
