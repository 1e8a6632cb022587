#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the scale firmware.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Every section except `[pins]` has defaults matching the stock firmware
//!   build (21-sample median, alpha 0.08, 50 Hz, 80-byte command lines).
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Upper bound for any sample window; keeps the per-tick sort cheap.
pub const MAX_WINDOW: usize = 255;

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub hx711_dt: u8,
    pub hx711_sck: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Raw median window (odd values give an exact median).
    pub median_window: usize,
    /// IIR weight of the newest value, in (0.0, 1.0].
    pub iir_alpha: f32,
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StabilityCfg {
    /// Allowed drift from the reference value, grams.
    pub delta_g: f32,
    /// How long the drift must stay inside `delta_g` before reporting stable.
    pub hold_ms: u64,
    /// Additionally gate stability on the rolling standard deviation.
    pub stddev_enabled: bool,
    pub stddev_window: usize,
    pub stddev_g: f32,
}

impl Default for StabilityCfg {
    fn default() -> Self {
        Self {
            delta_g: 3.0,
            hold_ms: 1500,
            stddev_enabled: false,
            stddev_window: 25,
            stddev_g: 1.5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProtocolCfg {
    /// Longest accepted command line, excluding the terminator.
    pub max_line_len: usize,
    /// Raw readings averaged by `C:<weight>`.
    pub calibration_samples: u32,
    /// Pause between calibration readings.
    pub calibration_delay_ms: u64,
    /// Greeting written once after boot.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageCfg {
    /// Directory holding one TOML file per namespace.
    pub path: PathBuf,
    pub namespace: String,
}

impl Default for StorageCfg {
    fn default() -> Self {
        Self {
            path: PathBuf::from("var/weigh"),
            namespace: "bascula".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SerialCfg {
    /// UART device; only used by the hardware link.
    pub device: String,
    pub baud: u32,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            device: "/dev/serial0".to_string(),
            baud: 115_200,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Max time to wait for HX711 data-ready (DT low) before failing
    pub sensor_read_timeout_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            sensor_read_timeout_ms: 150,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub filter: FilterCfg,
    #[serde(default)]
    pub stability: StabilityCfg,
    #[serde(default)]
    pub deadband: DeadbandCfg,
    #[serde(default)]
    pub protocol: ProtocolCfg,
    #[serde(default)]
    pub storage: StorageCfg,
    #[serde(default)]
    pub serial: SerialCfg,
    #[serde(default)]
    pub hardware: Hardware,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn non_negative_finite(v: f32) -> bool {
    v.is_finite() && v >= 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Filter
        if self.filter.median_window == 0 || self.filter.median_window > MAX_WINDOW {
            eyre::bail!("filter.median_window must be in [1, {MAX_WINDOW}]");
        }
        let alpha = self.filter.iir_alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            eyre::bail!("filter.iir_alpha must be in (0.0, 1.0]");
        }
        if self.filter.sample_rate_hz == 0 {
            eyre::bail!("filter.sample_rate_hz must be > 0");
        }
        if self.filter.sample_rate_hz > 1000 {
            eyre::bail!("filter.sample_rate_hz must be <= 1000");
        }

        // Stability
        if !non_negative_finite(self.stability.delta_g) {
            eyre::bail!("stability.delta_g must be a finite value >= 0");
        }
        if self.stability.hold_ms > 5 * 60 * 1000 {
            eyre::bail!("stability.hold_ms is unreasonably large (>5min)");
        }
        if self.stability.stddev_window == 0 || self.stability.stddev_window > MAX_WINDOW {
            eyre::bail!("stability.stddev_window must be in [1, {MAX_WINDOW}]");
        }
        if !non_negative_finite(self.stability.stddev_g) {
            eyre::bail!("stability.stddev_g must be a finite value >= 0");
        }

        // Deadband
        if !non_negative_finite(self.deadband.threshold_g) {
            eyre::bail!("deadband.threshold_g must be a finite value >= 0");
        }

        // Protocol
        if self.protocol.max_line_len == 0 {
            eyre::bail!("protocol.max_line_len must be >= 1");
        }
        if self.protocol.calibration_samples == 0 {
            eyre::bail!("protocol.calibration_samples must be >= 1");
        }
        if self.protocol.calibration_delay_ms > 1000 {
            eyre::bail!("protocol.calibration_delay_ms must be <= 1000");
        }
        if self.protocol.banner.contains(['\r', '\n']) {
            eyre::bail!("protocol.banner must be a single line");
        }

        // Storage
        if self.storage.namespace.trim().is_empty() {
            eyre::bail!("storage.namespace must not be empty");
        }

        // Serial
        if self.serial.baud == 0 {
            eyre::bail!("serial.baud must be > 0");
        }

        // Hardware
        if self.hardware.sensor_read_timeout_ms == 0 {
            eyre::bail!("hardware.sensor_read_timeout_ms must be >= 1");
        }

        Ok(())
    }
}
