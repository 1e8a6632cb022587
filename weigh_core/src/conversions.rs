//! `From` implementations bridging `weigh_config` sections to `weigh_core` types.

use crate::config::{
    DeadbandCfg, FilterCfg, FirmwareCfg, ProtocolCfg, StabilityCfg, StddevGate, Timeouts,
};

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&weigh_config::FilterCfg> for FilterCfg {
    fn from(c: &weigh_config::FilterCfg) -> Self {
        Self {
            median_window: c.median_window,
            iir_alpha: c.iir_alpha,
            sample_rate_hz: c.sample_rate_hz,
        }
    }
}

// ── StabilityCfg ─────────────────────────────────────────────────────────────

impl From<&weigh_config::StabilityCfg> for StabilityCfg {
    fn from(c: &weigh_config::StabilityCfg) -> Self {
        Self {
            delta_g: c.delta_g,
            hold_ms: c.hold_ms,
            stddev: c.stddev_enabled.then_some(StddevGate {
                window: c.stddev_window,
                threshold_g: c.stddev_g,
            }),
        }
    }
}

// ── DeadbandCfg ──────────────────────────────────────────────────────────────

impl From<&weigh_config::DeadbandCfg> for DeadbandCfg {
    fn from(c: &weigh_config::DeadbandCfg) -> Self {
        Self {
            enabled: c.enabled,
            threshold_g: c.threshold_g,
        }
    }
}

// ── ProtocolCfg ──────────────────────────────────────────────────────────────

impl From<&weigh_config::ProtocolCfg> for ProtocolCfg {
    fn from(c: &weigh_config::ProtocolCfg) -> Self {
        Self {
            max_line_len: c.max_line_len,
            calibration_samples: c.calibration_samples,
            calibration_delay_ms: c.calibration_delay_ms,
            banner: c.banner.clone(),
        }
    }
}

// ── Timeouts ─────────────────────────────────────────────────────────────────

impl From<&weigh_config::Hardware> for Timeouts {
    fn from(c: &weigh_config::Hardware) -> Self {
        Self {
            sensor_ms: c.sensor_read_timeout_ms,
        }
    }
}

// ── FirmwareCfg ──────────────────────────────────────────────────────────────

impl From<&weigh_config::Config> for FirmwareCfg {
    fn from(c: &weigh_config::Config) -> Self {
        Self {
            filter: (&c.filter).into(),
            stability: (&c.stability).into(),
            deadband: (&c.deadband).into(),
            protocol: (&c.protocol).into(),
            timeouts: (&c.hardware).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_gate_follows_enabled_flag() {
        let mut c = weigh_config::StabilityCfg::default();
        assert!(StabilityCfg::from(&c).stddev.is_none());
        c.stddev_enabled = true;
        c.stddev_window = 9;
        let gate = StabilityCfg::from(&c).stddev.expect("enabled");
        assert_eq!(gate.window, 9);
        assert!((gate.threshold_g - 1.5).abs() < 1e-6);
    }
}
