//! Human-readable error descriptions and structured JSON error formatting.

use weigh_core::error::{BuildError, WeighError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first, anywhere in the chain
    for cause in err.chain() {
        if let Some(be) = cause.downcast_ref::<BuildError>() {
            return match be {
                BuildError::MissingLoadCell => {
                    "What happened: No load cell was provided to the firmware.\nLikely causes: The HX711 failed to initialize or was not wired into the builder.\nHow to fix: Ensure the load cell is created successfully and passed via with_load_cell(...).".to_string()
                }
                BuildError::MissingStore => {
                    "What happened: No calibration store was provided.\nLikely causes: The storage directory could not be opened.\nHow to fix: Check [storage] path and permissions.".to_string()
                }
                BuildError::MissingLink => {
                    "What happened: No serial link was provided.\nLikely causes: The UART failed to open or was not wired into the builder.\nHow to fix: Check [serial] device and baud.".to_string()
                }
                BuildError::InvalidConfig(msg) => format!(
                    "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/weigh_config.toml for a sample."
                ),
            };
        }

        if let Some(we) = cause.downcast_ref::<WeighError>() {
            return match we {
                WeighError::Timeout => "What happened: Load cell read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing hardware.sensor_read_timeout_ms in the config.".to_string(),
                WeighError::Storage(m) => format!(
                    "What happened: Calibration storage failed ({m}).\nLikely causes: Read-only or full filesystem, or a corrupt calibration file.\nHow to fix: Check [storage] path; delete the calibration file to start from defaults."
                ),
                other => format!(
                    "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
                ),
            };
        }
    }

    // String-based heuristics for errors coming from init or config
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if (lower.contains("hx711") && lower.contains("timeout")) || lower.contains("datareadytimeout")
    {
        return "What happened: HX711 did not produce data within the configured timeout.\nLikely causes: Wrong DT/SCK pins, wiring/power issues, or timeout configured too low.\nHow to fix: Check [pins] in the config, verify 5V/GND, and raise hardware.sensor_read_timeout_ms.".to_string();
    }

    if lower.contains("open hx711") || lower.contains("open uart") {
        return format!(
            "What happened: Failed to initialize hardware ({msg}).\nLikely causes: Incorrect pin numbers or device path, or insufficient GPIO/serial permissions.\nHow to fix: Fix [pins] / [serial] in the config; ensure the process may access GPIO and the UART."
        );
    }

    if lower.contains("weigh_sim_raw") {
        return format!("What happened: {msg}.\nHow to fix: Set WEIGH_SIM_RAW to a whole number.");
    }

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file ({msg}).\nLikely causes: Wrong --config path.\nHow to fix: Pass --config <FILE> or create etc/weigh_config.toml."
        );
    }

    if lower.contains("parse config") || lower.contains(" must ") {
        return format!(
            "What happened: Configuration is invalid or incomplete ({msg}).\nLikely causes: Missing [pins] (hx711_dt, hx711_sck) or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Short stable name for the JSON `reason` field.
fn reason_name(err: &eyre::Report) -> &'static str {
    for cause in err.chain() {
        if let Some(be) = cause.downcast_ref::<BuildError>() {
            return match be {
                BuildError::InvalidConfig(_) => "InvalidConfig",
                _ => "Build",
            };
        }
        if let Some(we) = cause.downcast_ref::<WeighError>() {
            return match we {
                WeighError::Timeout => "Timeout",
                WeighError::Storage(_) => "Storage",
                WeighError::Link(_) => "Link",
                WeighError::Hardware(_) | WeighError::HardwareFault(_) => "Hardware",
            };
        }
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_is_explained() {
        let err = eyre::Report::new(BuildError::InvalidConfig("median_window must be in [1, 255]"));
        let s = humanize(&err);
        assert!(s.starts_with("What happened: Invalid configuration"));
        assert!(s.contains("median_window"));
    }

    #[test]
    fn wrapped_timeout_is_found_in_chain() {
        let err = eyre::Report::new(WeighError::Timeout).wrap_err("self-check read");
        assert!(humanize(&err).contains("timed out"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Timeout");
    }

    #[test]
    fn validation_message_maps_to_config_hint() {
        let err = eyre::eyre!("filter.iir_alpha must be in (0.0, 1.0]");
        assert!(humanize(&err).contains("Configuration is invalid"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Error");
    }
}
