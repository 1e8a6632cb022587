use rstest::rstest;
use weigh_config::{load_file, load_toml};

const MINIMAL: &str = r#"
[pins]
hx711_dt = 4
hx711_sck = 5
"#;

#[test]
fn minimal_config_gets_firmware_defaults() {
    let cfg = load_toml(MINIMAL).expect("parse TOML");
    cfg.validate().expect("defaults are valid");

    assert_eq!(cfg.filter.median_window, 21);
    assert!((cfg.filter.iir_alpha - 0.08).abs() < 1e-6);
    assert_eq!(cfg.filter.sample_rate_hz, 50);
    assert!((cfg.stability.delta_g - 3.0).abs() < 1e-6);
    assert_eq!(cfg.stability.hold_ms, 1500);
    assert!(!cfg.stability.stddev_enabled);
    assert!(cfg.deadband.enabled);
    assert_eq!(cfg.protocol.max_line_len, 80);
    assert_eq!(cfg.protocol.calibration_samples, 20);
    assert_eq!(cfg.protocol.calibration_delay_ms, 5);
    assert_eq!(cfg.protocol.banner, "HELLO:ESP32-HX711");
    assert_eq!(cfg.storage.namespace, "bascula");
    assert_eq!(cfg.hardware.sensor_read_timeout_ms, 150);
}

#[test]
fn missing_pins_is_a_parse_error() {
    let err = load_toml("[filter]\nmedian_window = 5\n").expect_err("pins are required");
    assert!(format!("{err}").contains("pins"));
}

#[rstest]
#[case("[filter]\nmedian_window = 0", "filter.median_window")]
#[case("[filter]\nmedian_window = 300", "filter.median_window")]
#[case("[filter]\niir_alpha = 0.0", "filter.iir_alpha")]
#[case("[filter]\niir_alpha = 1.5", "filter.iir_alpha")]
#[case("[filter]\nsample_rate_hz = 0", "filter.sample_rate_hz must be > 0")]
#[case("[stability]\ndelta_g = -1.0", "stability.delta_g")]
#[case("[stability]\nhold_ms = 600000", "stability.hold_ms")]
#[case("[stability]\nstddev_window = 0", "stability.stddev_window")]
#[case("[deadband]\nthreshold_g = -0.1", "deadband.threshold_g")]
#[case("[protocol]\nmax_line_len = 0", "protocol.max_line_len")]
#[case("[protocol]\ncalibration_samples = 0", "protocol.calibration_samples")]
#[case("[protocol]\nbanner = \"A\\nB\"", "protocol.banner")]
#[case("[storage]\nnamespace = \" \"", "storage.namespace")]
#[case("[hardware]\nsensor_read_timeout_ms = 0", "hardware.sensor_read_timeout_ms")]
fn rejects_out_of_range_values(#[case] section: &str, #[case] needle: &str) {
    let toml = format!("{MINIMAL}\n{section}\n");
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn accepts_simple_variant_without_stddev_or_deadband() {
    let toml = format!(
        "{MINIMAL}
[filter]
median_window = 15
iir_alpha = 0.2

[stability]
delta_g = 1.0
hold_ms = 800
stddev_enabled = false

[deadband]
enabled = false
"
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    cfg.validate().expect("valid");
    assert_eq!(cfg.filter.median_window, 15);
    assert!(!cfg.deadband.enabled);
}

#[test]
fn load_file_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.toml");
    std::fs::write(&good, MINIMAL).unwrap();
    let cfg = load_file(&good).expect("load");
    assert_eq!(cfg.pins.hx711_dt, 4);

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, format!("{MINIMAL}\n[filter]\nsample_rate_hz = 0\n")).unwrap();
    let err = load_file(&bad).expect_err("invalid");
    assert!(format!("{err}").contains("sample_rate_hz"));

    let missing = dir.path().join("nope.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
