use rstest::rstest;
use weigh_core::error::BuildError;
use weigh_core::{DynFirmware, FilterCfg, FirmwareCfg, StddevGate};
use weigh_hardware::{MemoryLink, MemoryStore, SimulatedLoadCell};
use weigh_traits::ManualClock;

fn expect_build_error(res: weigh_core::Result<DynFirmware>) -> BuildError {
    let err = res.expect_err("build should fail");
    err.downcast_ref::<BuildError>()
        .cloned()
        .unwrap_or_else(|| panic!("expected BuildError, got: {err:?}"))
}

#[rstest]
fn builder_missing_load_cell_yields_typed_build_error() {
    let res = DynFirmware::builder()
        .with_store(MemoryStore::new())
        .with_link(MemoryLink::new())
        .try_build();
    assert!(matches!(
        expect_build_error(res),
        BuildError::MissingLoadCell
    ));
}

#[rstest]
fn builder_missing_store_yields_typed_build_error() {
    let res = DynFirmware::builder()
        .with_load_cell(SimulatedLoadCell::new(0))
        .with_link(MemoryLink::new())
        .try_build();
    assert!(matches!(expect_build_error(res), BuildError::MissingStore));
}

#[rstest]
fn builder_missing_link_yields_typed_build_error() {
    let res = DynFirmware::builder()
        .with_load_cell(SimulatedLoadCell::new(0))
        .with_store(MemoryStore::new())
        .try_build();
    assert!(matches!(expect_build_error(res), BuildError::MissingLink));
}

fn with_filter(median_window: usize, iir_alpha: f32, sample_rate_hz: u32) -> FirmwareCfg {
    FirmwareCfg {
        filter: FilterCfg {
            median_window,
            iir_alpha,
            sample_rate_hz,
        },
        ..FirmwareCfg::default()
    }
}

#[rstest]
#[case::zero_window(with_filter(0, 0.1, 50), "median_window")]
#[case::huge_window(with_filter(256, 0.1, 50), "median_window")]
#[case::zero_alpha(with_filter(5, 0.0, 50), "iir_alpha")]
#[case::big_alpha(with_filter(5, 1.5, 50), "iir_alpha")]
#[case::nan_alpha(with_filter(5, f32::NAN, 50), "iir_alpha")]
#[case::zero_rate(with_filter(5, 0.1, 0), "sample_rate_hz")]
#[case::negative_delta({
    let mut c = FirmwareCfg::default();
    c.stability.delta_g = -1.0;
    c
}, "delta_g")]
#[case::empty_stddev_window({
    let mut c = FirmwareCfg::default();
    c.stability.stddev = Some(StddevGate { window: 0, threshold_g: 1.0 });
    c
}, "stddev window")]
#[case::zero_line_len({
    let mut c = FirmwareCfg::default();
    c.protocol.max_line_len = 0;
    c
}, "max_line_len")]
#[case::zero_cal_samples({
    let mut c = FirmwareCfg::default();
    c.protocol.calibration_samples = 0;
    c
}, "calibration_samples")]
#[case::multiline_banner({
    let mut c = FirmwareCfg::default();
    c.protocol.banner = "HELLO\nAGAIN".into();
    c
}, "banner")]
#[case::zero_sensor_timeout({
    let mut c = FirmwareCfg::default();
    c.timeouts.sensor_ms = 0;
    c
}, "sensor_ms")]
fn invalid_config_is_rejected(#[case] cfg: FirmwareCfg, #[case] needle: &str) {
    let res = DynFirmware::builder()
        .with_load_cell(SimulatedLoadCell::new(0))
        .with_store(MemoryStore::new())
        .with_link(MemoryLink::new())
        .with_config(cfg)
        .build();
    match expect_build_error(res) {
        BuildError::InvalidConfig(msg) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[rstest]
fn built_firmware_runs() {
    let link = MemoryLink::new();
    let mut fw = DynFirmware::builder()
        .with_load_cell(SimulatedLoadCell::new(42))
        .with_store(MemoryStore::new())
        .with_link(link.clone())
        .with_clock(Box::new(ManualClock::new()))
        .build()
        .expect("defaults are valid");
    fw.boot();
    fw.tick();
    assert_eq!(link.take_lines(), vec!["HELLO:ESP32-HX711", "G:42.00,S:0"]);
}
