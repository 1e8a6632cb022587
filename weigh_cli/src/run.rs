//! Collaborator assembly and subcommand bodies.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use weigh_core::{CalibrationStore, DynFirmware, FirmwareCfg};
use weigh_hardware::FileStore;
use weigh_traits::{LoadCell, SerialLink};

use crate::cli::SIM_RAW_ENV;
use crate::rt::setup_rt_once;

/// Raw value for the simulated load cell: flag, then env, then 0.
pub fn sim_raw(flag: Option<i32>) -> eyre::Result<i32> {
    if let Some(v) = flag {
        return Ok(v);
    }
    match std::env::var(SIM_RAW_ENV) {
        Ok(s) => s
            .trim()
            .parse::<i32>()
            .wrap_err_with(|| format!("{SIM_RAW_ENV} must be an integer, got {s:?}")),
        Err(_) => Ok(0),
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_load_cell(cfg: &weigh_config::Config, _sim_raw: i32) -> eyre::Result<Box<dyn LoadCell>> {
    let hx = weigh_hardware::Hx711::open(
        cfg.pins.hx711_dt,
        cfg.pins.hx711_sck,
        weigh_hardware::Gain::A128,
    )
    .wrap_err("open hx711")?;
    tracing::info!(dt = cfg.pins.hx711_dt, sck = cfg.pins.hx711_sck, "HX711 ready");
    Ok(Box::new(hx))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_load_cell(_cfg: &weigh_config::Config, sim_raw: i32) -> eyre::Result<Box<dyn LoadCell>> {
    tracing::info!(raw = sim_raw, "using simulated load cell");
    Ok(Box::new(weigh_hardware::SimulatedLoadCell::new(sim_raw)))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_link(cfg: &weigh_config::Config) -> eyre::Result<Box<dyn SerialLink>> {
    let uart = weigh_hardware::UartLink::open(&cfg.serial.device, cfg.serial.baud)
        .wrap_err_with(|| format!("open uart {}", cfg.serial.device))?;
    Ok(Box::new(uart))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_link(_cfg: &weigh_config::Config) -> eyre::Result<Box<dyn SerialLink>> {
    Ok(Box::new(weigh_hardware::StdioLink::spawn()))
}

fn open_store(cfg: &weigh_config::Config) -> eyre::Result<FileStore> {
    FileStore::open(&cfg.storage.path, &cfg.storage.namespace).wrap_err_with(|| {
        format!(
            "open calibration store {:?} (namespace {})",
            cfg.storage.path, cfg.storage.namespace
        )
    })
}

/// Boot the firmware and tick until `shutdown` or `ticks`.
pub fn run_scale(
    cfg: &weigh_config::Config,
    ticks: Option<u64>,
    sim_raw_flag: Option<i32>,
    rt: bool,
    rt_prio: Option<i32>,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<u64> {
    setup_rt_once(rt, rt_prio);

    let load_cell = make_load_cell(cfg, sim_raw(sim_raw_flag)?)?;
    let link = make_link(cfg)?;
    let store = open_store(cfg)?;

    let mut fw = DynFirmware::builder()
        .with_load_cell(load_cell)
        .with_store(store)
        .with_link(link)
        .with_config(FirmwareCfg::from(cfg))
        .build()?;

    fw.boot();
    let n = fw.run(&shutdown, ticks);
    let cal = fw.calibration();
    tracing::info!(
        ticks = n,
        cal_factor = cal.cal_factor,
        tare_offset = cal.tare_offset,
        "scale stopped"
    );
    Ok(n)
}

/// Read one sample through the configured load cell.
pub fn self_check(cfg: &weigh_config::Config) -> eyre::Result<i32> {
    let mut cell = make_load_cell(cfg, sim_raw(None)?)?;
    let timeout = Duration::from_millis(cfg.hardware.sensor_read_timeout_ms);
    cell.read_raw(timeout)
        .map_err(|e| weigh_core::hw_error::map_hw_error(e.as_ref()))
        .wrap_err("self-check read")
}

/// Persisted calibration, defaults where nothing was stored yet.
pub fn show_calibration(cfg: &weigh_config::Config) -> eyre::Result<weigh_core::Calibration> {
    let store = open_store(cfg)?;
    Ok(CalibrationStore::open(store).current())
}
