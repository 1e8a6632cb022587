#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `weigh`: runs the scale firmware loop on a host (Raspberry Pi with the
//! `hardware` feature, simulation otherwise).
//!
//! stdout carries the serial protocol in simulation, so all logging goes to
//! stderr (and optionally a file).

mod cli;
mod error_fmt;
mod rt;
mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn init_logging(cli: &Cli, cfg: Option<&weigh_config::Config>) {
    let level = cfg
        .and_then(|c| c.logging.level.clone())
        .filter(|_| cli.log_level == "info")
        .unwrap_or_else(|| cli.log_level.clone());
    // RUST_LOG wins over --log-level and [logging].level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let file_writer = cfg.and_then(|c| c.logging.file.as_deref()).map(|file| {
        let path = std::path::Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "weigh.log".into());
        let rotation = match cfg
            .and_then(|c| c.logging.rotation.as_deref())
            .unwrap_or("never")
        {
            "daily" => tracing_appender::rolling::Rotation::DAILY,
            "hourly" => tracing_appender::rolling::Rotation::HOURLY,
            _ => tracing_appender::rolling::Rotation::NEVER,
        };
        let appender = tracing_appender::rolling::RollingFileAppender::new(rotation, dir, name);
        let (nb, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        nb
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    // try_init: a second subscriber (e.g. in tests) is not an error
    let _ = match (cli.json, file_writer) {
        (true, Some(nb)) => builder
            .json()
            .with_writer(std::io::stderr.and(nb))
            .try_init(),
        (true, None) => builder.json().with_writer(std::io::stderr).try_init(),
        (false, Some(nb)) => builder
            .with_writer(std::io::stderr.and(nb))
            .try_init(),
        (false, None) => builder.with_writer(std::io::stderr).try_init(),
    };
}

fn install_ctrlc() -> Arc<AtomicBool> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
    shutdown
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    let loaded = weigh_config::load_file(&cli.config);
    init_logging(cli, loaded.as_ref().ok());
    let cfg = loaded?;
    tracing::debug!(config = ?cli.config, "config loaded");

    match &cli.cmd {
        Commands::Run {
            ticks,
            sim_raw,
            rt,
            rt_prio,
        } => {
            let shutdown = install_ctrlc();
            run::run_scale(&cfg, *ticks, *sim_raw, *rt, *rt_prio, shutdown)?;
        }
        Commands::SelfCheck => {
            let raw = run::self_check(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "status": "ok", "raw": raw }));
            } else {
                println!("ok (raw {raw})");
            }
        }
        Commands::ShowCalibration => {
            let cal = run::show_calibration(&cfg)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "cal_factor": cal.cal_factor,
                        "tare_offset": cal.tare_offset,
                    })
                );
            } else {
                println!("cal_factor={:.8}", cal.cal_factor);
                println!("tare_offset={}", cal.tare_offset);
            }
        }
    }
    Ok(())
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(&cli) {
        tracing::error!(error = %format!("{err:#}"), "exiting with error");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(1);
    }
}
