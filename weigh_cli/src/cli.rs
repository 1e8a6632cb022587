//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Environment variable overriding the simulated raw reading.
pub const SIM_RAW_ENV: &str = "WEIGH_SIM_RAW";

#[derive(Parser, Debug)]
#[command(name = "weigh", version, about = "Load-cell scale firmware")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/weigh_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scale loop: report lines on the serial link, answer T / C:<grams>
    Run {
        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Raw reading of the simulated load cell (overrides WEIGH_SIM_RAW)
        #[arg(long, value_name = "RAW", allow_negative_numbers = true)]
        sim_raw: Option<i32>,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux.\n\nAttempts SCHED_FIFO priority and calls mlockall(MCL_CURRENT|MCL_FUTURE). Failures are logged as warnings and the loop runs anyway. May require CAP_SYS_NICE / CAP_IPC_LOCK or root."
        )]
        rt: bool,
        /// Real-time priority for SCHED_FIFO (1..=max); defaults to max
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
    },
    /// Validate config and read one sample
    SelfCheck,
    /// Print the persisted calibration factor and tare offset
    ShowCalibration,
}
