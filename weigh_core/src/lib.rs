#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::must_use_candidate
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Load-cell scale firmware core (hardware-agnostic).
//!
//! All hardware interactions go through `weigh_traits::LoadCell`,
//! `weigh_traits::KvStore` and `weigh_traits::SerialLink`.
//!
//! ## Pipeline
//!
//! Each tick: raw sample → `MedianFilter` → `Calibration::to_grams` →
//! `IirSmoother` → `StabilityDetector` → `OutputDeadband` → one
//! `G:<grams>,S:<0|1>` line. Afterwards any inbound bytes are run through the
//! `LineAssembler` and completed lines are answered (`T`, `C:<grams>`).
//!
//! Calibration (`cal_factor`, `tare_offset`) lives in a `CalibrationStore`
//! that writes every change through to the key/value store.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod deadband;
pub mod error;
pub mod filter;
pub mod firmware;
pub mod hw_error;
pub mod mocks;
pub mod protocol;
pub mod report;
pub mod stability;
pub mod util;
pub mod window;

pub use builder::{DynFirmware, FirmwareBuilder, Missing, Set, build_firmware};
pub use calibration::{Calibration, CalibrationStore};
pub use config::{
    DeadbandCfg, FilterCfg, FirmwareCfg, ProtocolCfg, StabilityCfg, StddevGate, Timeouts,
};
pub use deadband::OutputDeadband;
pub use error::{BuildError, CommandError, Result, WeighError};
pub use filter::{IirSmoother, MedianFilter};
pub use firmware::Firmware;
pub use protocol::{Command, LineAssembler, LineEvent, LineState, Response};
pub use report::Report;
pub use stability::StabilityDetector;
pub use window::SampleWindow;
