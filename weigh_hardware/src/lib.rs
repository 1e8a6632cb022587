//! Collaborator implementations for the scale firmware.
//!
//! Always available: a simulated load cell, in-memory and file-backed
//! key/value stores, and in-memory and stdio serial links. With the
//! `hardware` feature on Linux: an HX711 driver and a UART link via `rppal`.
pub mod error;
pub mod link;
pub mod sim;
pub mod store;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod hx711;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod uart;

pub use link::StdioLink;
pub use sim::{MemoryLink, SimulatedLoadCell};
pub use store::{FileStore, MemoryStore};

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hx711::{Gain, Hx711};
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use uart::UartLink;
