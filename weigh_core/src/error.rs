use thiserror::Error;

/// Failures the host sees as a single protocol line.
///
/// `Display` is the exact wire code, so a response is just `err.to_string()`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Calibration weight missing, unparsable, non-finite or not positive.
    #[error("ERR:CAL:weight")]
    CalWeight,
    /// Net raw reading was zero, so the factor would be undefined.
    #[error("ERR:CAL:zero")]
    CalZero,
    #[error("ERR:UNKNOWN_CMD")]
    UnknownCommand,
    /// Line exceeded the configured maximum before its terminator.
    #[error("ERR:CMDLEN")]
    LineTooLong,
}

#[derive(Debug, Error, Clone)]
pub enum WeighError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serial link error: {0}")]
    Link(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing load cell")]
    MissingLoadCell,
    #[error("missing calibration store")]
    MissingStore,
    #[error("missing serial link")]
    MissingLink,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
