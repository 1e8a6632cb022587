use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("uart error: {0}")]
    Uart(String),
    #[error("hx711 data-ready timeout")]
    DataReadyTimeout,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("link closed")]
    LinkClosed,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
