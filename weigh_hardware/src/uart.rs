use std::time::Duration;

use rppal::uart::{Parity, Uart};
use weigh_traits::{BoxError, SerialLink};

use crate::error::{HwError, Result};

/// 8N1 UART link to the host in non-blocking read mode.
pub struct UartLink {
    uart: Uart,
}

impl UartLink {
    pub fn open(device: &str, baud: u32) -> Result<Self> {
        let mut uart = Uart::with_path(device, baud, Parity::None, 8, 1)
            .map_err(|e| HwError::Uart(format!("open {device}: {e}")))?;
        // min_length = 0 and no timeout: read() returns whatever is buffered
        uart.set_read_mode(0, Duration::ZERO)
            .map_err(|e| HwError::Uart(format!("read mode: {e}")))?;
        tracing::info!(device, baud, "uart link open");
        Ok(Self { uart })
    }
}

impl SerialLink for UartLink {
    fn write_line(&mut self, line: &str) -> std::result::Result<(), BoxError> {
        let mut frame = Vec::with_capacity(line.len() + 2);
        frame.extend_from_slice(line.as_bytes());
        frame.extend_from_slice(b"\r\n");
        let mut sent = 0;
        while sent < frame.len() {
            let n = self
                .uart
                .write(&frame[sent..])
                .map_err(|e| HwError::Uart(e.to_string()))?;
            if n == 0 {
                return Err(HwError::Uart("write made no progress".into()).into());
            }
            sent += n;
        }
        Ok(())
    }

    fn try_read_byte(&mut self) -> std::result::Result<Option<u8>, BoxError> {
        let mut b = [0u8; 1];
        let n = self
            .uart
            .read(&mut b)
            .map_err(|e| HwError::Uart(e.to_string()))?;
        Ok((n == 1).then_some(b[0]))
    }
}
