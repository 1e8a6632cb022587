//! Serial link over the process's stdin/stdout.
//!
//! Reads block, so a helper thread pulls stdin bytes into a channel and the
//! sampling loop drains whatever has already arrived with `try_recv`.
use std::io::{Read, Write};

use crossbeam_channel as xch;
use weigh_traits::{BoxError, SerialLink};

pub struct StdioLink {
    rx: xch::Receiver<u8>,
    out: std::io::Stdout,
}

impl StdioLink {
    pub fn spawn() -> Self {
        let (tx, rx) = xch::unbounded();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut lock = stdin.lock();
            let mut buf = [0u8; 256];
            loop {
                match lock.read(&mut buf) {
                    Ok(0) => {
                        tracing::debug!("stdin closed; no more host commands");
                        break;
                    }
                    Ok(n) => {
                        if buf[..n].iter().any(|b| tx.send(*b).is_err()) {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
        });
        Self {
            rx,
            out: std::io::stdout(),
        }
    }
}

impl SerialLink for StdioLink {
    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        let mut lock = self.out.lock();
        lock.write_all(line.as_bytes())?;
        lock.write_all(b"\n")?;
        lock.flush()?;
        Ok(())
    }

    fn try_read_byte(&mut self) -> Result<Option<u8>, BoxError> {
        match self.rx.try_recv() {
            Ok(b) => Ok(Some(b)),
            // Disconnected just means stdin hit EOF; nothing more will come.
            Err(xch::TryRecvError::Empty | xch::TryRecvError::Disconnected) => Ok(None),
        }
    }
}
