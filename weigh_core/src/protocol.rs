//! Host command protocol: byte-wise line assembly, parsing and responses.
//!
//! Lines end at `\r` or `\n`. A line longer than the configured maximum is
//! dropped as a whole and reported once when its terminator arrives.

use core::fmt;

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Accumulating,
    Overflowed,
}

/// What a terminator produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Trimmed, non-empty line.
    Line(String),
    /// The line hit the length limit; its content was discarded.
    Overflow,
}

#[derive(Debug, Clone)]
pub struct LineAssembler {
    buf: String,
    // chars in `buf`; bytes >= 0x80 take two bytes of UTF-8
    len: usize,
    max_len: usize,
    state: LineState,
}

impl LineAssembler {
    pub fn new(max_len: usize) -> Self {
        Self {
            buf: String::with_capacity(max_len),
            len: 0,
            max_len,
            state: LineState::Accumulating,
        }
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    /// Characters buffered for the current line.
    pub fn pending(&self) -> usize {
        self.len
    }

    pub fn feed(&mut self, byte: u8) -> Option<LineEvent> {
        if byte == b'\r' || byte == b'\n' {
            let ev = match self.state {
                LineState::Overflowed => Some(LineEvent::Overflow),
                LineState::Accumulating => {
                    let line = trim_ascii(&self.buf);
                    (!line.is_empty()).then(|| LineEvent::Line(line.to_string()))
                }
            };
            self.buf.clear();
            self.len = 0;
            self.state = LineState::Accumulating;
            return ev;
        }

        if self.state == LineState::Accumulating {
            if self.len < self.max_len {
                // Latin-1: every byte maps to exactly one char.
                self.buf.push(byte as char);
                self.len += 1;
            } else {
                self.state = LineState::Overflowed;
            }
        }
        None
    }
}

/// Strip ASCII whitespace only. Latin-1 bytes such as NBSP (0xA0) or NEL
/// (0x85) decode to Unicode whitespace and must stay part of the line.
fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// A parsed host command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Tare,
    /// Calibrate against a known weight in grams (finite, > 0).
    Calibrate(f32),
}

impl Command {
    /// Parse a trimmed line. The command letter is case-insensitive.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        if line.eq_ignore_ascii_case("t") {
            return Ok(Command::Tare);
        }
        let mut chars = line.chars();
        match (chars.next(), chars.next()) {
            (Some('C' | 'c'), Some(':')) => {
                let weight = trim_ascii(chars.as_str())
                    .parse::<f32>()
                    .map_err(|_| CommandError::CalWeight)?;
                if weight.is_finite() && weight > 0.0 {
                    Ok(Command::Calibrate(weight))
                } else {
                    Err(CommandError::CalWeight)
                }
            }
            _ => Err(CommandError::UnknownCommand),
        }
    }
}

/// One response line to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    AckTare,
    /// Carries the new calibration factor.
    AckCalibrate(f32),
    Error(CommandError),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::AckTare => f.write_str("ACK:T"),
            Response::AckCalibrate(factor) => write!(f, "ACK:C:{factor:.8}"),
            Response::Error(e) => write!(f, "{e}"),
        }
    }
}

impl From<CommandError> for Response {
    fn from(e: CommandError) -> Self {
        Response::Error(e)
    }
}
