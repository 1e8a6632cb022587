//! The per-tick weight line, `G:<grams>,S:<0|1>`.

use core::fmt;
use core::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub grams: f32,
    pub stable: bool,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G:{:.2},S:{}", self.grams, u8::from(self.stable))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed report line: {0:?}")]
pub struct ParseReportError(pub String);

/// Host-side parser for report lines.
impl FromStr for Report {
    type Err = ParseReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseReportError(s.to_string());
        let (g, st) = s.trim().split_once(',').ok_or_else(bad)?;
        let grams = g
            .strip_prefix("G:")
            .and_then(|v| v.parse::<f32>().ok())
            .ok_or_else(bad)?;
        let stable = match st.strip_prefix("S:") {
            Some("0") => false,
            Some("1") => true,
            _ => return Err(bad()),
        };
        Ok(Report { grams, stable })
    }
}
