//! Output hysteresis applied once the reading is stable.

use crate::config::DeadbandCfg;

#[derive(Debug, Clone)]
pub struct OutputDeadband {
    enabled: bool,
    threshold_g: f32,
    last_emitted_g: f32,
}

impl OutputDeadband {
    pub fn new(cfg: &DeadbandCfg) -> Self {
        Self {
            enabled: cfg.enabled,
            threshold_g: cfg.threshold_g,
            last_emitted_g: 0.0,
        }
    }

    /// Value to report for `grams`. Holds the previous value while stable and
    /// within the threshold.
    pub fn apply(&mut self, grams: f32, stable: bool) -> f32 {
        let out = if self.enabled && stable && (grams - self.last_emitted_g).abs() < self.threshold_g
        {
            self.last_emitted_g
        } else {
            grams
        };
        self.last_emitted_g = out;
        out
    }

    pub fn last_emitted(&self) -> f32 {
        self.last_emitted_g
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(enabled: bool) -> OutputDeadband {
        OutputDeadband::new(&DeadbandCfg {
            enabled,
            threshold_g: 0.2,
        })
    }

    #[test]
    fn holds_small_changes_when_stable() {
        let mut d = band(true);
        assert_eq!(d.apply(10.0, true), 10.0);
        assert_eq!(d.apply(10.15, true), 10.0);
        assert_eq!(d.apply(10.3, true), 10.3);
    }

    #[test]
    fn passes_through_when_unstable_or_disabled() {
        let mut d = band(true);
        d.apply(10.0, true);
        assert_eq!(d.apply(10.1, false), 10.1);

        let mut off = band(false);
        off.apply(10.0, true);
        assert_eq!(off.apply(10.1, true), 10.1);
    }
}
