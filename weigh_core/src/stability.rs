//! Stable/unstable decision over smoothed grams.

use crate::config::StabilityCfg;
use crate::window::SampleWindow;

/// Tracks how long the reading has stayed near a reference value.
///
/// The reference (time and grams) moves only when the reading violates the
/// band. Once `hold_ms` has elapsed since the last violation the flag turns
/// on and stays on until the next violation.
#[derive(Debug, Clone)]
pub struct StabilityDetector {
    delta_g: f32,
    hold_ms: u64,
    gate: Option<(SampleWindow<f32>, f32)>,
    stable: bool,
    reference_ms: u64,
    reference_g: f32,
}

impl StabilityDetector {
    /// `start_ms` is the initial reference time (boot), paired with 0.0 g.
    pub fn new(cfg: &StabilityCfg, start_ms: u64) -> Self {
        Self {
            delta_g: cfg.delta_g,
            hold_ms: cfg.hold_ms,
            gate: cfg
                .stddev
                .map(|g| (SampleWindow::new(g.window), g.threshold_g)),
            stable: false,
            reference_ms: start_ms,
            reference_g: 0.0,
        }
    }

    pub fn update(&mut self, grams: f32, now_ms: u64) -> bool {
        let delta_ok = (grams - self.reference_g).abs() <= self.delta_g;

        let std_ok = match &mut self.gate {
            Some((window, threshold_g)) => {
                window.push(grams);
                if window.len() >= window.capacity() / 2 {
                    window.stddev().is_some_and(|sd| sd <= *threshold_g)
                } else {
                    true
                }
            }
            None => true,
        };

        if delta_ok && std_ok {
            if now_ms.saturating_sub(self.reference_ms) >= self.hold_ms {
                self.stable = true;
            }
        } else {
            self.stable = false;
            self.reference_ms = now_ms;
            self.reference_g = grams;
        }
        self.stable
    }

    pub fn is_stable(&self) -> bool {
        self.stable
    }

    pub fn reference(&self) -> (u64, f32) {
        (self.reference_ms, self.reference_g)
    }

    /// Current rolling deviation, when the gate is enabled and has samples.
    pub fn stddev(&self) -> Option<f32> {
        self.gate.as_ref().and_then(|(w, _)| w.stddev())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StddevGate;

    fn cfg(delta_g: f32, hold_ms: u64) -> StabilityCfg {
        StabilityCfg {
            delta_g,
            hold_ms,
            stddev: None,
        }
    }

    #[test]
    fn becomes_stable_after_hold() {
        let mut s = StabilityDetector::new(&cfg(3.0, 1000), 0);
        assert!(!s.update(1.0, 0));
        assert!(!s.update(1.5, 999));
        assert!(s.update(2.0, 1000));
        // sticky while inside the band
        assert!(s.update(-2.5, 1020));
    }

    #[test]
    fn violation_resets_reference() {
        let mut s = StabilityDetector::new(&cfg(3.0, 500), 0);
        assert!(s.update(0.0, 600));
        assert!(!s.update(50.0, 700));
        assert_eq!(s.reference(), (700, 50.0));
        assert!(!s.update(51.0, 1100));
        assert!(s.update(51.0, 1200));
    }

    #[test]
    fn noisy_signal_fails_stddev_gate() {
        let c = StabilityCfg {
            delta_g: 100.0,
            hold_ms: 0,
            stddev: Some(StddevGate {
                window: 4,
                threshold_g: 1.0,
            }),
        };
        let mut s = StabilityDetector::new(&c, 0);
        // one sample: gate not yet active (needs capacity / 2 = 2)
        assert!(s.update(0.0, 0));
        // two samples 0, 10 -> stddev 5
        assert!(!s.update(10.0, 10));
    }

    #[test]
    fn stddev_gate_holds_back_then_releases() {
        let c = StabilityCfg {
            delta_g: 100.0,
            hold_ms: 100,
            stddev: Some(StddevGate {
                window: 4,
                threshold_g: 1.0,
            }),
        };
        let mut s = StabilityDetector::new(&c, 0);

        // Alternating +-10 g stays inside delta_g but never passes the gate,
        // however long it lasts.
        let mut t = 0;
        for i in 0..50 {
            let g = if i % 2 == 0 { 10.0 } else { -10.0 };
            assert!(!s.update(g, t), "stable while noisy at t={t}");
            t += 10;
        }
        assert!(s.stddev().is_some_and(|sd| sd > 1.0));

        // Settle at 0 g: the gate keeps failing until the noise leaves the
        // window, and each failure moves the reference.
        assert!(!s.update(0.0, 500));
        assert!(!s.update(0.0, 510));
        assert!(!s.update(0.0, 520));
        assert_eq!(s.reference(), (520, 0.0));
        assert!(!s.update(0.0, 530));
        assert_eq!(s.stddev(), Some(0.0));
        // reference stays put once both tests pass
        assert_eq!(s.reference(), (520, 0.0));

        assert!(!s.update(0.5, 619));
        assert!(s.update(0.5, 620));
        assert!(s.update(0.2, 630));

        // A spike well inside delta_g still trips the gate and resets.
        assert!(!s.update(20.0, 640));
        assert_eq!(s.reference(), (640, 20.0));
        assert!(!s.is_stable());
    }
}
