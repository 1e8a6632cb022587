//! Signal conditioning: raw median prefilter and IIR smoothing in grams.

use crate::window::SampleWindow;

/// Median over the last N raw samples.
#[derive(Debug, Clone)]
pub struct MedianFilter {
    window: SampleWindow<i32>,
    // Preallocated so median() never allocates.
    scratch: Vec<i32>,
}

impl MedianFilter {
    pub fn new(capacity: usize) -> Self {
        let window = SampleWindow::new(capacity);
        let scratch = Vec::with_capacity(window.capacity());
        Self { window, scratch }
    }

    pub fn add(&mut self, raw: i32) {
        self.window.push(raw);
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Middle element of the sorted samples held so far.
    ///
    /// Uses the true count before the window fills. For even counts this is
    /// the upper of the two middle values.
    pub fn median(&mut self) -> Option<i32> {
        if self.window.is_empty() {
            return None;
        }
        self.scratch.clear();
        self.scratch.extend(self.window.iter());
        self.scratch.sort_unstable();
        Some(self.scratch[self.scratch.len() / 2])
    }
}

/// First-order exponential smoother.
///
/// The first value seeds the accumulator so the output does not ramp up
/// from zero after boot.
#[derive(Debug, Clone)]
pub struct IirSmoother {
    alpha: f32,
    acc: Option<f32>,
}

impl IirSmoother {
    /// `alpha` is clamped into (0, 1]; non-finite values disable smoothing.
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha.is_finite() && alpha > 0.0 {
            alpha.min(1.0)
        } else {
            1.0
        };
        Self { alpha, acc: None }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn update(&mut self, x: f32) -> f32 {
        let y = match self.acc {
            None => x,
            Some(prev) => (1.0 - self.alpha) * prev + self.alpha * x,
        };
        self.acc = Some(y);
        y
    }

    pub fn value(&self) -> Option<f32> {
        self.acc
    }

    pub fn reset(&mut self) {
        self.acc = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_before_and_after_fill() {
        let mut m = MedianFilter::new(5);
        assert_eq!(m.median(), None);
        m.add(10);
        assert_eq!(m.median(), Some(10));
        m.add(30);
        m.add(20);
        assert_eq!(m.median(), Some(20));
        for v in [1000, -1000, 21] {
            m.add(v);
        }
        // window: 30 20 1000 -1000 21
        assert_eq!(m.median(), Some(21));
    }

    #[test]
    fn median_rejects_single_spike() {
        let mut m = MedianFilter::new(3);
        for v in [100, 100, 9_000_000] {
            m.add(v);
        }
        assert_eq!(m.median(), Some(100));
    }

    #[test]
    fn iir_seeds_then_blends() {
        let mut f = IirSmoother::new(0.25);
        assert_eq!(f.update(100.0), 100.0);
        let y = f.update(0.0);
        assert!((y - 75.0).abs() < 1e-4);
        f.reset();
        assert_eq!(f.value(), None);
        assert_eq!(f.update(4.0), 4.0);
    }

    #[test]
    fn iir_alpha_is_sanitized() {
        assert_eq!(IirSmoother::new(0.0).alpha(), 1.0);
        assert_eq!(IirSmoother::new(f32::NAN).alpha(), 1.0);
        assert_eq!(IirSmoother::new(3.0).alpha(), 1.0);
        assert_eq!(IirSmoother::new(0.5).alpha(), 0.5);
    }
}
