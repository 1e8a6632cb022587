//! Fixed-capacity circular sample buffer.

/// Ring of the last `capacity` samples.
///
/// Storage is allocated once in `new`; `push` never allocates. Once full,
/// each push overwrites the oldest sample.
#[derive(Debug, Clone)]
pub struct SampleWindow<T> {
    buf: Box<[T]>,
    next: usize,
    len: usize,
}

impl<T: Copy + Default> SampleWindow<T> {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![T::default(); capacity.max(1)].into_boxed_slice(),
            next: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, v: T) {
        self.buf[self.next] = v;
        self.next = (self.next + 1) % self.buf.len();
        if self.len < self.buf.len() {
            self.len += 1;
        }
    }

    /// Samples currently held (grows until `capacity`).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    pub fn clear(&mut self) {
        self.next = 0;
        self.len = 0;
    }

    /// Held samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let cap = self.buf.len();
        let start = (self.next + cap - self.len) % cap;
        (0..self.len).map(move |i| self.buf[(start + i) % cap])
    }
}

impl SampleWindow<f32> {
    /// Arithmetic mean, `None` when empty. Accumulates in `f64`.
    pub fn mean(&self) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        let sum: f64 = self.iter().map(f64::from).sum();
        Some((sum / self.len as f64) as f32)
    }

    /// Population standard deviation, `None` when empty.
    pub fn stddev(&self) -> Option<f32> {
        let mu = f64::from(self.mean()?);
        let var = self
            .iter()
            .map(|v| {
                let d = f64::from(v) - mu;
                d * d
            })
            .sum::<f64>()
            / self.len as f64;
        Some(var.sqrt() as f32)
    }
}
