//! Linear raw-to-grams model and its persisted home.

use weigh_traits::KvStore;

use crate::error::WeighError;
use crate::hw_error::map_hw_error;

/// Persistence key for the calibration factor.
pub const KEY_FACTOR: &str = "cal_f";
/// Persistence key for the tare offset.
pub const KEY_TARE: &str = "tare";

/// `grams = (raw - tare_offset) * cal_factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Grams per raw unit.
    pub cal_factor: f32,
    /// Raw reading that represents zero grams.
    pub tare_offset: i32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            cal_factor: 1.0,
            tare_offset: 0,
        }
    }
}

impl Calibration {
    #[inline]
    pub fn to_grams(&self, raw: i32) -> f32 {
        raw.saturating_sub(self.tare_offset) as f32 * self.cal_factor
    }

    /// Factor that maps `net_raw` onto `weight_g`, or `None` when `net_raw`
    /// is zero.
    pub fn factor_for(weight_g: f32, net_raw: i32) -> Option<f32> {
        (net_raw != 0).then(|| weight_g / net_raw as f32)
    }
}

/// Owns the live calibration and writes every change through to a `KvStore`.
///
/// Write failures are returned to the caller, but the in-memory value has
/// already changed by then.
pub struct CalibrationStore<P: KvStore> {
    store: P,
    current: Calibration,
}

impl<P: KvStore> CalibrationStore<P> {
    /// Wrap `store` with default values; call `load` to read persisted ones.
    pub fn new(store: P) -> Self {
        Self {
            store,
            current: Calibration::default(),
        }
    }

    /// `new` followed by `load`.
    pub fn open(store: P) -> Self {
        let mut cs = Self::new(store);
        cs.load();
        cs
    }

    /// Read persisted values, falling back to `Calibration::default()` per key.
    pub fn load(&mut self) -> Calibration {
        let d = Calibration::default();
        self.current = Calibration {
            cal_factor: self.store.get_f32(KEY_FACTOR, d.cal_factor),
            tare_offset: self.store.get_i32(KEY_TARE, d.tare_offset),
        };
        tracing::info!(
            cal_factor = self.current.cal_factor,
            tare_offset = self.current.tare_offset,
            "calibration loaded"
        );
        self.current
    }

    pub fn current(&self) -> Calibration {
        self.current
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Make `raw` the new zero point.
    pub fn tare(&mut self, raw: i32) -> Result<(), WeighError> {
        self.current.tare_offset = raw;
        self.store
            .put_i32(KEY_TARE, raw)
            .map_err(|e| map_hw_error(e.as_ref()))?;
        tracing::info!(tare_offset = raw, "tare saved");
        Ok(())
    }

    /// Replace the calibration factor.
    pub fn set_factor(&mut self, cal_factor: f32) -> Result<(), WeighError> {
        self.current.cal_factor = cal_factor;
        self.store
            .put_f32(KEY_FACTOR, cal_factor)
            .map_err(|e| map_hw_error(e.as_ref()))?;
        tracing::info!(cal_factor, "calibration saved");
        Ok(())
    }
}

impl<P: KvStore> core::fmt::Debug for CalibrationStore<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CalibrationStore")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
