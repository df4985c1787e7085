//! Raw sensor value to moisture percentage, using the probe's wet and dry
//! calibration endpoints.

use serde::{Deserialize, Serialize};

/// Calibration endpoints of a single probe, in raw sensor units.
///
/// `wet_reference` is the reading with the probe immersed in water,
/// `dry_reference` the reading in dry air. Higher values are drier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub wet_reference: i64,
    pub dry_reference: i64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            wet_reference: 1100,
            dry_reference: 3400,
        }
    }
}

impl Calibration {
    pub fn new(wet_reference: i64, dry_reference: i64) -> Self {
        Self {
            wet_reference,
            dry_reference,
        }
    }

    pub fn range(&self) -> i64 {
        self.dry_reference.saturating_sub(self.wet_reference)
    }

    /// Moisture percentage: 100 at or below the wet reference, 0 at or above
    /// the dry reference, linear in between and rounded to one decimal.
    pub fn to_percentage(&self, value: i64) -> f64 {
        if value <= self.wet_reference {
            return 100.0;
        }
        if value >= self.dry_reference {
            return 0.0;
        }
        let frac = (value as f64 - self.wet_reference as f64) / self.range() as f64;
        round_to(100.0 * (1.0 - frac), 1)
    }

    /// How far `value` sits from the wet end toward the dry end, in percent.
    /// Not clamped: readings outside the calibrated range land below 0 or
    /// above 100.
    pub fn dryness_percentage(&self, value: i64) -> f64 {
        let range = self.range();
        if range == 0 {
            return 0.0; // degenerate calibration
        }
        (value as f64 - self.wet_reference as f64) / range as f64 * 100.0
    }

    /// Raw sensor value sitting `fraction` of the way from wet to dry.
    pub fn value_at(&self, fraction: f64) -> f64 {
        self.wet_reference as f64 + self.range() as f64 * fraction
    }
}

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}

// ===========================================================================
// Tests
// ===========================================================================
