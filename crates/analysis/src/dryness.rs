//! Dryness interpretation of a single reading, and the sensor values that
//! correspond to fixed dryness fractions of the calibrated range.

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;

/// Dryness band upper bounds (percent dry) and their labels, wettest first.
const BANDS: &[(f64, &str, &str, &str)] = &[
    (
        20.0,
        "VERY WET",
        "NO watering needed. Monitor for overwatering signs.",
        "Possible overwatering if sustained",
    ),
    (
        35.0,
        "MOIST (Optimal)",
        "NO watering needed. This is ideal moisture.",
        "Low - good range",
    ),
    (
        50.0,
        "MODERATE",
        "Monitor closely. Consider watering soon.",
        "Low-Medium - approaching dry threshold",
    ),
    (
        65.0,
        "GETTING DRY",
        "WATER SOON. Top inch+ likely dry.",
        "Medium - needs attention",
    ),
    (
        80.0,
        "DRY",
        "WATER NOW. Soil is dry.",
        "High - plant stress possible",
    ),
];

const VERY_DRY: (&str, &str, &str) = (
    "VERY DRY",
    "WATER IMMEDIATELY! Leaf drop likely.",
    "Critical - rapid decline risk",
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrynessReport {
    pub sensor_value: i64,
    pub dryness_pct: f64,
    pub wetness_pct: f64,
    pub status: String,
    pub action: String,
    pub risk: String,
}

/// Sensor values at fixed dryness fractions of the calibrated range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdGuide {
    /// 15% dry.
    pub optimal_min: f64,
    /// 40% dry.
    pub optimal_max: f64,
    /// 50% dry.
    pub water_consider: f64,
    /// 55% dry.
    pub water_soon: f64,
    /// 65% dry.
    pub water_now: f64,
    /// 75% dry.
    pub critical: f64,
}

pub fn interpret(calibration: &Calibration, value: i64) -> DrynessReport {
    let dryness_pct = calibration.dryness_percentage(value);

    let (status, action, risk) = BANDS
        .iter()
        .find(|(upper, ..)| dryness_pct < *upper)
        .map(|&(_, status, action, risk)| (status, action, risk))
        .unwrap_or(VERY_DRY);

    DrynessReport {
        sensor_value: value,
        dryness_pct,
        wetness_pct: 100.0 - dryness_pct,
        status: status.to_string(),
        action: action.to_string(),
        risk: risk.to_string(),
    }
}

pub fn threshold_guide(calibration: &Calibration) -> ThresholdGuide {
    ThresholdGuide {
        optimal_min: calibration.value_at(0.15),
        optimal_max: calibration.value_at(0.40),
        water_consider: calibration.value_at(0.50),
        water_soon: calibration.value_at(0.55),
        water_now: calibration.value_at(0.65),
        critical: calibration.value_at(0.75),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
