//! Policy constants for trend classification and watering decisions.
//!
//! Each analysis policy defines its own zone boundaries; nothing in the
//! analyzer hardcodes them. The defaults below are one such policy.

use serde::{Deserialize, Serialize};

/// Sensor-unit zone boundaries and watering volumes.
///
/// Zones, from driest to wettest:
///
/// ```text
///   >= water_now       WATER_NOW
///   >= water_soon      WATER_SOON
///   >= optimal         optimal band (NO_ACTION, or MONITOR_CLOSELY when drying fast)
///   >= well_hydrated   NO_ACTION (well hydrated)
///   <  well_hydrated   CHECK_DRAINAGE
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub water_now: i64,
    pub water_soon: i64,
    pub optimal: i64,
    pub well_hydrated: i64,
    /// Drying rate (units/hour) above which the optimal band asks for
    /// closer monitoring.
    pub fast_drying_rate: f64,
    /// Target used when projecting hours until watering.
    pub watering_threshold: i64,
    pub water_now_ml: u32,
    pub water_soon_ml: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            water_now: 2400,
            water_soon: 2200,
            optimal: 1900,
            well_hydrated: 1500,
            fast_drying_rate: 40.0,
            watering_threshold: 2200,
            water_now_ml: 10,
            water_soon_ml: 15,
        }
    }
}

/// Limits for the qualitative trend labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendLimits {
    /// Standard deviation below which a series counts as highly stable.
    pub stable_std_dev: f64,
    /// Standard deviation below which stability is medium.
    pub medium_std_dev: f64,
    /// Total change (units) that separates drying/moistening from noise.
    pub significant_change: f64,
    /// Per-step regression slope below which the direction is "stable".
    pub direction_slope: f64,
    /// Width of the recent-trend window, ending at the last reading.
    pub recent_window_hours: f64,
}

impl Default for TrendLimits {
    fn default() -> Self {
        Self {
            stable_std_dev: 10.0,
            medium_std_dev: 30.0,
            significant_change: 20.0,
            direction_slope: 1.0,
            recent_window_hours: 24.0,
        }
    }
}
