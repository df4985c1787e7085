//! Watering recommendation: a fixed threshold ladder over the current value,
//! with the optimal band escalating when the soil is drying fast.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::thresholds::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    WaterNow,
    WaterSoon,
    MonitorClosely,
    NoAction,
    CheckDrainage,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaterNow => write!(f, "WATER_NOW"),
            Self::WaterSoon => write!(f, "WATER_SOON"),
            Self::MonitorClosely => write!(f, "MONITOR_CLOSELY"),
            Self::NoAction => write!(f, "NO_ACTION"),
            Self::CheckDrainage => write!(f, "CHECK_DRAINAGE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub reason: String,
    pub urgency: Urgency,
    pub moisture_percentage: f64,
    pub raw_value: i64,
    pub suggested_amount_ml: u32,
}

/// Map a current value and recent drying rate (units/hour, positive = drying)
/// to an action. Boundaries are inclusive on the lower edge of each zone.
pub fn recommend(
    thresholds: &Thresholds,
    calibration: &Calibration,
    current_value: i64,
    recent_rate: f64,
) -> Recommendation {
    let (action, reason, urgency) = if current_value >= thresholds.water_now {
        (Action::WaterNow, "Soil is dry", Urgency::High)
    } else if current_value >= thresholds.water_soon {
        (Action::WaterSoon, "Soil getting dry", Urgency::Medium)
    } else if current_value >= thresholds.optimal {
        if recent_rate > thresholds.fast_drying_rate {
            (Action::MonitorClosely, "Drying quickly", Urgency::Low)
        } else {
            (Action::NoAction, "Moisture optimal", Urgency::None)
        }
    } else if current_value >= thresholds.well_hydrated {
        (Action::NoAction, "Well hydrated", Urgency::None)
    } else {
        (Action::CheckDrainage, "May be too wet", Urgency::Medium)
    };

    let suggested_amount_ml = match action {
        Action::WaterNow => thresholds.water_now_ml,
        Action::WaterSoon => thresholds.water_soon_ml,
        _ => 0,
    };

    Recommendation {
        action,
        reason: reason.to_string(),
        urgency,
        moisture_percentage: calibration.to_percentage(current_value),
        raw_value: current_value,
        suggested_amount_ml,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
