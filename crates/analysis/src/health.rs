//! Overall plant health score from four yes/no factors.

use serde::{Deserialize, Serialize};

use crate::recommend::{Action, Recommendation};
use crate::trend::{Stability, TrendReport};

const POINTS_PER_FACTOR: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthFactors {
    pub moisture_stable: bool,
    pub moisture_in_range: bool,
    pub light_adequate: bool,
    pub visual_healthy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Concerning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u32,
    pub status: HealthStatus,
    pub factors: Vec<String>,
}

impl HealthFactors {
    /// Moisture factors from an analysis: stable when stability is high, in
    /// range when the recommendation is to do nothing.
    pub fn from_analysis(
        report: &TrendReport,
        recommendation: &Recommendation,
        light_adequate: bool,
        visual_healthy: bool,
    ) -> Self {
        Self {
            moisture_stable: report.stability_score == Stability::High,
            moisture_in_range: recommendation.action == Action::NoAction,
            light_adequate,
            visual_healthy,
        }
    }
}

pub fn score(f: &HealthFactors) -> HealthScore {
    let checks = [
        (f.moisture_stable, "Stable moisture", "Unstable moisture"),
        (f.moisture_in_range, "Optimal moisture level", "Moisture out of range"),
        (f.light_adequate, "Adequate light", "Insufficient light"),
        (f.visual_healthy, "Healthy appearance", "Visual concerns"),
    ];

    let mut score = 0;
    let mut factors = Vec::with_capacity(checks.len());
    for (ok, good, bad) in checks {
        if ok {
            score += POINTS_PER_FACTOR;
            factors.push(good.to_string());
        } else {
            factors.push(format!("warning: {bad}"));
        }
    }

    let status = match score {
        90.. => HealthStatus::Excellent,
        70..=89 => HealthStatus::Good,
        50..=69 => HealthStatus::Fair,
        _ => HealthStatus::Concerning,
    };

    HealthScore {
        score,
        status,
        factors,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
