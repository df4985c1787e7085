//! Trend analysis over a reading series.
//!
//! Two slope estimates coexist and are deliberately kept apart:
//!
//! - `regression_slope`: least-squares fit against the sample index, in
//!   units per step. Feeds the direction labels.
//! - `rate_per_hour`: first-to-last value change over real elapsed time.
//!   Feeds the watering projection and the recommendation.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::calibration::Calibration;
use crate::reading::{Reading, ReadingSeries};
use crate::recommend::{self, Recommendation};
use crate::stats::{self, SECS_PER_HOUR};
use crate::thresholds::{Thresholds, TrendLimits};

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendType {
    Stable,
    /// Sensor value rising, i.e. soil getting drier.
    Drying,
    Moistening,
    Fluctuating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Stable,
    Rising,
    Declining,
}

impl fmt::Display for TrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Drying => write!(f, "drying"),
            Self::Moistening => write!(f, "moistening"),
            Self::Fluctuating => write!(f, "fluctuating"),
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Rising => write!(f, "rising"),
            Self::Declining => write!(f, "declining"),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// When the watering threshold will be reached at the current drying rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Full precision; not rounded for display.
    pub hours_until_watering: f64,
    /// `None` only if the projection falls outside the representable
    /// calendar range.
    #[serde(with = "time::serde::rfc3339::option")]
    pub projected_threshold_reach: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub readings_count: usize,
    pub first_value: i64,
    pub last_value: i64,
    /// `last_value - first_value`, saturating at the `i64` bounds.
    pub total_change: i64,
    pub min_value: i64,
    pub max_value: i64,
    /// Full precision; not rounded for display.
    pub average: f64,
    /// Population standard deviation, full precision.
    pub std_deviation: f64,
    pub time_span_hours: f64,
    pub stability_score: Stability,
    pub trend_type: TrendType,
    /// Per-step least-squares slope over the whole series.
    pub regression_slope: f64,
    pub regression_direction: Direction,
    /// Per-step slope over the recent window only.
    pub recent_regression_slope: f64,
    pub recent_direction: Direction,
    /// Endpoint rate in sensor units per hour, full precision.
    pub rate_per_hour: f64,
    /// Rounded to one decimal, like every moisture percentage.
    pub current_moisture_pct: f64,
    pub prediction: Option<Prediction>,
}

/// Outcome of [`TrendAnalyzer::analyze`]. Callers must check for
/// `InsufficientData` before relying on any numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendSummary {
    InsufficientData { readings_count: usize },
    Analyzed(TrendReport),
}

impl TrendSummary {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    pub fn report(&self) -> Option<&TrendReport> {
        match self {
            Self::Analyzed(report) => Some(report),
            Self::InsufficientData { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Stateless analyzer; the policy is fixed at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendAnalyzer {
    calibration: Calibration,
    thresholds: Thresholds,
    limits: TrendLimits,
}

impl TrendAnalyzer {
    pub fn new(calibration: Calibration, thresholds: Thresholds, limits: TrendLimits) -> Self {
        Self {
            calibration,
            thresholds,
            limits,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn limits(&self) -> &TrendLimits {
        &self.limits
    }

    pub fn to_percentage(&self, value: i64) -> f64 {
        self.calibration.to_percentage(value)
    }

    pub fn recommend(&self, current_value: i64, recent_rate: f64) -> Recommendation {
        recommend::recommend(&self.thresholds, &self.calibration, current_value, recent_rate)
    }

    /// Recommendation for the latest value of an analyzed series, using its
    /// endpoint rate.
    pub fn recommend_for(&self, report: &TrendReport) -> Recommendation {
        self.recommend(report.last_value, report.rate_per_hour)
    }

    pub fn analyze(&self, series: &ReadingSeries) -> TrendSummary {
        if series.len() < 2 {
            debug!(readings = series.len(), "not enough readings to analyze");
            return TrendSummary::InsufficientData {
                readings_count: series.len(),
            };
        }

        let readings = series.sorted();
        let (first, last) = match (readings.first(), readings.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return TrendSummary::InsufficientData {
                    readings_count: readings.len(),
                }
            }
        };

        let values: Vec<f64> = readings.iter().map(|r| r.value as f64).collect();
        let min_value = readings.iter().map(|r| r.value).min().unwrap_or(first.value);
        let max_value = readings.iter().map(|r| r.value).max().unwrap_or(first.value);
        let average = stats::mean(&values);
        let std_deviation = stats::population_std_dev(&values);
        let total_change = last.value.saturating_sub(first.value);

        let stability_score = self.stability(std_deviation);
        let trend_type = self.trend_type(total_change, std_deviation);

        let regression_slope = stats::index_regression_slope(&values);
        let recent_regression_slope = self
            .recent_slope(&readings, &last)
            .unwrap_or(regression_slope);

        let rate_per_hour = stats::endpoint_rate_per_hour(&first, &last);
        let prediction = self.predict(trend_type, rate_per_hour, &last);

        debug!(
            readings = readings.len(),
            %trend_type,
            %stability_score,
            rate_per_hour,
            regression_slope,
            "series analyzed"
        );

        TrendSummary::Analyzed(TrendReport {
            readings_count: readings.len(),
            first_value: first.value,
            last_value: last.value,
            total_change,
            min_value,
            max_value,
            average,
            std_deviation,
            time_span_hours: stats::elapsed_hours(&first, &last),
            stability_score,
            trend_type,
            regression_slope,
            regression_direction: self.direction(regression_slope),
            recent_regression_slope,
            recent_direction: self.direction(recent_regression_slope),
            rate_per_hour,
            current_moisture_pct: self.calibration.to_percentage(last.value),
            prediction,
        })
    }

    // -- Classification ------------------------------------------------------

    fn stability(&self, std_dev: f64) -> Stability {
        if std_dev < self.limits.stable_std_dev {
            Stability::High
        } else if std_dev < self.limits.medium_std_dev {
            Stability::Medium
        } else {
            Stability::Low
        }
    }

    fn trend_type(&self, total_change: i64, std_dev: f64) -> TrendType {
        let change = total_change as f64;
        let significant = self.limits.significant_change;
        if std_dev < self.limits.stable_std_dev && change.abs() < significant {
            TrendType::Stable
        } else if change > significant {
            TrendType::Drying
        } else if change < -significant {
            TrendType::Moistening
        } else {
            TrendType::Fluctuating
        }
    }

    fn direction(&self, slope: f64) -> Direction {
        if slope.abs() < self.limits.direction_slope {
            Direction::Stable
        } else if slope > 0.0 {
            Direction::Rising
        } else {
            Direction::Declining
        }
    }

    /// Regression slope over readings within the recent window ending at
    /// `last`. `None` when the window holds fewer than two readings.
    fn recent_slope(&self, readings: &[Reading], last: &Reading) -> Option<f64> {
        let window = Duration::checked_seconds_f64(self.limits.recent_window_hours * SECS_PER_HOUR)?;
        let since = last.timestamp.checked_sub(window)?;
        let recent: Vec<f64> = readings
            .iter()
            .filter(|r| r.timestamp >= since)
            .map(|r| r.value as f64)
            .collect();
        if recent.len() < 2 {
            return None;
        }
        Some(stats::index_regression_slope(&recent))
    }

    // -- Projection -----------------------------------------------------------

    fn predict(&self, trend_type: TrendType, rate_per_hour: f64, last: &Reading) -> Option<Prediction> {
        let threshold = self.thresholds.watering_threshold;
        if trend_type != TrendType::Drying || rate_per_hour <= 0.0 || last.value >= threshold {
            return None;
        }

        let remaining = threshold as f64 - last.value as f64;
        let seconds = remaining * SECS_PER_HOUR / rate_per_hour;
        let projected_threshold_reach = Duration::checked_seconds_f64(seconds)
            .and_then(|d| last.timestamp.checked_add(d));

        Some(Prediction {
            hours_until_watering: remaining / rate_per_hour,
            projected_threshold_reach,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::Action;
    use time::macros::datetime;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    /// Build a series from (minutes after 00:00 UTC, value) pairs.
    fn series_at(points: &[(i64, i64)]) -> ReadingSeries {
        let base = datetime!(2025-10-22 00:00 UTC);
        points
            .iter()
            .map(|&(min, v)| Reading::new(base + Duration::minutes(min), v))
            .collect()
    }

    fn scenario_series() -> ReadingSeries {
        ReadingSeries::from_json(
            r#"[
                ["2025-10-22T22:23:51Z", 1829],
                ["2025-10-22T22:36:16Z", 1835],
                ["2025-10-22T22:49:04Z", 1847],
                ["2025-10-22T23:00:49Z", 1844]
            ]"#,
        )
        .unwrap()
    }

    fn analyzed(summary: TrendSummary) -> TrendReport {
        match summary {
            TrendSummary::Analyzed(report) => report,
            other => panic!("expected an analyzed report, got {other:?}"),
        }
    }

    // -- Insufficient data ---------------------------------------------------

    #[test]
    fn empty_series_is_insufficient() {
        let summary = TrendAnalyzer::default().analyze(&ReadingSeries::default());
        assert_eq!(summary, TrendSummary::InsufficientData { readings_count: 0 });
        assert!(summary.is_insufficient());
        assert!(summary.report().is_none());
    }

    #[test]
    fn single_reading_is_insufficient() {
        let summary = TrendAnalyzer::default().analyze(&series_at(&[(0, 2000)]));
        assert_eq!(summary, TrendSummary::InsufficientData { readings_count: 1 });
    }

    #[test]
    fn insufficient_serializes_flagged() {
        let summary = TrendAnalyzer::default().analyze(&ReadingSeries::default());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["readings_count"], 0);
    }

    // -- Concrete scenario ----------------------------------------------------

    #[test]
    fn scenario_statistics() {
        let r = analyzed(TrendAnalyzer::default().analyze(&scenario_series()));
        assert_eq!(r.readings_count, 4);
        assert_eq!(r.first_value, 1829);
        assert_eq!(r.last_value, 1844);
        assert_eq!(r.total_change, 15);
        assert_eq!(r.min_value, 1829);
        assert_eq!(r.max_value, 1847);
        assert!(approx(r.average, 1838.75));
        assert!(approx(r.regression_slope, 5.7));
        assert_eq!(r.regression_direction, Direction::Rising);
        assert_eq!(r.current_moisture_pct, 67.7);
    }

    #[test]
    fn scenario_classification_follows_std_dev_rule() {
        // Population std dev is ~7.15 (< 10) and |change| = 15 (< 20).
        let r = analyzed(TrendAnalyzer::default().analyze(&scenario_series()));
        assert!(approx(r.std_deviation, (204.75f64 / 4.0).sqrt()));
        assert!(r.std_deviation < 10.0);
        assert_eq!(r.stability_score, Stability::High);
        assert_eq!(r.trend_type, TrendType::Stable);
        assert!(r.prediction.is_none());
    }

    #[test]
    fn scenario_rate_is_endpoint_based() {
        let r = analyzed(TrendAnalyzer::default().analyze(&scenario_series()));
        // 22:23:51 -> 23:00:49 is 2218 s.
        assert!(approx(r.time_span_hours, 2218.0 / 3600.0));
        assert!(approx(r.rate_per_hour, 15.0 / (2218.0 / 3600.0)));
        // The two slopes are different estimates and must not coincide.
        assert!(!approx(r.rate_per_hour, r.regression_slope));
    }

    #[test]
    fn scenario_recommendation() {
        let analyzer = TrendAnalyzer::default();
        let r = analyzed(analyzer.analyze(&scenario_series()));
        let rec = analyzer.recommend_for(&r);
        assert_eq!(rec.action, Action::NoAction);
        assert_eq!(rec.reason, "Well hydrated");
    }

    // -- Properties -----------------------------------------------------------

    #[test]
    fn analyze_is_idempotent() {
        let analyzer = TrendAnalyzer::default();
        let series = scenario_series();
        let a = analyzer.analyze(&series.clone());
        let b = analyzer.analyze(&series.clone());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn analyze_is_order_invariant() {
        let analyzer = TrendAnalyzer::default();
        let points: Vec<(i64, i64)> = (0..40).map(|i| (i * 17, 1900 + (i * 37) % 113)).collect();
        let sorted = series_at(&points);
        let expected = analyzer.analyze(&sorted);

        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..10 {
            let mut shuffled = sorted.readings().to_vec();
            rng.shuffle(&mut shuffled);
            assert_eq!(analyzer.analyze(&ReadingSeries::new(shuffled)), expected);
        }
    }

    #[test]
    fn analyze_does_not_mutate_input() {
        let series = series_at(&[(60, 2100), (0, 2000)]);
        let before = series.clone();
        TrendAnalyzer::default().analyze(&series);
        assert_eq!(series, before);
    }

    #[test]
    fn same_timestamp_readings_have_zero_rate() {
        let series = series_at(&[(0, 2000), (0, 2300)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.rate_per_hour, 0.0);
        assert_eq!(r.time_span_hours, 0.0);
        assert_eq!(r.trend_type, TrendType::Drying);
        // Zero rate means no projection even though the soil is "drying".
        assert!(r.prediction.is_none());
    }

    // -- Trend labels ---------------------------------------------------------

    #[test]
    fn drying_series_projects_watering_time() {
        let series = series_at(&[(0, 2000), (60, 2030), (120, 2060), (180, 2090)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.trend_type, TrendType::Drying);
        assert_eq!(r.stability_score, Stability::Low);
        assert!(approx(r.rate_per_hour, 30.0));

        let p = r.prediction.expect("drying series below threshold projects");
        assert!(approx(p.hours_until_watering, 110.0 / 30.0));
        assert_eq!(
            p.projected_threshold_reach,
            Some(datetime!(2025-10-22 06:40 UTC))
        );
    }

    #[test]
    fn no_projection_once_threshold_reached() {
        let series = series_at(&[(0, 2150), (60, 2200), (120, 2250)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.trend_type, TrendType::Drying);
        assert!(r.prediction.is_none());
    }

    #[test]
    fn moistening_series() {
        let series = series_at(&[(0, 2300), (30, 2100), (60, 1950)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.trend_type, TrendType::Moistening);
        assert_eq!(r.total_change, -350);
        assert_eq!(r.regression_direction, Direction::Declining);
        assert!(r.rate_per_hour < 0.0);
        assert!(r.prediction.is_none());
    }

    #[test]
    fn fluctuating_series() {
        let series = series_at(&[(0, 2000), (10, 2050), (20, 1990), (30, 2010)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.total_change, 10);
        assert!(r.std_deviation >= 10.0);
        assert_eq!(r.trend_type, TrendType::Fluctuating);
    }

    #[test]
    fn change_of_exactly_twenty_is_fluctuating() {
        // std dev of [2000, 2020] is 10, so not stable; change is not > 20.
        let series = series_at(&[(0, 2000), (60, 2020)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.trend_type, TrendType::Fluctuating);
        assert_eq!(r.stability_score, Stability::Medium);
    }

    #[test]
    fn flat_series_is_stable() {
        let series = series_at(&[(0, 2000), (60, 2000), (120, 2000)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.trend_type, TrendType::Stable);
        assert_eq!(r.regression_direction, Direction::Stable);
        assert_eq!(r.regression_slope, 0.0);
    }

    // -- Recent window ----------------------------------------------------------

    #[test]
    fn recent_slope_uses_last_day_only() {
        // A long fall, then the last day rising.
        let day = 24 * 60;
        let series = series_at(&[
            (0, 2600),
            (day / 2, 2400),
            (day - 60, 2200),
            (day + 60, 2000),
            (day + day / 2, 2100),
            (2 * day, 2200),
        ]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.regression_direction, Direction::Declining);
        assert_eq!(r.recent_direction, Direction::Rising);
        assert!(approx(r.recent_regression_slope, 100.0));
    }

    #[test]
    fn recent_slope_falls_back_to_overall() {
        // Only the last reading falls inside the window.
        let series = series_at(&[(0, 2000), (3 * 24 * 60, 2300)]);
        let r = analyzed(TrendAnalyzer::default().analyze(&series));
        assert_eq!(r.recent_regression_slope, r.regression_slope);
    }

    // -- Policy injection -------------------------------------------------------

    #[test]
    fn custom_limits_change_classification() {
        let limits = TrendLimits {
            stable_std_dev: 50.0,
            significant_change: 500.0,
            ..TrendLimits::default()
        };
        let analyzer = TrendAnalyzer::new(Calibration::default(), Thresholds::default(), limits);
        let series = series_at(&[(0, 2000), (60, 2030), (120, 2060), (180, 2090)]);
        let r = analyzed(analyzer.analyze(&series));
        assert_eq!(r.trend_type, TrendType::Stable);
        assert_eq!(r.stability_score, Stability::High);
    }

    #[test]
    fn custom_watering_threshold_moves_projection() {
        let thresholds = Thresholds {
            watering_threshold: 2390,
            ..Thresholds::default()
        };
        let analyzer = TrendAnalyzer::new(Calibration::default(), thresholds, TrendLimits::default());
        let series = series_at(&[(0, 2000), (60, 2030), (120, 2060), (180, 2090)]);
        let p = analyzed(analyzer.analyze(&series)).prediction.unwrap();
        assert!(approx(p.hours_until_watering, 10.0));
    }

    // -- Extreme values -------------------------------------------------------

    #[test]
    fn full_i64_range_is_analyzed_without_overflow() {
        let report = analyzed(TrendAnalyzer::default().analyze(&series_at(&[
            (0, i64::MIN),
            (60, i64::MAX),
        ])));
        assert_eq!(report.total_change, i64::MAX);
        assert_eq!(report.min_value, i64::MIN);
        assert_eq!(report.max_value, i64::MAX);
        assert_eq!(report.trend_type, TrendType::Drying);
        assert!(report.rate_per_hour.is_finite() && report.rate_per_hour > 0.0);
        assert_eq!(report.current_moisture_pct, 0.0);
        assert!(report.prediction.is_none());
    }

    #[test]
    fn falling_to_i64_min_saturates_change() {
        let report = analyzed(TrendAnalyzer::default().analyze(&series_at(&[
            (0, i64::MAX),
            (60, i64::MIN),
        ])));
        assert_eq!(report.total_change, i64::MIN);
        assert_eq!(report.trend_type, TrendType::Moistening);
        assert_eq!(report.current_moisture_pct, 100.0);
    }

    #[test]
    fn projection_from_far_below_threshold_does_not_overflow() {
        let report = analyzed(TrendAnalyzer::default().analyze(&series_at(&[
            (0, i64::MIN),
            (60, i64::MIN + 1_000_000),
        ])));
        let p = report.prediction.unwrap();
        assert!(p.hours_until_watering.is_finite() && p.hours_until_watering > 0.0);
        assert!(p.projected_threshold_reach.is_none());
    }

    // -- Serialization ----------------------------------------------------------

    #[test]
    fn report_serializes_with_status_and_labels() {
        let series = series_at(&[(0, 2000), (60, 2030), (120, 2060), (180, 2090)]);
        let json = serde_json::to_value(TrendAnalyzer::default().analyze(&series)).unwrap();
        assert_eq!(json["status"], "analyzed");
        assert_eq!(json["trend_type"], "drying");
        assert_eq!(json["stability_score"], "low");
        assert_eq!(json["regression_direction"], "rising");
        assert_eq!(json["first_value"], 2000);
        assert_eq!(
            json["prediction"]["projected_threshold_reach"],
            "2025-10-22T06:40:00Z"
        );
    }

    #[test]
    fn summary_round_trips_through_json() {
        let summary = TrendAnalyzer::default().analyze(&scenario_series());
        let json = serde_json::to_string(&summary).unwrap();
        let back: TrendSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.report().map(|r| r.last_value), Some(1844));
    }
}
