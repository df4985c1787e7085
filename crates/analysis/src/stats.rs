//! Small numeric helpers shared by the trend analysis.

use crate::reading::Reading;

pub(crate) const SECS_PER_HOUR: f64 = 3600.0;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n, not n - 1).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Ordinary least-squares slope of `values` against the synthetic index
/// 0..n-1, i.e. change per sample step, not per unit of time.
///
/// Returns 0 when the fit is degenerate (fewer than two points).
pub fn index_regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mean_x = (n as f64 - 1.0) / 2.0;
    let mean_y = mean(values);

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Absolute elapsed time between two readings, in hours.
pub fn elapsed_hours(first: &Reading, last: &Reading) -> f64 {
    (last.timestamp - first.timestamp).abs().as_seconds_f64() / SECS_PER_HOUR
}

/// Endpoint rate: value change between `first` and `last` divided by the
/// real time between them. Zero when no time has elapsed.
pub fn endpoint_rate_per_hour(first: &Reading, last: &Reading) -> f64 {
    let hours = elapsed_hours(first, last);
    if hours > 0.0 {
        (last.value as f64 - first.value as f64) / hours
    } else {
        0.0
    }
}

// ===========================================================================
// Tests
// ===========================================================================
