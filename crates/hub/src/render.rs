//! Output records and their human-readable renderings. JSON output is the
//! plain serde form of the same records.

use std::fmt::Write;

use serde::Serialize;

use plantcare_analysis::dryness::{DrynessReport, ThresholdGuide};
use plantcare_analysis::health::HealthScore;
use plantcare_analysis::light::{LightPlan, LightStatus};
use plantcare_analysis::{Recommendation, TrendSummary};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Analysis result as printed by `analyze` and returned by the API.
/// `recommendation` is null when the series was too short to analyze.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub summary: TrendSummary,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PercentageOutput {
    pub value: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterpretOutput {
    pub report: DrynessReport,
    pub guide: ThresholdGuide,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthOutput {
    pub analysis: AnalysisOutput,
    pub light: LightPlan,
    pub health: Option<HealthScore>,
}

// ---------------------------------------------------------------------------
// Text renderings
// ---------------------------------------------------------------------------

pub fn analysis_text(out: &AnalysisOutput) -> String {
    let report = match &out.summary {
        TrendSummary::Analyzed(report) => report,
        TrendSummary::InsufficientData { readings_count } => {
            return format!("Insufficient data: {readings_count} reading(s), need at least 2\n");
        }
    };

    let mut s = String::new();
    let _ = writeln!(
        s,
        "Readings:   {} over {:.1}h",
        report.readings_count, report.time_span_hours
    );
    let _ = writeln!(
        s,
        "Values:     {} -> {} (change {:+}, min {}, max {})",
        report.first_value,
        report.last_value,
        report.total_change,
        report.min_value,
        report.max_value
    );
    let _ = writeln!(
        s,
        "Average:    {:.2} (std dev {:.2}, stability {})",
        report.average, report.std_deviation, report.stability_score
    );
    let _ = writeln!(
        s,
        "Trend:      {} (slope {:+.2}/step {}, recent {:+.2}/step {})",
        report.trend_type,
        report.regression_slope,
        report.regression_direction,
        report.recent_regression_slope,
        report.recent_direction
    );
    let _ = writeln!(
        s,
        "Rate:       {:+.2} units/h, moisture {:.1}%",
        report.rate_per_hour, report.current_moisture_pct
    );
    if let Some(p) = &report.prediction {
        let _ = write!(s, "Watering:   in {:.1}h", p.hours_until_watering);
        if let Some(at) = p.projected_threshold_reach {
            let _ = write!(s, " (around {at})");
        }
        s.push('\n');
    }
    if let Some(rec) = &out.recommendation {
        s.push_str(&recommendation_text(rec));
    }
    s
}

pub fn recommendation_text(rec: &Recommendation) -> String {
    let mut s = format!(
        "Action:     {} ({}, urgency {})\n",
        rec.action, rec.reason, rec.urgency
    );
    let _ = writeln!(
        s,
        "Moisture:   {:.1}% (raw {})",
        rec.moisture_percentage, rec.raw_value
    );
    if rec.suggested_amount_ml > 0 {
        let _ = writeln!(s, "Amount:     {}ml", rec.suggested_amount_ml);
    }
    s
}

pub fn percentage_text(out: &PercentageOutput) -> String {
    format!("{} -> {:.1}%\n", out.value, out.percentage)
}

pub fn interpret_text(out: &InterpretOutput) -> String {
    let r = &out.report;
    let g = &out.guide;
    let mut s = String::new();
    let _ = writeln!(
        s,
        "{}: {:.1}% dry / {:.1}% wet",
        r.sensor_value, r.dryness_pct, r.wetness_pct
    );
    let _ = writeln!(s, "Status:     {}", r.status);
    let _ = writeln!(s, "Action:     {}", r.action);
    let _ = writeln!(s, "Risk:       {}", r.risk);
    s.push_str("Guide:\n");
    for (label, value) in [
        ("optimal", format!("{:.0}-{:.0}", g.optimal_min, g.optimal_max)),
        ("consider watering", format!("{:.0}", g.water_consider)),
        ("water soon", format!("{:.0}", g.water_soon)),
        ("water now", format!("{:.0}", g.water_now)),
        ("critical", format!("{:.0}", g.critical)),
    ] {
        let _ = writeln!(s, "  {label:<18} {value}");
    }
    s
}

pub fn light_text(plan: &LightPlan) -> String {
    match plan.status {
        LightStatus::TargetMet => format!("{}\n", plan.suggestion),
        LightStatus::NeedsMoreLight => format!(
            "{} min remaining: {}\n",
            plan.remaining_minutes, plan.suggestion
        ),
    }
}

pub fn health_text(out: &HealthOutput) -> String {
    let mut s = analysis_text(&out.analysis);
    s.push_str(&light_text(&out.light));
    if let Some(h) = &out.health {
        let _ = writeln!(s, "Health:     {}/100 ({:?})", h.score, h.status);
        for f in &h.factors {
            let _ = writeln!(s, "  {f}");
        }
    }
    s
}

// ===========================================================================
// Tests
// ===========================================================================
