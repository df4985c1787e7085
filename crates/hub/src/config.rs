//! TOML config file loading and validation for the analysis policy:
//! probe calibration, zone thresholds, trend limits, and the light plan.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use plantcare_analysis::light::LightPlanner;
use plantcare_analysis::{Calibration, Thresholds, TrendAnalyzer, TrendLimits};

/// Looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_PATH: &str = "plantcare.toml";

// ---------------------------------------------------------------------------
// Config file structures
// ---------------------------------------------------------------------------

/// Every table and every key is optional; omitted values take the built-in
/// policy defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub trend: TrendLimits,
    #[serde(default)]
    pub light: LightPlanner,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Config {
    /// Validate all sections. Returns `Ok(())` or an error describing every
    /// violation found (not just the first one).
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        self.validate_calibration(&mut errors);
        self.validate_thresholds(&mut errors);
        self.validate_trend(&mut errors);
        self.validate_light(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "config validation failed ({} error{}):\n  - {}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" },
                errors.join("\n  - ")
            );
        }
    }

    fn validate_calibration(&self, errors: &mut Vec<String>) {
        let c = &self.calibration;
        if c.wet_reference < 0 {
            errors.push(format!(
                "calibration: wet_reference must be non-negative, got {}",
                c.wet_reference
            ));
        }
        if c.dry_reference < 0 {
            errors.push(format!(
                "calibration: dry_reference must be non-negative, got {}",
                c.dry_reference
            ));
        }
        if c.wet_reference >= c.dry_reference {
            errors.push(format!(
                "calibration: wet_reference ({}) must be less than dry_reference ({})",
                c.wet_reference, c.dry_reference
            ));
        }
    }

    fn validate_thresholds(&self, errors: &mut Vec<String>) {
        let t = &self.thresholds;

        // ── Zone ordering, wettest to driest ────────────────
        let ladder = [
            ("well_hydrated", t.well_hydrated),
            ("optimal", t.optimal),
            ("water_soon", t.water_soon),
            ("water_now", t.water_now),
        ];
        for pair in ladder.windows(2) {
            let (lo_name, lo) = pair[0];
            let (hi_name, hi) = pair[1];
            if lo >= hi {
                errors.push(format!(
                    "thresholds: {lo_name} ({lo}) must be less than {hi_name} ({hi})"
                ));
            }
        }

        // ── Rates and targets ───────────────────────────────
        if !t.fast_drying_rate.is_finite() || t.fast_drying_rate < 0.0 {
            errors.push(format!(
                "thresholds: fast_drying_rate must be a non-negative number, got {}",
                t.fast_drying_rate
            ));
        }
        if t.watering_threshold <= 0 {
            errors.push(format!(
                "thresholds: watering_threshold must be positive, got {}",
                t.watering_threshold
            ));
        }
    }

    fn validate_trend(&self, errors: &mut Vec<String>) {
        let l = &self.trend;
        let positive = [
            ("stable_std_dev", l.stable_std_dev),
            ("medium_std_dev", l.medium_std_dev),
            ("recent_window_hours", l.recent_window_hours),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                errors.push(format!("trend: {name} must be positive, got {v}"));
            }
        }

        let non_negative = [
            ("significant_change", l.significant_change),
            ("direction_slope", l.direction_slope),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                errors.push(format!("trend: {name} must be non-negative, got {v}"));
            }
        }

        if l.medium_std_dev < l.stable_std_dev {
            errors.push(format!(
                "trend: medium_std_dev ({}) must not be below stable_std_dev ({})",
                l.medium_std_dev, l.stable_std_dev
            ));
        }
    }

    fn validate_light(&self, errors: &mut Vec<String>) {
        let p = &self.light;
        if p.daily_target_hours > 24 {
            errors.push(format!(
                "light: daily_target_hours {} exceeds 24",
                p.daily_target_hours
            ));
        }
        if p.session_max_minutes == 0 {
            errors.push("light: session_max_minutes must be positive".to_string());
        }
    }

    /// Build the analyzer for this policy.
    pub fn analyzer(&self) -> TrendAnalyzer {
        TrendAnalyzer::new(self.calibration, self.thresholds.clone(), self.trend.clone())
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read, parse, and validate a TOML config file.
pub fn load(path: &Path) -> Result<Config> {
    let shown = path.display();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {shown}"))?;
    let config: Config =
        toml::from_str(&contents).with_context(|| format!("failed to parse config: {shown}"))?;
    config
        .validate()
        .with_context(|| format!("invalid config: {shown}"))?;
    Ok(config)
}

/// Load an explicitly named config (which must exist), else the default file
/// if present, else the built-in defaults.
pub fn resolve(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let config = load(path)?;
        tracing::info!(path = %path.display(), "config loaded");
        return Ok(config);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        let config = load(default_path)?;
        tracing::info!(path = DEFAULT_CONFIG_PATH, "config loaded");
        Ok(config)
    } else {
        tracing::debug!("no config file found, using built-in defaults");
        Ok(Config::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
