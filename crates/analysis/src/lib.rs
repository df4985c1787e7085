//! Moisture-trend analysis and watering decisions for a single soil probe.
//!
//! Everything here is a pure computation over an already-materialized
//! [`ReadingSeries`]: no I/O, no shared state. Sensor values are raw,
//! uncalibrated ADC units where a higher value means drier soil.

pub mod calibration;
pub mod dryness;
pub mod error;
pub mod health;
pub mod light;
pub mod reading;
pub mod recommend;
pub mod stats;
pub mod thresholds;
pub mod trend;

pub use calibration::Calibration;
pub use error::{AnalysisError, Result};
pub use reading::{RawReading, Reading, ReadingSeries};
pub use recommend::{Action, Recommendation, Urgency};
pub use thresholds::{Thresholds, TrendLimits};
pub use trend::{TrendAnalyzer, TrendReport, TrendSummary};
