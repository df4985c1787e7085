use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use plantcare_analysis::light::LightPlanner;
use plantcare_analysis::{Calibration, Thresholds, TrendAnalyzer, TrendLimits};

/// Maximum number of events retained in the ring buffer.
const MAX_EVENTS: usize = 100;

// ---------------------------------------------------------------------------
// Public type alias
// ---------------------------------------------------------------------------

pub type SharedState = Arc<RwLock<HubState>>;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Analysis policy plus a short in-memory history of what the API served.
/// Nothing here outlives the process.
pub struct HubState {
    pub started_at: Instant,
    pub analyzer: TrendAnalyzer,
    pub light: LightPlanner,
    pub analyses: u64,
    pub events: VecDeque<HubEvent>,
}

#[derive(Clone, Serialize)]
pub struct HubEvent {
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub kind: EventKind,
    pub detail: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Analysis,
    Recommendation,
    Error,
    System,
}

// ---------------------------------------------------------------------------
// JSON response (what the API returns)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_secs: u64,
    pub analyses: u64,
    pub calibration: Calibration,
    pub thresholds: Thresholds,
    pub trend: TrendLimits,
    pub light: LightPlanner,
    pub events: Vec<HubEvent>,
}

// ---------------------------------------------------------------------------
// Construction & mutation
// ---------------------------------------------------------------------------

impl HubState {
    pub fn new(analyzer: TrendAnalyzer, light: LightPlanner) -> Self {
        Self {
            started_at: Instant::now(),
            analyzer,
            light,
            analyses: 0,
            events: VecDeque::with_capacity(MAX_EVENTS),
        }
    }

    pub fn shared(analyzer: TrendAnalyzer, light: LightPlanner) -> SharedState {
        Arc::new(RwLock::new(Self::new(analyzer, light)))
    }

    /// Record a completed series analysis.
    pub fn record_analysis(&mut self, readings: usize, detail: String) {
        self.analyses += 1;
        self.push_event(EventKind::Analysis, format!("{readings} reading(s): {detail}"));
    }

    pub fn record_recommendation(&mut self, detail: String) {
        self.push_event(EventKind::Recommendation, detail);
    }

    /// Record a rejected request.
    pub fn record_error(&mut self, detail: String) {
        self.push_event(EventKind::Error, detail);
    }

    pub fn record_system(&mut self, detail: String) {
        self.push_event(EventKind::System, detail);
    }

    /// Build the JSON-serialisable status snapshot, newest event first.
    pub fn to_status(&self) -> StatusResponse {
        StatusResponse {
            uptime_secs: self.started_at.elapsed().as_secs(),
            analyses: self.analyses,
            calibration: *self.analyzer.calibration(),
            thresholds: self.analyzer.thresholds().clone(),
            trend: self.analyzer.limits().clone(),
            light: self.light.clone(),
            events: self.events.iter().rev().cloned().collect(),
        }
    }

    fn push_event(&mut self, kind: EventKind, detail: String) {
        if self.events.len() >= MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(HubEvent {
            ts: OffsetDateTime::now_utc(),
            kind,
            detail,
        });
    }
}

// ===========================================================================
// Tests
// ===========================================================================
