//! How much grow-light time is still owed today, split into sessions.
//!
//! Planning only: switching the light is somebody else's job.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightPlanner {
    pub daily_target_hours: u32,
    /// Longest single session, in minutes.
    pub session_max_minutes: u32,
}

impl Default for LightPlanner {
    fn default() -> Self {
        Self {
            daily_target_hours: 7,
            session_max_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightStatus {
    TargetMet,
    NeedsMoreLight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightPlan {
    pub status: LightStatus,
    pub remaining_minutes: u32,
    pub sessions_needed: usize,
    pub suggested_sessions: Vec<u32>,
    pub suggestion: String,
}

impl LightPlanner {
    /// Plan the rest of the day given `current_minutes` already delivered.
    ///
    /// Remaining time above the session cap is split into the fewest
    /// sessions that respect it, each `remaining / n` minutes long
    /// (integer division, so up to `n - 1` minutes may be dropped).
    pub fn remaining(&self, current_minutes: u32) -> LightPlan {
        let target = self.daily_target_hours.saturating_mul(60);
        let remaining = target.saturating_sub(current_minutes);

        if remaining == 0 {
            return LightPlan {
                status: LightStatus::TargetMet,
                remaining_minutes: 0,
                sessions_needed: 0,
                suggested_sessions: Vec::new(),
                suggestion: "Daily target achieved".to_string(),
            };
        }

        let max = self.session_max_minutes.max(1);
        let sessions = if remaining <= max {
            vec![remaining]
        } else {
            let count = remaining.div_ceil(max);
            vec![remaining / count; count as usize]
        };

        LightPlan {
            status: LightStatus::NeedsMoreLight,
            remaining_minutes: remaining,
            sessions_needed: sessions.len(),
            suggestion: format!(
                "Provide {} session(s) of {}min each",
                sessions.len(),
                sessions[0]
            ),
            suggested_sessions: sessions,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
