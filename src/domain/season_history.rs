//! Per-season event history as returned by `get_snapshots`.
//!
//! The campaign API keeps the final status of every event of a season. The
//! herald reads it when an event leaves the "current event" slot before its
//! outcome was observed.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{AttackEvent, DefendEvent, EventId, EventStatus};

/// History of one season.
#[derive(Debug, Clone, Deserialize)]
pub struct SeasonHistory {
    /// Upstream response time.
    #[serde(rename = "time", with = "chrono::serde::ts_seconds")]
    pub fetched_at: DateTime<Utc>,
    /// Upstream error code; `0` means healthy.
    pub error_code: i32,
    /// Every defend event of the season.
    #[serde(default)]
    pub defend_events: Vec<DefendEvent>,
    /// Every attack event of the season.
    #[serde(default)]
    pub attack_events: Vec<AttackEvent>,
}

impl SeasonHistory {
    /// Returns the recorded status of defend event `event_id`, if listed.
    #[must_use]
    pub fn defend_status(&self, event_id: EventId) -> Option<EventStatus> {
        self.defend_events
            .iter()
            .find(|e| e.event_id == event_id)
            .map(|e| e.status)
    }
}
