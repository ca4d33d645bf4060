//! Campaign snapshots as returned by `get_campaign_status`.
//!
//! A [`Snapshot`] is one poll's full observation. Only its
//! [`DefendEvent`] feeds reconciliation; faction standings, attack events
//! and statistics are persisted verbatim for history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DefendEvent, EventId, EventStatus};

/// One faction's standing in the current season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FactionStatus {
    /// Season number.
    pub season: i32,
    /// Points held by the faction.
    pub points: i32,
    /// Points taken from the faction.
    pub points_taken: i32,
    /// Points needed to conquer the faction.
    pub points_max: i32,
    /// Upstream status string (`active`, `defeated`, ...).
    pub status: String,
    /// Order in which the faction entered the war.
    pub introduction_order: i32,
}

/// An attack event (Super Earth attacking an enemy region).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttackEvent {
    /// Season number.
    pub season: i32,
    /// Upstream event id.
    pub event_id: EventId,
    /// Start of the event.
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = i64)]
    pub start_time: DateTime<Utc>,
    /// Deadline of the event.
    #[serde(with = "chrono::serde::ts_seconds")]
    #[schema(value_type = i64)]
    pub end_time: DateTime<Utc>,
    /// Faction being attacked.
    pub enemy: i32,
    /// Points needed to win.
    pub points_max: i32,
    /// Points gathered so far.
    pub points: i32,
    /// Current status.
    pub status: EventStatus,
    /// Number of players online when the event started.
    #[serde(default)]
    pub players_at_start: i32,
    /// Highest event id reached in the attack chain.
    #[serde(default)]
    pub max_event_id: i32,
}

/// Aggregate per-faction statistics for a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[allow(missing_docs)]
pub struct Statistics {
    pub season: i32,
    pub season_duration: i64,
    pub enemy: i32,
    pub players: i64,
    pub total_unique_players: i64,
    pub missions: i64,
    pub successful_missions: i64,
    pub total_mission_difficulty: i64,
    pub completed_planets: i64,
    pub defend_events: i64,
    pub successful_defend_events: i64,
    pub attack_events: i64,
    pub successful_attack_events: i64,
    pub deaths: i64,
    pub kills: i64,
    pub accidentals: i64,
    pub shots: i64,
    pub hits: i64,
}

/// One polled observation of the campaign.
///
/// `observed_at` is the upstream timestamp and the snapshot's identity: it is
/// unique and increases from poll to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    /// Upstream observation time.
    #[serde(rename = "time", with = "chrono::serde::ts_seconds")]
    #[schema(value_type = i64)]
    pub observed_at: DateTime<Utc>,
    /// Upstream error code; `0` means healthy.
    pub error_code: i32,
    /// Faction standings.
    #[serde(rename = "campaign_status", default)]
    pub faction_status: Vec<FactionStatus>,
    /// The current defend event, if upstream reports one.
    #[serde(default)]
    pub defend_event: Option<DefendEvent>,
    /// Running attack events.
    #[serde(default)]
    pub attack_events: Vec<AttackEvent>,
    /// Per-faction statistics.
    #[serde(default)]
    pub statistics: Vec<Statistics>,
}

impl Snapshot {
    /// Returns `true` if upstream reported no error for this poll.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.error_code == 0
    }
}
