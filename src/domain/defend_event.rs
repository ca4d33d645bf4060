//! The defend event carried by every campaign snapshot.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventId;

/// Lifecycle status of an upstream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// The event is running.
    Active,
    /// Super Earth won.
    Success,
    /// The enemy won.
    Fail,
    /// Any status string the herald does not know about.
    #[serde(other)]
    Unknown,
}

impl EventStatus {
    /// Returns the status as stored in the database and sent by upstream.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Success => "success",
            Self::Fail => "fail",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` for `success` and `fail`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Fail)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "active" => Self::Active,
            "success" => Self::Success,
            "fail" => Self::Fail,
            _ => Self::Unknown,
        })
    }
}

/// A defend event as reported by the campaign API.
///
/// Both `get_campaign_status` (the current event) and `get_snapshots`
/// (every event of a season) use this shape. Timestamps travel as unix
/// seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DefendEvent {
    /// Season the event belongs to.
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
    /// Attacking faction id.
    pub enemy: i32,
    /// Points needed to win.
    pub points_max: i32,
    /// Points gathered so far.
    pub points: i32,
    /// Current status.
    pub status: EventStatus,
    /// Region under attack.
    #[serde(default)]
    pub region: i32,
    /// Number of players online when the event started.
    #[serde(default)]
    pub players_at_start: i32,
}

impl DefendEvent {
    /// Returns `true` if the gathered points reached the goal.
    #[must_use]
    pub const fn reached_goal(&self) -> bool {
        self.points >= self.points_max
    }
}
