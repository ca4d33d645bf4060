//! Registry records for events that are believed to be in progress.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventId;

/// Category of tracked event.
///
/// Only defend events are tracked today. The registry is keyed by
/// `(EventId, EventCategory)` so another category can share the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// A defend event: an enemy faction attacks a region held by Super Earth.
    Defend,
}

impl EventCategory {
    /// Returns the category as stored in the `ongoing_events.category` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defend => "defend",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "defend" => Ok(Self::Defend),
            other => Err(format!("unknown event category: {other}")),
        }
    }
}

/// A live registry entry.
///
/// Its presence asserts that, as of the last reconciliation, event
/// `event_id` of `category` was still in progress and its start
/// announcement has already been sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OngoingEvent {
    /// Upstream event id.
    pub event_id: EventId,
    /// Event category.
    pub category: EventCategory,
    /// When the record was first written.
    pub tracked_since: DateTime<Utc>,
}

impl OngoingEvent {
    /// Creates a record for `event_id` tracked from `tracked_since`.
    #[must_use]
    pub const fn new(
        event_id: EventId,
        category: EventCategory,
        tracked_since: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            category,
            tracked_since,
        }
    }

    /// Returns `true` if this record is keyed by `(event_id, category)`.
    #[must_use]
    pub fn is(&self, event_id: EventId, category: EventCategory) -> bool {
        self.event_id == event_id && self.category == category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        let parsed = EventCategory::from_str(EventCategory::Defend.as_str());
        assert_eq!(parsed, Ok(EventCategory::Defend));
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(EventCategory::from_str("attack").is_err());
    }

    #[test]
    fn is_matches_both_key_parts() {
        let record = OngoingEvent::new(EventId::new(3), EventCategory::Defend, Utc::now());
        assert!(record.is(EventId::new(3), EventCategory::Defend));
        assert!(!record.is(EventId::new(4), EventCategory::Defend));
    }
}
