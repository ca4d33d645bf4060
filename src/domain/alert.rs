//! Human-readable alert texts.
//!
//! Rendering is a pure function of the transition kind and the event
//! detail, so the exact wording is pinned by unit tests independently of
//! delivery.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DefendEvent, EventStatus};

/// Kind of lifecycle transition being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A new defend event started.
    New,
    /// A defend event was won.
    Success,
    /// A defend event was lost.
    Fail,
}

impl AlertKind {
    /// Maps a terminal event status to its alert kind.
    ///
    /// Returns `None` for `active` and `unknown`.
    #[must_use]
    pub const fn outcome(status: EventStatus) -> Option<Self> {
        match status {
            EventStatus::Success => Some(Self::Success),
            EventStatus::Fail => Some(Self::Fail),
            EventStatus::Active | EventStatus::Unknown => None,
        }
    }

    /// Returns the kind as a static label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Success => "success",
            Self::Fail => "fail",
        }
    }
}

/// Renders the chat message for `kind` about `event`.
#[must_use]
pub fn render(kind: AlertKind, event: &DefendEvent) -> String {
    match kind {
        AlertKind::New => format!(
            "New defend event against {} in region {}\nStart Time: {}\nEnd time: {}\nID: {}",
            event.enemy,
            event.region,
            utc(event.start_time),
            utc(event.end_time),
            event.event_id,
        ),
        AlertKind::Fail => format!(
            "We failed! the {} have taken back region {}\nID: {}",
            event.enemy, event.region, event.event_id,
        ),
        AlertKind::Success => format!(
            "We did it! Super Earth has conquered region {} against {}\nID: {}",
            event.region, event.enemy, event.event_id,
        ),
    }
}

fn utc(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S +0000 UTC").to_string()
}
