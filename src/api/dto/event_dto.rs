//! Ongoing-event responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DefendEvent, EventCategory, EventId, OngoingEvent};

/// A live registry record together with the event's last stored detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OngoingEventDto {
    /// Upstream event id.
    pub event_id: EventId,
    /// Event category.
    pub category: EventCategory,
    /// Observation time of the snapshot that started tracking.
    pub tracked_since: DateTime<Utc>,
    /// Last stored detail; `null` if no stored snapshot carries the event.
    pub detail: Option<DefendEvent>,
}

impl OngoingEventDto {
    /// Pairs `record` with its stored `detail`.
    #[must_use]
    pub fn new(record: OngoingEvent, detail: Option<DefendEvent>) -> Self {
        Self {
            event_id: record.event_id,
            category: record.category,
            tracked_since: record.tracked_since,
            detail,
        }
    }
}

/// Response of `GET /events/ongoing`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OngoingEventListResponse {
    /// Live records, at most one per category.
    pub data: Vec<OngoingEventDto>,
}
