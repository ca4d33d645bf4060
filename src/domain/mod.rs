//! Domain layer: campaign snapshots, defend events and registry records.
//!
//! This module holds the herald's data model: the upstream payload shapes
//! (snapshots and season history), the identity types used as registry
//! keys, and the pure alert renderer.

pub mod alert;
pub mod campaign;
pub mod defend_event;
pub mod event_id;
pub mod ongoing_event;
pub mod season_history;

pub use alert::AlertKind;
pub use campaign::{AttackEvent, FactionStatus, Snapshot, Statistics};
pub use defend_event::{DefendEvent, EventStatus};
pub use event_id::EventId;
pub use ongoing_event::{EventCategory, OngoingEvent};
pub use season_history::SeasonHistory;
