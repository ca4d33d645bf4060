//! Persistence layer: snapshot history and the ongoing-event registry.
//!
//! Two traits describe the durable state the reconciler depends on:
//! [`SnapshotStore`] (append-only poll history) and
//! [`OngoingEventRegistry`] (which events are believed in progress).
//! [`postgres::PostgresPersistence`] is the production implementation;
//! [`memory::MemoryStore`] keeps the same contract in process memory.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DefendEvent, EventCategory, EventId, OngoingEvent, Snapshot};
use crate::error::HeraldError;

pub use memory::MemoryStore;
pub use postgres::PostgresPersistence;

/// Append-only history of polled snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync + Debug {
    /// Stores `snapshot` and all of its nested arrays in one transaction.
    ///
    /// Returns `false` when a snapshot with the same `observed_at` is already
    /// stored; the existing one is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure; nothing is
    /// written in that case.
    async fn append_snapshot(&self, snapshot: &Snapshot) -> Result<bool, HeraldError>;

    /// Returns the most recently observed snapshot.
    ///
    /// Unbounded: `observed_at` is the upstream clock, which may run ahead
    /// of ours.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure.
    async fn latest_snapshot(&self) -> Result<Option<Snapshot>, HeraldError>;

    /// Returns the most recent snapshot observed at or before `at`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure.
    async fn latest_snapshot_for(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, HeraldError>;

    /// Returns the last stored detail of event `event_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure.
    async fn lookup_event_detail(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<DefendEvent>, HeraldError>;
}

/// Durable set of events believed to be in progress.
///
/// Holds at most one record per category.
#[async_trait]
pub trait OngoingEventRegistry: Send + Sync + Debug {
    /// Inserts `record` if absent; a no-op if the same key is already live.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::RegistryConflict`] if the category is held by
    /// a different event, or [`HeraldError::Persistence`] on storage failure.
    async fn upsert(&self, record: &OngoingEvent) -> Result<(), HeraldError>;

    /// Deletes the record keyed by `(event_id, category)`; absent is fine.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure.
    async fn remove(&self, event_id: EventId, category: EventCategory)
    -> Result<(), HeraldError>;

    /// Removes `old` and inserts `new` atomically.
    ///
    /// # Errors
    ///
    /// Same as [`upsert`](Self::upsert); on error neither change is applied.
    async fn replace(&self, old: &OngoingEvent, new: &OngoingEvent) -> Result<(), HeraldError>;

    /// Returns the live record of `category`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure.
    async fn find(&self, category: EventCategory) -> Result<Option<OngoingEvent>, HeraldError>;

    /// Returns the live record of `category` only if it belongs to `event_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure.
    async fn find_by_id(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<OngoingEvent>, HeraldError>;

    /// Returns every live record.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] on storage failure.
    async fn list(&self) -> Result<Vec<OngoingEvent>, HeraldError>;
}

/// Everything the herald persists, behind one object.
pub trait EventStore: SnapshotStore + OngoingEventRegistry {}

impl<T: SnapshotStore + OngoingEventRegistry> EventStore for T {}
