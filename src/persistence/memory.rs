//! In-memory implementation of the persistence traits.
//!
//! Used by tests and when persistence is disabled. It honours the same
//! contract as PostgreSQL, including the one-record-per-category rule, but
//! nothing survives a restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{OngoingEventRegistry, SnapshotStore};
use crate::domain::{DefendEvent, EventCategory, EventId, OngoingEvent, Snapshot};
use crate::error::HeraldError;

/// Process-local event store.
///
/// Snapshots are kept in a `BTreeMap` ordered by observation time; the
/// registry is a map from category to its single live record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<BTreeMap<DateTime<Utc>, Snapshot>>,
    ongoing: RwLock<HashMap<EventCategory, OngoingEvent>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored snapshots.
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

fn check_slot(
    slot: Option<&OngoingEvent>,
    record: &OngoingEvent,
) -> Result<bool, HeraldError> {
    match slot {
        Some(held) if held.event_id == record.event_id => Ok(false),
        Some(held) => Err(HeraldError::RegistryConflict {
            category: record.category,
            held: held.event_id,
            requested: record.event_id,
        }),
        None => Ok(true),
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn append_snapshot(&self, snapshot: &Snapshot) -> Result<bool, HeraldError> {
        let mut map = self.snapshots.write().await;
        if map.contains_key(&snapshot.observed_at) {
            return Ok(false);
        }
        map.insert(snapshot.observed_at, snapshot.clone());
        Ok(true)
    }

    async fn latest_snapshot(&self) -> Result<Option<Snapshot>, HeraldError> {
        let map = self.snapshots.read().await;
        Ok(map.last_key_value().map(|(_, s)| s.clone()))
    }

    async fn latest_snapshot_for(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, HeraldError> {
        let map = self.snapshots.read().await;
        Ok(map.range(..=at).next_back().map(|(_, s)| s.clone()))
    }

    async fn lookup_event_detail(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<DefendEvent>, HeraldError> {
        match category {
            EventCategory::Defend => {
                let map = self.snapshots.read().await;
                Ok(map
                    .values()
                    .rev()
                    .filter_map(|s| s.defend_event.as_ref())
                    .find(|e| e.event_id == event_id)
                    .cloned())
            }
        }
    }
}

#[async_trait]
impl OngoingEventRegistry for MemoryStore {
    async fn upsert(&self, record: &OngoingEvent) -> Result<(), HeraldError> {
        let mut map = self.ongoing.write().await;
        if check_slot(map.get(&record.category), record)? {
            map.insert(record.category, record.clone());
        }
        Ok(())
    }

    async fn remove(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<(), HeraldError> {
        let mut map = self.ongoing.write().await;
        if map.get(&category).is_some_and(|r| r.event_id == event_id) {
            map.remove(&category);
        }
        Ok(())
    }

    async fn replace(&self, old: &OngoingEvent, new: &OngoingEvent) -> Result<(), HeraldError> {
        let mut map = self.ongoing.write().await;
        let slot = map
            .get(&new.category)
            .filter(|r| !r.is(old.event_id, old.category));
        if check_slot(slot, new)? {
            map.insert(new.category, new.clone());
        }
        Ok(())
    }

    async fn find(&self, category: EventCategory) -> Result<Option<OngoingEvent>, HeraldError> {
        Ok(self.ongoing.read().await.get(&category).cloned())
    }

    async fn find_by_id(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<OngoingEvent>, HeraldError> {
        Ok(self
            .ongoing
            .read()
            .await
            .get(&category)
            .filter(|r| r.event_id == event_id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<OngoingEvent>, HeraldError> {
        let mut records: Vec<OngoingEvent> =
            self.ongoing.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.event_id);
        Ok(records)
    }
}
