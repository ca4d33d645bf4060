//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    DefendEvent, EventCategory, EventId, EventStatus, OngoingEvent, SeasonHistory, Snapshot,
};
use crate::error::HeraldError;
use crate::notify::Notifier;
use crate::persistence::{MemoryStore, OngoingEventRegistry, SnapshotStore};
use crate::upstream::CampaignSource;

pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// A season-140 defend event in region 3 against faction 1.
pub(crate) fn defend(id: i32, status: EventStatus) -> DefendEvent {
    DefendEvent {
        season: 140,
        event_id: EventId::new(id),
        start_time: at(1_700_000_000),
        end_time: at(1_700_086_400),
        enemy: 1,
        points_max: 300,
        points: 120,
        status,
        region: 3,
        players_at_start: 812,
    }
}

pub(crate) fn snapshot(secs: i64, event: Option<DefendEvent>) -> Snapshot {
    Snapshot {
        observed_at: at(secs),
        error_code: 0,
        faction_status: Vec::new(),
        defend_event: event,
        attack_events: Vec::new(),
        statistics: Vec::new(),
    }
}

#[derive(Debug, Default)]
struct SourceState {
    snapshots: VecDeque<Result<Snapshot, HeraldError>>,
    history: Option<Vec<DefendEvent>>,
    history_error_code: i32,
}

/// Campaign source returning queued snapshots and a fixed season history.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedSource {
    state: Arc<Mutex<SourceState>>,
    history_calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, next: Result<Snapshot, HeraldError>) {
        if let Ok(mut state) = self.state.lock() {
            state.snapshots.push_back(next);
        }
    }

    pub(crate) fn set_history(&self, events: Vec<DefendEvent>) {
        if let Ok(mut state) = self.state.lock() {
            state.history = Some(events);
        }
    }

    /// Makes the season history report upstream error `code`.
    pub(crate) fn set_history_error_code(&self, code: i32) {
        if let Ok(mut state) = self.state.lock() {
            state.history_error_code = code;
        }
    }

    pub(crate) fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CampaignSource for ScriptedSource {
    async fn fetch_campaign_status(&self) -> Result<Snapshot, HeraldError> {
        self.state
            .lock()
            .ok()
            .and_then(|mut s| s.snapshots.pop_front())
            .unwrap_or_else(|| Err(HeraldError::Upstream("script exhausted".to_string())))
    }

    async fn fetch_season_history(&self, _season: i32) -> Result<SeasonHistory, HeraldError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let (history, error_code) = self
            .state
            .lock()
            .map(|s| (s.history.clone(), s.history_error_code))
            .unwrap_or_default();
        match history {
            Some(defend_events) => Ok(SeasonHistory {
                fetched_at: Utc::now(),
                error_code,
                defend_events,
                attack_events: Vec::new(),
            }),
            None => Err(HeraldError::Upstream("connection refused".to_string())),
        }
    }
}

/// Notifier recording every message it accepts.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes every following send fail without recording.
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.sent.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), HeraldError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HeraldError::Notify("503 Service Unavailable".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(text.to_string());
        }
        Ok(())
    }
}

/// Memory store whose writes can be made to fail.
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_next_lookup: AtomicBool,
    fail_reads: AtomicBool,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes registry and latest-snapshot reads fail.
    pub(crate) fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), HeraldError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(HeraldError::Persistence("too many connections".to_string()));
        }
        Ok(())
    }

    /// Makes the next `lookup_event_detail` call fail.
    pub(crate) fn fail_next_lookup(&self) {
        self.fail_next_lookup.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), HeraldError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(HeraldError::Persistence("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for FlakyStore {
    async fn append_snapshot(&self, snapshot: &Snapshot) -> Result<bool, HeraldError> {
        self.check()?;
        self.inner.append_snapshot(snapshot).await
    }

    async fn latest_snapshot(&self) -> Result<Option<Snapshot>, HeraldError> {
        self.check_read()?;
        self.inner.latest_snapshot().await
    }

    async fn latest_snapshot_for(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, HeraldError> {
        self.inner.latest_snapshot_for(at).await
    }

    async fn lookup_event_detail(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<DefendEvent>, HeraldError> {
        if self.fail_next_lookup.swap(false, Ordering::SeqCst) {
            return Err(HeraldError::Persistence("statement timeout".to_string()));
        }
        self.inner.lookup_event_detail(event_id, category).await
    }
}

#[async_trait]
impl OngoingEventRegistry for FlakyStore {
    async fn upsert(&self, record: &OngoingEvent) -> Result<(), HeraldError> {
        self.check()?;
        self.inner.upsert(record).await
    }

    async fn remove(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<(), HeraldError> {
        self.check()?;
        self.inner.remove(event_id, category).await
    }

    async fn replace(&self, old: &OngoingEvent, new: &OngoingEvent) -> Result<(), HeraldError> {
        self.check()?;
        self.inner.replace(old, new).await
    }

    async fn find(&self, category: EventCategory) -> Result<Option<OngoingEvent>, HeraldError> {
        self.check_read()?;
        self.inner.find(category).await
    }

    async fn find_by_id(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<OngoingEvent>, HeraldError> {
        self.inner.find_by_id(event_id, category).await
    }

    async fn list(&self) -> Result<Vec<OngoingEvent>, HeraldError> {
        self.inner.list().await
    }
}
