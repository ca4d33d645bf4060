//! Fixed-interval poll loop.
//!
//! Each cycle runs to completion before the next tick is awaited:
//! fetch → append snapshot → reconcile. A failing step is logged and the
//! rest of the cycle skipped; the next tick starts over from durable state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::reconciler::{ReconcileReport, Reconciler};
use crate::domain::EventCategory;
use crate::error::HeraldError;
use crate::persistence::EventStore;
use crate::upstream::CampaignSource;

/// Result of one successful poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCycle {
    /// Timestamp of the fetched snapshot.
    pub observed_at: DateTime<Utc>,
    /// `false` if a snapshot with the same timestamp was already stored.
    pub stored: bool,
    /// Reconciliation result; `None` when the snapshot reported an upstream
    /// error and was not reconciled.
    pub reconciled: Option<ReconcileReport>,
}

/// Drives the fetch → persist → reconcile cycle.
#[derive(Debug)]
pub struct PollDriver {
    source: Arc<dyn CampaignSource>,
    store: Arc<dyn EventStore>,
    reconciler: Reconciler,
    interval: Duration,
}

impl PollDriver {
    /// Creates a driver polling every `interval`.
    #[must_use]
    pub fn new(
        source: Arc<dyn CampaignSource>,
        store: Arc<dyn EventStore>,
        reconciler: Reconciler,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            store,
            reconciler,
            interval,
        }
    }

    /// Runs one poll cycle.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step: [`HeraldError::Upstream`]
    /// or [`HeraldError::Decode`] when fetching, [`HeraldError::Persistence`]
    /// when storing or reconciling.
    pub async fn poll_once(&self) -> Result<PollCycle, HeraldError> {
        let snapshot = self.source.fetch_campaign_status().await?;
        let stored = self.store.append_snapshot(&snapshot).await?;
        if !stored {
            debug!(observed_at = %snapshot.observed_at, "snapshot already stored");
        }

        if !snapshot.is_healthy() {
            warn!(
                observed_at = %snapshot.observed_at,
                error_code = snapshot.error_code,
                "upstream reported an error, skipping reconciliation"
            );
            return Ok(PollCycle {
                observed_at: snapshot.observed_at,
                stored,
                reconciled: None,
            });
        }

        let report = self.reconciler.reconcile(&snapshot).await?;
        Ok(PollCycle {
            observed_at: snapshot.observed_at,
            stored,
            reconciled: Some(report),
        })
    }

    /// Logs the durable state the driver resumes from.
    ///
    /// Lookup failures are logged only; polling can start without them.
    pub async fn resume(&self) {
        match self.store.latest_snapshot().await {
            Ok(Some(snapshot)) => info!(
                observed_at = %snapshot.observed_at,
                defend_event = ?snapshot.defend_event.as_ref().map(|e| e.event_id.get()),
                "resuming from stored snapshot"
            ),
            Ok(None) => info!("no stored snapshot, starting fresh"),
            Err(e) => warn!(error = %e, "cannot load latest snapshot"),
        }

        match self.store.find(EventCategory::Defend).await {
            Ok(Some(record)) => info!(
                event_id = %record.event_id,
                tracked_since = %record.tracked_since,
                "tracking ongoing defend event"
            ),
            Ok(None) => info!("no ongoing defend event"),
            Err(e) => warn!(error = %e, "cannot read ongoing-event registry"),
        }
    }

    /// Polls until `shutdown_rx` turns `true` or its sender is dropped.
    ///
    /// The first cycle runs immediately. A tick that fires while a cycle is
    /// still running is delayed, never queued.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        self.resume().await;
        info!(interval_secs = self.interval.as_secs(), "poll driver started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("poll driver received shutdown signal");
                        break;
                    }
                }

                _ = ticker.tick() => match self.poll_once().await {
                    Ok(cycle) => debug!(
                        observed_at = %cycle.observed_at,
                        stored = cycle.stored,
                        announcements = cycle
                            .reconciled
                            .as_ref()
                            .map_or(0, |r| r.announcements.len()),
                        "poll cycle complete"
                    ),
                    Err(e) => error!(error = %e, "poll cycle failed"),
                },
            }
        }

        info!("poll driver stopped");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AlertKind, EventId, EventStatus};
    use crate::persistence::{MemoryStore, OngoingEventRegistry};
    use crate::service::OutcomeResolver;
    use crate::testing::{FlakyStore, RecordingNotifier, ScriptedSource, defend, snapshot};

    fn driver(
        source: &ScriptedSource,
        store: Arc<dyn EventStore>,
        notifier: &RecordingNotifier,
    ) -> PollDriver {
        let reconciler = Reconciler::new(
            Arc::clone(&store),
            Arc::new(notifier.clone()),
            OutcomeResolver::new(Arc::new(source.clone())),
            false,
        );
        PollDriver::new(
            Arc::new(source.clone()),
            store,
            reconciler,
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn fetch_failure_skips_cycle_and_next_poll_resumes() {
        let source = ScriptedSource::new();
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::new();
        let driver = driver(&source, Arc::clone(&store) as Arc<dyn EventStore>, &notifier);

        source.set_history(vec![defend(10, EventStatus::Success)]);
        source.push(Ok(snapshot(100, Some(defend(10, EventStatus::Active)))));
        source.push(Err(HeraldError::Upstream("timed out".to_string())));
        source.push(Ok(snapshot(220, Some(defend(11, EventStatus::Active)))));

        assert!(driver.poll_once().await.is_ok());
        assert!(driver.poll_once().await.is_err());
        assert_eq!(store.snapshot_count().await, 1);
        assert_eq!(notifier.messages().len(), 1);

        let Ok(cycle) = driver.poll_once().await else {
            panic!("third poll should succeed");
        };
        let Some(report) = cycle.reconciled else {
            panic!("healthy snapshot must be reconciled");
        };
        let kinds: Vec<AlertKind> = report.announcements.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Success, AlertKind::New]);
        assert_eq!(notifier.messages().len(), 3);
    }

    #[tokio::test]
    async fn duplicate_snapshot_is_not_stored_twice_or_reannounced() {
        let source = ScriptedSource::new();
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::new();
        let driver = driver(&source, Arc::clone(&store) as Arc<dyn EventStore>, &notifier);

        let snap = snapshot(100, Some(defend(10, EventStatus::Active)));
        source.push(Ok(snap.clone()));
        source.push(Ok(snap));

        let first = driver.poll_once().await.ok();
        let second = driver.poll_once().await.ok();
        assert_eq!(first.map(|c| c.stored), Some(true));
        let Some(second) = second else {
            panic!("duplicate poll should not fail");
        };
        assert!(!second.stored);
        assert_eq!(second.reconciled.map(|r| r.is_quiet()), Some(true));
        assert_eq!(store.snapshot_count().await, 1);
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn unhealthy_snapshot_is_stored_but_not_reconciled() {
        let source = ScriptedSource::new();
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::new();
        let driver = driver(&source, Arc::clone(&store) as Arc<dyn EventStore>, &notifier);

        let mut snap = snapshot(100, Some(defend(10, EventStatus::Active)));
        snap.error_code = 3;
        source.push(Ok(snap));

        let Ok(cycle) = driver.poll_once().await else {
            panic!("poll should succeed");
        };
        assert!(cycle.stored);
        assert!(cycle.reconciled.is_none());
        assert!(notifier.messages().is_empty());
        assert!(store.list().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn append_failure_skips_reconciliation() {
        let source = ScriptedSource::new();
        let store = Arc::new(FlakyStore::new());
        let notifier = RecordingNotifier::new();
        let driver = driver(&source, Arc::clone(&store) as Arc<dyn EventStore>, &notifier);

        store.set_fail_writes(true);
        source.push(Ok(snapshot(100, Some(defend(10, EventStatus::Active)))));

        assert!(matches!(
            driver.poll_once().await,
            Err(HeraldError::Persistence(_))
        ));
        assert!(notifier.messages().is_empty());
        assert_eq!(store.inner.snapshot_count().await, 0);
    }

    #[tokio::test]
    async fn run_polls_immediately_and_stops_on_shutdown() {
        let source = ScriptedSource::new();
        let store = Arc::new(MemoryStore::new());
        let notifier = RecordingNotifier::new();
        source.push(Ok(snapshot(100, Some(defend(10, EventStatus::Active)))));
        let driver = driver(&source, Arc::clone(&store) as Arc<dyn EventStore>, &notifier);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(driver.run(shutdown_rx));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = shutdown_tx.send(true);
        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;

        assert!(matches!(joined, Ok(Ok(()))));
        assert_eq!(store.snapshot_count().await, 1);
        assert_eq!(
            store
                .find(EventCategory::Defend)
                .await
                .ok()
                .flatten()
                .map(|r| r.event_id),
            Some(EventId::new(10))
        );
    }
}
