//! Event-lifecycle reconciliation.
//!
//! [`Reconciler`] compares a fresh snapshot with the ongoing-event registry,
//! applies the resulting registry mutation, and only once that mutation is
//! committed sends the matching announcements. A crash between the two
//! steps can lose an announcement but never repeat one.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::outcome::{OutcomeResolver, OutcomeSource};
use super::transition::{self, Plan};
use crate::domain::{alert, AlertKind, DefendEvent, EventCategory, EventId, OngoingEvent, Snapshot};
use crate::error::HeraldError;
use crate::notify::Notifier;
use crate::persistence::EventStore;

/// One announcement attempted by a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    /// Transition announced.
    pub kind: AlertKind,
    /// Event the announcement is about.
    pub event_id: EventId,
    /// How a closing outcome was determined; `None` for starts.
    pub outcome_source: Option<OutcomeSource>,
    /// Whether the notifier accepted the message.
    pub delivered: bool,
}

/// Result of reconciling one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Announcements in the order they were sent.
    pub announcements: Vec<Announcement>,
}

impl ReconcileReport {
    /// Returns `true` if nothing was announced.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.announcements.is_empty()
    }
}

/// Alert waiting for the registry commit.
struct PendingAlert {
    kind: AlertKind,
    event: DefendEvent,
    outcome_source: Option<OutcomeSource>,
}

/// Reconciles snapshots against the ongoing-event registry.
///
/// Not reentrant by contract: the poll driver never runs two
/// reconciliations at once, so no locking happens here.
#[derive(Debug, Clone)]
pub struct Reconciler {
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    resolver: OutcomeResolver,
    announce_same_id_outcome: bool,
}

impl Reconciler {
    /// Creates a reconciler.
    ///
    /// With `announce_same_id_outcome` the tracked event reaching
    /// `success`/`fail` under its own id is announced immediately instead
    /// of waiting for upstream to switch to another event.
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
        resolver: OutcomeResolver,
        announce_same_id_outcome: bool,
    ) -> Self {
        Self {
            store,
            notifier,
            resolver,
            announce_same_id_outcome,
        }
    }

    /// Reconciles `snapshot` and announces the resulting transitions.
    ///
    /// Re-running with an already reconciled snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Persistence`] (or
    /// [`HeraldError::RegistryConflict`]) if the registry could not be read
    /// or updated. Nothing is announced in that case. Delivery failures are
    /// not errors; they show up as undelivered announcements.
    pub async fn reconcile(&self, snapshot: &Snapshot) -> Result<ReconcileReport, HeraldError> {
        let Some(observed) = snapshot.defend_event.as_ref() else {
            debug!(observed_at = %snapshot.observed_at, "snapshot carries no defend event");
            return Ok(ReconcileReport::default());
        };

        let category = EventCategory::Defend;
        let prior = self.store.find(category).await?;
        let plan = transition::plan(prior.as_ref(), observed, self.announce_same_id_outcome);
        debug!(
            event_id = %observed.event_id,
            status = %observed.status,
            ?plan,
            "reconciling defend event"
        );

        let record = OngoingEvent::new(observed.event_id, category, snapshot.observed_at);
        let mut pending = Vec::new();

        match plan {
            Plan::Unchanged => {}
            Plan::Start => {
                self.store.upsert(&record).await?;
                pending.push(PendingAlert {
                    kind: AlertKind::New,
                    event: observed.clone(),
                    outcome_source: None,
                });
            }
            Plan::Supersede { closed } => {
                let closing = self.closing_alert(&closed).await?;
                self.store.replace(&closed, &record).await?;
                pending.extend(closing);
                pending.push(PendingAlert {
                    kind: AlertKind::New,
                    event: observed.clone(),
                    outcome_source: None,
                });
            }
            Plan::Close { closed } => {
                let closing = self.closing_alert(&closed).await?;
                self.store.remove(closed.event_id, closed.category).await?;
                pending.extend(closing);
            }
            Plan::Conclude { closed, outcome } => {
                self.store.remove(closed.event_id, closed.category).await?;
                pending.push(PendingAlert {
                    kind: outcome,
                    event: observed.clone(),
                    outcome_source: Some(OutcomeSource::Observed),
                });
            }
        }

        let mut report = ReconcileReport::default();
        for alert in pending {
            report.announcements.push(self.announce(alert).await);
        }
        Ok(report)
    }

    /// Builds the closing announcement of `closed`.
    ///
    /// Returns `Ok(None)` when no stored snapshot carries the event: the
    /// message cannot be rendered, but closing the record must go ahead.
    ///
    /// # Errors
    ///
    /// Propagates storage failures so the cycle aborts before the registry
    /// changes and the close is retried on the next poll.
    async fn closing_alert(
        &self,
        closed: &OngoingEvent,
    ) -> Result<Option<PendingAlert>, HeraldError> {
        let Some(detail) = self
            .store
            .lookup_event_detail(closed.event_id, closed.category)
            .await?
        else {
            error!(
                event_id = %closed.event_id,
                category = %closed.category,
                "no stored detail for closed event, outcome will not be announced"
            );
            return Ok(None);
        };

        let outcome = self.resolver.resolve(&detail).await;
        Ok(Some(PendingAlert {
            kind: outcome.kind,
            event: detail,
            outcome_source: Some(outcome.source),
        }))
    }

    async fn announce(&self, alert: PendingAlert) -> Announcement {
        let text = alert::render(alert.kind, &alert.event);
        let delivered = match self.notifier.send(&text).await {
            Ok(()) => {
                info!(
                    event_id = %alert.event.event_id,
                    kind = alert.kind.as_str(),
                    outcome_source = ?alert.outcome_source,
                    "announced defend event"
                );
                true
            }
            Err(e) => {
                warn!(
                    event_id = %alert.event.event_id,
                    kind = alert.kind.as_str(),
                    error = %e,
                    "failed to deliver announcement"
                );
                false
            }
        };
        Announcement {
            kind: alert.kind,
            event_id: alert.event.event_id,
            outcome_source: alert.outcome_source,
            delivered,
        }
    }
}
