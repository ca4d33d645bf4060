//! Outcome resolution for events that left the "current event" slot.
//!
//! Polling can miss the terminal status of an event: by the time the herald
//! notices a new id, upstream may already have overwritten the old event.
//! The resolver works through three sources, most trusted first:
//!
//! 1. the last stored status of the event, if it was already terminal;
//! 2. the season history, which records the final status of every event;
//! 3. an inference from the event's progress counters.
//!
//! Only the last one is ambiguous, and it is logged as such.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::domain::{AlertKind, DefendEvent};
use crate::upstream::CampaignSource;

/// Where an outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSource {
    /// The stored detail already carried a terminal status.
    Observed,
    /// The season history listed the event with a terminal status.
    SeasonHistory,
    /// Guessed from points; may be wrong.
    Inferred,
}

/// Final outcome of a closed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Success or fail.
    pub kind: AlertKind,
    /// Confidence of the classification.
    pub source: OutcomeSource,
}

impl Outcome {
    /// Returns `true` when the outcome was guessed.
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        matches!(self.source, OutcomeSource::Inferred)
    }
}

/// Resolves the outcome of closed events using the season history as side
/// channel.
#[derive(Debug, Clone)]
pub struct OutcomeResolver {
    source: Arc<dyn CampaignSource>,
}

impl OutcomeResolver {
    /// Creates a resolver that queries `source` for season history.
    #[must_use]
    pub fn new(source: Arc<dyn CampaignSource>) -> Self {
        Self { source }
    }

    /// Classifies `detail`, the last known state of a closed event.
    ///
    /// Never fails: when no source is conclusive the outcome is inferred.
    pub async fn resolve(&self, detail: &DefendEvent) -> Outcome {
        if let Some(kind) = AlertKind::outcome(detail.status) {
            return Outcome {
                kind,
                source: OutcomeSource::Observed,
            };
        }

        match self.source.fetch_season_history(detail.season).await {
            Ok(history) if history.error_code != 0 => warn!(
                season = detail.season,
                error_code = history.error_code,
                "season history reported an upstream error"
            ),
            Ok(history) => match history.defend_status(detail.event_id) {
                Some(status) => {
                    if let Some(kind) = AlertKind::outcome(status) {
                        return Outcome {
                            kind,
                            source: OutcomeSource::SeasonHistory,
                        };
                    }
                    warn!(
                        event_id = %detail.event_id,
                        %status,
                        "season history has no final status for event"
                    );
                }
                None => warn!(
                    event_id = %detail.event_id,
                    season = detail.season,
                    "event missing from season history"
                ),
            },
            Err(e) => warn!(
                season = detail.season,
                error = %e,
                "season history unavailable"
            ),
        }

        let kind = if detail.reached_goal() {
            AlertKind::Success
        } else {
            AlertKind::Fail
        };
        warn!(
            ambiguous = true,
            event_id = %detail.event_id,
            points = detail.points,
            points_max = detail.points_max,
            outcome = kind.as_str(),
            "outcome inferred from progress counters"
        );
        Outcome {
            kind,
            source: OutcomeSource::Inferred,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventId, EventStatus};
    use crate::testing::{ScriptedSource, defend};

    fn resolver(source: ScriptedSource) -> OutcomeResolver {
        OutcomeResolver::new(Arc::new(source))
    }

    #[tokio::test]
    async fn stored_terminal_status_wins() {
        let source = ScriptedSource::new();
        let outcome = resolver(source.clone())
            .resolve(&defend(10, EventStatus::Success))
            .await;
        assert_eq!(outcome.kind, AlertKind::Success);
        assert_eq!(outcome.source, OutcomeSource::Observed);
        assert_eq!(source.history_calls(), 0);
    }

    #[tokio::test]
    async fn season_history_resolves_active_detail() {
        let source = ScriptedSource::new();
        source.set_history(vec![defend(10, EventStatus::Fail)]);
        let outcome = resolver(source).resolve(&defend(10, EventStatus::Active)).await;
        assert_eq!(outcome.kind, AlertKind::Fail);
        assert_eq!(outcome.source, OutcomeSource::SeasonHistory);
        assert!(!outcome.is_ambiguous());
    }

    #[tokio::test]
    async fn missing_history_entry_falls_back_to_points() {
        let source = ScriptedSource::new();
        source.set_history(vec![defend(99, EventStatus::Success)]);
        let mut detail = defend(10, EventStatus::Active);
        detail.points = detail.points_max;
        let outcome = resolver(source).resolve(&detail).await;
        assert_eq!(outcome.kind, AlertKind::Success);
        assert!(outcome.is_ambiguous());
    }

    #[tokio::test]
    async fn history_with_upstream_error_is_not_trusted() {
        let source = ScriptedSource::new();
        source.set_history(vec![defend(10, EventStatus::Success)]);
        source.set_history_error_code(3);
        let outcome = resolver(source.clone())
            .resolve(&defend(10, EventStatus::Active))
            .await;
        assert_eq!(outcome.kind, AlertKind::Fail);
        assert_eq!(outcome.source, OutcomeSource::Inferred);
        assert_eq!(source.history_calls(), 1);
    }

    #[tokio::test]
    async fn unreachable_history_falls_back_to_fail() {
        let source = ScriptedSource::new();
        let detail = defend(10, EventStatus::Active);
        let outcome = resolver(source).resolve(&detail).await;
        assert_eq!(outcome.kind, AlertKind::Fail);
        assert_eq!(outcome.source, OutcomeSource::Inferred);
        assert_eq!(detail.event_id, EventId::new(10));
    }
}
