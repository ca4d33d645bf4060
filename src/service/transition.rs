//! The reconciliation transition table.
//!
//! Given the registry record of a category (if any) and the event observed
//! in the fresh snapshot, [`plan`] decides what has to happen. It is pure:
//! the [`Reconciler`](super::Reconciler) carries out the plan.
//!
//! | Prior         | Observation                  | Plan                      |
//! |---------------|------------------------------|---------------------------|
//! | Idle          | active                       | [`Plan::Start`]           |
//! | Idle          | anything else                | [`Plan::Unchanged`]       |
//! | Tracking(r)   | same id                      | [`Plan::Unchanged`]       |
//! | Tracking(r)   | other id, active             | [`Plan::Supersede`]       |
//! | Tracking(r)   | other id, not active         | [`Plan::Close`]           |
//!
//! With `announce_same_id_outcome` enabled, `Tracking(r)` observing the same
//! id in a terminal status yields [`Plan::Conclude`] instead of
//! [`Plan::Unchanged`].

use crate::domain::{AlertKind, DefendEvent, EventStatus, OngoingEvent};

/// What reconciliation must do for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing changes and nothing is announced.
    Unchanged,
    /// Start tracking the observed event and announce it.
    Start,
    /// The tracked event was replaced by a new active one: close the old
    /// record, track the new one, announce both.
    Supersede {
        /// Record being closed.
        closed: OngoingEvent,
    },
    /// The tracked event was replaced by an event that is not active: close
    /// the old record and announce its outcome only.
    Close {
        /// Record being closed.
        closed: OngoingEvent,
    },
    /// The tracked event itself reached a terminal status.
    Conclude {
        /// Record being closed.
        closed: OngoingEvent,
        /// Outcome read from the observation.
        outcome: AlertKind,
    },
}

/// Applies the transition table.
#[must_use]
pub fn plan(
    prior: Option<&OngoingEvent>,
    observed: &DefendEvent,
    announce_same_id_outcome: bool,
) -> Plan {
    let Some(prior) = prior else {
        return if observed.status == EventStatus::Active {
            Plan::Start
        } else {
            Plan::Unchanged
        };
    };

    if prior.event_id == observed.event_id {
        return match AlertKind::outcome(observed.status) {
            Some(outcome) if announce_same_id_outcome => Plan::Conclude {
                closed: prior.clone(),
                outcome,
            },
            _ => Plan::Unchanged,
        };
    }

    let closed = prior.clone();
    if observed.status == EventStatus::Active {
        Plan::Supersede { closed }
    } else {
        Plan::Close { closed }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{EventCategory, EventId};

    fn observed(id: i32, status: EventStatus) -> DefendEvent {
        let now = Utc::now();
        DefendEvent {
            season: 1,
            event_id: EventId::new(id),
            start_time: now,
            end_time: now,
            enemy: 0,
            points_max: 10,
            points: 0,
            status,
            region: 1,
            players_at_start: 0,
        }
    }

    fn tracking(id: i32) -> OngoingEvent {
        OngoingEvent::new(EventId::new(id), EventCategory::Defend, Utc::now())
    }

    #[test]
    fn idle_and_active_starts() {
        assert_eq!(plan(None, &observed(10, EventStatus::Active), false), Plan::Start);
    }

    #[test]
    fn idle_and_not_active_is_unchanged() {
        for status in [EventStatus::Success, EventStatus::Fail, EventStatus::Unknown] {
            assert_eq!(plan(None, &observed(10, status), false), Plan::Unchanged);
        }
    }

    #[test]
    fn same_id_is_unchanged_whatever_the_status() {
        let prior = tracking(10);
        for status in [
            EventStatus::Active,
            EventStatus::Success,
            EventStatus::Fail,
            EventStatus::Unknown,
        ] {
            assert_eq!(
                plan(Some(&prior), &observed(10, status), false),
                Plan::Unchanged
            );
        }
    }

    #[test]
    fn new_active_id_supersedes() {
        let prior = tracking(10);
        assert_eq!(
            plan(Some(&prior), &observed(11, EventStatus::Active), false),
            Plan::Supersede { closed: prior }
        );
    }

    #[test]
    fn new_terminal_id_closes() {
        let prior = tracking(10);
        assert_eq!(
            plan(Some(&prior), &observed(11, EventStatus::Fail), false),
            Plan::Close {
                closed: prior.clone()
            }
        );
        assert_eq!(
            plan(Some(&prior), &observed(11, EventStatus::Unknown), false),
            Plan::Close { closed: prior }
        );
    }

    #[test]
    fn same_id_terminal_concludes_when_enabled() {
        let prior = tracking(10);
        assert_eq!(
            plan(Some(&prior), &observed(10, EventStatus::Fail), true),
            Plan::Conclude {
                closed: prior.clone(),
                outcome: AlertKind::Fail,
            }
        );
        assert_eq!(
            plan(Some(&prior), &observed(10, EventStatus::Active), true),
            Plan::Unchanged
        );
    }
}
