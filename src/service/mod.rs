//! Service layer: reconciliation and the poll loop.
//!
//! [`PollDriver`] fetches a snapshot on every tick, stores it, and hands it
//! to the [`Reconciler`], which turns registry state plus the fresh
//! observation into registry mutations and announcements.

pub mod outcome;
pub mod poll_driver;
pub mod reconciler;
pub mod transition;

pub use outcome::{Outcome, OutcomeResolver, OutcomeSource};
pub use poll_driver::{PollCycle, PollDriver};
pub use reconciler::{Announcement, ReconcileReport, Reconciler};
pub use transition::Plan;
