//! # defend-herald
//!
//! Polls the Helldivers campaign API and announces defend events on a
//! Discord channel.
//!
//! Upstream only offers snapshots: there are no push notifications, polls
//! can be missed, and the "current defend event" slot may be overwritten
//! between two polls. The herald keeps a durable registry of the event it
//! believes is in progress and reconciles every fresh snapshot against it,
//! so that each start and each outcome is announced exactly once, across
//! restarts included.
//!
//! ## Architecture
//!
//! ```text
//! PollDriver (service/)  ── every POLL_INTERVAL_SECS
//!     │
//!     ├── CampaignSource (upstream/)      fetch snapshot
//!     ├── SnapshotStore (persistence/)    append snapshot
//!     │
//!     └── Reconciler (service/)
//!             ├── transition table        plan()
//!             ├── OngoingEventRegistry    commit mutation
//!             ├── OutcomeResolver         season-history side channel
//!             └── Notifier (notify/)      announce, after commit
//!
//! Status API (api/) ── read-only view of the same store
//!     │
//!     └── PostgreSQL Persistence (or in-memory)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod shutdown;
pub mod upstream;

#[cfg(test)]
mod testing;
