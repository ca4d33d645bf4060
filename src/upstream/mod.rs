//! Upstream campaign API access.
//!
//! [`CampaignSource`] is the seam between the herald and the game's status
//! API: one call per poll for the current campaign, and an occasional
//! season-history call used to resolve event outcomes.

pub mod client;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::{SeasonHistory, Snapshot};
use crate::error::HeraldError;

pub use client::HttpCampaignSource;

/// Source of campaign observations.
#[async_trait]
pub trait CampaignSource: Send + Sync + Debug {
    /// Fetches the current campaign status.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Upstream`] on transport failure or a non-2xx
    /// answer, and [`HeraldError::Decode`] if the body is not a snapshot.
    async fn fetch_campaign_status(&self) -> Result<Snapshot, HeraldError>;

    /// Fetches the event history of `season`.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_campaign_status`](Self::fetch_campaign_status).
    async fn fetch_season_history(&self, season: i32) -> Result<SeasonHistory, HeraldError>;
}
