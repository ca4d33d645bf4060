//! Notification delivery.
//!
//! The reconciler only knows the [`Notifier`] trait: hand over a rendered
//! text, get back success or a [`HeraldError::Notify`]. Delivery is best
//! effort; callers log failures and move on.

pub mod discord;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::HeraldError;

pub use discord::DiscordNotifier;

/// Delivers a text message to the configured channel.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Sends `text`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Notify`] if the message was not accepted.
    async fn send(&self, text: &str) -> Result<(), HeraldError>;
}
