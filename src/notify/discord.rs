//! Discord channel notifier over the REST API.
//!
//! Only two endpoints are used: `GET /users/@me` to check the bot token at
//! startup, and `POST /channels/{id}/messages` to deliver alerts.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Notifier;
use crate::error::HeraldError;

/// Body of a create-message request.
#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

/// The subset of the current-user object we log at startup.
#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
    username: String,
}

/// Posts alerts to one Discord channel as a bot user.
///
/// The channel id is read once at startup and never changes afterwards.
#[derive(Clone)]
pub struct DiscordNotifier {
    api_base: String,
    channel_id: String,
    token: String,
    http_client: reqwest::Client,
}

impl fmt::Debug for DiscordNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordNotifier")
            .field("api_base", &self.api_base)
            .field("channel_id", &self.channel_id)
            .finish_non_exhaustive()
    }
}

impl DiscordNotifier {
    /// Default Discord REST API base URL.
    pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

    /// Creates a notifier for `channel_id` authenticated with bot `token`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Config`] if the HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        channel_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HeraldError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HeraldError::Config(format!("cannot build discord client: {e}")))?;
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            channel_id: channel_id.into(),
            token: token.into(),
            http_client,
        })
    }

    /// Returns the target channel id.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Checks the bot token against `GET /users/@me`.
    ///
    /// A failure here is fatal at startup: without a valid token no alert
    /// could ever be delivered.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Notify`] if Discord rejects the token or
    /// cannot be reached.
    pub async fn authenticate(&self) -> Result<(), HeraldError> {
        let user: CurrentUser = self
            .http_client
            .get(format!("{}/users/@me", self.api_base))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| HeraldError::Notify(format!("discord authentication failed: {e}")))?
            .json()
            .await
            .map_err(|e| HeraldError::Notify(format!("unexpected discord user payload: {e}")))?;

        info!(
            bot_id = %user.id,
            bot_name = %user.username,
            channel_id = %self.channel_id,
            "authenticated with discord"
        );
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, text: &str) -> Result<(), HeraldError> {
        self.http_client
            .post(self.messages_url())
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&CreateMessage { content: text })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| HeraldError::Notify(e.to_string()))?;

        debug!(channel_id = %self.channel_id, "message delivered");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn notifier() -> DiscordNotifier {
        let Ok(n) = DiscordNotifier::new(
            "https://discord.test/api/v10/",
            "secret-token",
            "123456",
            Duration::from_secs(5),
        ) else {
            panic!("notifier should build");
        };
        n
    }

    #[test]
    fn messages_url_targets_channel() {
        assert_eq!(
            notifier().messages_url(),
            "https://discord.test/api/v10/channels/123456/messages"
        );
    }

    #[test]
    fn authorization_uses_bot_scheme() {
        assert_eq!(notifier().authorization(), "Bot secret-token");
    }

    #[test]
    fn debug_output_hides_token() {
        let debug = format!("{:?}", notifier());
        assert!(debug.contains("123456"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn create_message_body_shape() {
        let body = serde_json::to_string(&CreateMessage { content: "hi" }).unwrap_or_default();
        assert_eq!(body, r#"{"content":"hi"}"#);
    }
}
