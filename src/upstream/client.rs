//! HTTP client for the Helldivers campaign API.
//!
//! The API takes form-encoded POSTs with an `action` field and answers with
//! JSON. Its certificate does not always validate, so certificate checks can
//! be relaxed through configuration.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::CampaignSource;
use crate::domain::{SeasonHistory, Snapshot};
use crate::error::HeraldError;

/// [`CampaignSource`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCampaignSource {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpCampaignSource {
    /// Default public endpoint of the campaign API.
    pub const DEFAULT_ENDPOINT: &str = "https://api.helldiversgame.com/1.0/";

    /// Builds a client for `endpoint` with a bounded request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Config`] if the TLS backend cannot be
    /// initialised.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        accept_invalid_certs: bool,
    ) -> Result<Self, HeraldError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .user_agent(concat!("defend-herald/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HeraldError::Config(format!("cannot build upstream client: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T: DeserializeOwned>(&self, form: &[(&str, &str)]) -> Result<T, HeraldError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .form(form)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| HeraldError::Upstream(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| HeraldError::Upstream(e.to_string()))?;
        debug!(bytes = body.len(), ?form, "upstream response received");
        decode(&body)
    }
}

/// Decodes an upstream JSON body.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, HeraldError> {
    serde_json::from_slice(body).map_err(|e| HeraldError::Decode(e.to_string()))
}

#[async_trait]
impl CampaignSource for HttpCampaignSource {
    async fn fetch_campaign_status(&self) -> Result<Snapshot, HeraldError> {
        self.post(&[("action", "get_campaign_status")]).await
    }

    async fn fetch_season_history(&self, season: i32) -> Result<SeasonHistory, HeraldError> {
        let season = season.to_string();
        self.post(&[("action", "get_snapshots"), ("season", season.as_str())])
            .await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::campaign::tests::CAMPAIGN_STATUS;

    #[test]
    fn decode_accepts_campaign_status() {
        let Ok(snapshot) = decode::<Snapshot>(CAMPAIGN_STATUS.as_bytes()) else {
            panic!("fixture should decode");
        };
        assert_eq!(snapshot.error_code, 0);
    }

    #[test]
    fn decode_maps_garbage_to_decode_error() {
        let result = decode::<Snapshot>(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(HeraldError::Decode(_))));
    }

    #[test]
    fn client_builds_with_relaxed_certificates() {
        let source = HttpCampaignSource::new(
            HttpCampaignSource::DEFAULT_ENDPOINT,
            Duration::from_secs(5),
            true,
        );
        let Ok(source) = source else {
            panic!("client should build");
        };
        assert_eq!(source.endpoint(), HttpCampaignSource::DEFAULT_ENDPOINT);
    }
}
