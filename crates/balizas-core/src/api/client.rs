//! HTTP client for the DGT eTraffic incident feed.
//!
//! One POST per refresh cycle; the response body is handed back still
//! obfuscated; decoding is the synchronizer's job.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;

use super::FeedError;

// ============================================================================
// Constants
// ============================================================================

/// Default endpoint serving the filtered incident feed.
pub const DEFAULT_FEED_URL: &str = "https://etraffic.dgt.es/etrafficWEB/api/cache/getFilteredData";

/// The only cause category V16 beacon reports are filed under.
const BEACON_CAUSE_FILTER: &str = "Otras incidencias";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fixed filter body sent with every request.
#[derive(Debug, Serialize)]
struct FeedFilters {
    #[serde(rename = "filtrosVia")]
    road_filters: Vec<String>,
    #[serde(rename = "filtrosCausa")]
    cause_filters: Vec<&'static str>,
}

impl FeedFilters {
    fn beacons_only() -> Self {
        Self {
            road_filters: Vec::new(),
            cause_filters: vec![BEACON_CAUSE_FILTER],
        }
    }
}

/// Anything able to hand over one raw (still obfuscated) feed payload.
///
/// Implementations must not retry on their own; a failed fetch fails the
/// cycle and the next request tries again.
pub trait FeedSource: Send + Sync {
    fn fetch_raw_feed(&self) -> impl Future<Output = Result<String, FeedError>> + Send;
}

/// Feed client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct FeedClient {
    client: Client,
    feed_url: String,
}

impl FeedClient {
    /// Create a client for `feed_url` with the given request timeout
    pub fn new(feed_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            feed_url: feed_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.feed_url(), config.request_timeout())
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Fetch the raw feed body. Non-success statuses and transport errors
    /// both surface as `FeedError::Unavailable`.
    pub async fn fetch_raw_feed(&self) -> Result<String, FeedError> {
        let response = self
            .client
            .post(&self.feed_url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&FeedFilters::beacons_only())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::from_status(status, &body));
        }

        let body = response.text().await?;
        debug!(url = %self.feed_url, bytes = body.len(), "Feed payload received");
        Ok(body)
    }
}

impl FeedSource for FeedClient {
    async fn fetch_raw_feed(&self) -> Result<String, FeedError> {
        FeedClient::fetch_raw_feed(self).await
    }
}
