//! HTTP fetching for article pages and feeds.
//!
//! One [`ArticleFetcher`] (and its connection pool) is shared by every
//! article in a run. Each request is bounded by the configured timeout so a
//! single unresponsive site cannot stall the batch.

use crate::config::FetchConfig;
use crate::error::FetchError;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Source of raw HTML for a URL.
pub trait FetchHtml {
    /// Download the body at `url`.
    ///
    /// Non-success statuses, timeouts and connection errors are all
    /// reported as [`FetchError`].
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest`-backed fetcher with a browser-like User-Agent.
#[derive(Debug, Clone)]
pub struct ArticleFetcher {
    client: Client,
}

impl ArticleFetcher {
    /// Build the HTTP client from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchHtml for ArticleFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let t0 = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Article request returned an error status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let dt = t0.elapsed();
        info!(bytes = body.len(), elapsed_ms = dt.as_millis() as u64, "Fetched page");
        debug!(status = status.as_u16(), "Response status");
        Ok(body)
    }
}
