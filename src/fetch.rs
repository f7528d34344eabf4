//! Landing page retrieval.
//!
//! [`PageFetcher`] issues a single GET per call and parses the body into a
//! [`scraper::Html`] tree. Markup errors never fail a fetch: html5ever builds
//! a best-effort tree out of whatever the site sends. Retries are left to the
//! orchestrator.

use crate::config::HttpConfig;
use crate::error::FetchError;
use reqwest::Client;
use scraper::Html;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and parse the body as an HTML document.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL of the landing page.
    ///
    /// # Returns
    ///
    /// The parsed document. Malformed markup still yields a tree.
    ///
    /// # Errors
    ///
    /// [`FetchError::Request`] for transport failures (DNS, connect, timeout,
    /// body read) and [`FetchError::Status`] for non-success statuses.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Html, FetchError> {
        let t0 = Instant::now();
        let body = self.fetch_text(url).await.inspect_err(|e| {
            warn!(error = %e, elapsed_ms = t0.elapsed().as_millis() as u64, "Fetch failed");
        })?;

        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        let document = Html::parse_document(&body);
        if !document.errors.is_empty() {
            debug!(count = document.errors.len(), "Tolerated markup errors");
        }
        Ok(document)
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(request_error)
    }
}
