//! HTTP client for chart and title pages using wreq for TLS fingerprint emulation.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Source of raw chart documents - enables mocking and fixtures in tests.
#[async_trait]
pub trait ChartSource: Send + Sync {
    /// Fetches the listing page HTML.
    async fn listing(&self) -> Result<String>;

    /// Fetches the detail page addressed by a listing reference.
    async fn detail(&self, reference: &str) -> Result<String>;
}

/// Chart HTTP client with browser impersonation and request pacing.
pub struct ChartClient {
    client: Client,
    base_url: String,
    listing_path: String,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl ChartClient {
    /// Creates a new client with the given configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            listing_path: config.listing_path.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Resolves a detail reference against the base URL. Absolute
    /// references are returned unchanged.
    pub fn detail_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else if reference.starts_with('/') {
            format!("{}{}", self.base_url, reference)
        } else {
            format!("{}/{}", self.base_url, reference)
        }
    }

    fn listing_url(&self) -> String {
        self.detail_url(&self.listing_path)
    }

    /// Performs a GET request with pacing and browser headers.
    async fn get(&self, url: &str) -> Result<String> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 || status == 429 {
            warn!("Rate limited ({}). Consider increasing the delay.", status);
            anyhow::bail!("Rate limited ({}). Try increasing --delay.", status);
        }

        if !status.is_success() {
            anyhow::bail!("Request to {} failed with status: {}", url, status);
        }

        response.text().await.context("Failed to read response body")
    }

    /// Sleeps for the base delay plus random jitter.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl ChartSource for ChartClient {
    async fn listing(&self) -> Result<String> {
        let url = self.listing_url();
        info!("Fetching listing: {}", url);
        self.get(&url).await
    }

    async fn detail(&self, reference: &str) -> Result<String> {
        let url = self.detail_url(reference);
        debug!("Fetching detail: {}", url);
        self.get(&url).await
    }
}
