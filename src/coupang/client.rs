//! HTTP client for the review API using wreq for TLS fingerprint emulation.

use crate::config::Config;
use crate::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// A single GET against the review API - enables mocking for tests.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetches `url` and returns the parsed JSON body.
    ///
    /// `product_id` is only used to build the request headers.
    async fn get_json(&self, url: &str, product_id: &str) -> Result<Value, FetchError>;
}

/// Review API client with browser impersonation and optional proxy.
pub struct CoupangClient {
    client: Client,
    base_url: String,
}

impl CoupangClient {
    /// Creates a new client from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy) = config.active_proxy() {
            debug!("Configuring proxy: {}", proxy.endpoint());
            let proxy = wreq::Proxy::all(proxy.url()).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    /// Referer the product page would send.
    fn referer(&self, product_id: &str) -> String {
        format!("{}/vp/products/{}", self.base_url, urlencoding::encode(product_id))
    }
}

#[async_trait]
impl ReviewSource for CoupangClient {
    async fn get_json(&self, url: &str, product_id: &str) -> Result<Value, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "application/json, text/plain, */*")
            .header("Accept-Language", "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Referer", self.referer(product_id))
            .header("Sec-Ch-Ua", "\"Chromium\";v=\"131\", \"Not_A Brand\";v=\"24\"")
            .header("Sec-Ch-Ua-Mobile", "?0")
            .header("Sec-Ch-Ua-Platform", "\"Windows\"")
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .send()
            .await?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 403 || status == 429 || status == 503 {
            warn!("Blocked with status {}. Consider using a proxy or increasing delay.", status);
            return Err(FetchError::RateLimited { status: status.as_u16() });
        }

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
