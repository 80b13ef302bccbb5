//! HTTP client for the Google Hotels engine of SerpAPI.

use super::models::Query;
use crate::config::Config;
use crate::error::SearchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

const SERPAPI_BASE: &str = "https://serpapi.com";

/// Trait for hotel search providers - enables mocking for tests.
#[async_trait]
pub trait HotelSearch: Send + Sync {
    /// Runs one search and returns the raw, untrusted provider payload.
    async fn search(&self, query: &Query) -> Result<Value, SearchError>;
}

/// SerpAPI client. Currency and locale hints are fixed per client.
pub struct SerpClient {
    client: Client,
    base_url: String,
    api_key: String,
    currency: String,
    country: String,
    language: String,
}

impl SerpClient {
    /// Creates a new client from configuration.
    pub fn new(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder().gzip(true).connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        let base_url = config.serp_base_url.clone().unwrap_or_else(|| SERPAPI_BASE.to_string());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            currency: config.source_currency.clone(),
            country: config.country.clone(),
            language: config.language.clone(),
        })
    }

    /// Builds the search URL for a query. The API key is appended last so it
    /// can be cut off for logging.
    fn search_url(&self, query: &Query) -> (String, usize) {
        let url = format!(
            "{}/search?engine=google_hotels&q={}&check_in_date={}&check_out_date={}&adults={}&currency={}&gl={}&hl={}",
            self.base_url,
            urlencoding::encode(&query.search_text()),
            query.check_in.format("%Y-%m-%d"),
            query.check_out.format("%Y-%m-%d"),
            query.party_size,
            urlencoding::encode(&self.currency),
            urlencoding::encode(&self.country),
            urlencoding::encode(&self.language),
        );
        let redacted_len = url.len();

        (format!("{}&api_key={}", url, urlencoding::encode(&self.api_key)), redacted_len)
    }
}

#[async_trait]
impl HotelSearch for SerpClient {
    async fn search(&self, query: &Query) -> Result<Value, SearchError> {
        let (url, redacted_len) = self.search_url(query);

        info!("Searching hotels: {}", query.search_text());
        debug!("GET {}&api_key=***", &url[..redacted_len]);

        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| SearchError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))
    }
}
