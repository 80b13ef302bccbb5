//! HTTP client for the exchange-rate provider.

use crate::config::Config;
use crate::error::LookupError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use wreq::Client;

const EXCHANGE_RATE_BASE: &str = "https://api.exchangerate-api.com";

/// Trait for exchange-rate lookups - enables mocking for tests.
#[async_trait]
pub trait RateLookup: Send + Sync {
    /// Returns how many units of `target` one unit of `source` buys.
    async fn lookup(&self, source: &str, target: &str) -> Result<f64, LookupError>;
}

/// Client for the `v4/latest/{BASE}` endpoint of exchangerate-api.com.
pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
}

impl ExchangeRateClient {
    /// Creates a new client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.fx_timeout_secs))
            .connect_timeout(Duration::from_secs(config.fx_timeout_secs.min(10)));

        if let Some(proxy_url) = &config.proxy {
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        let base_url =
            config.fx_base_url.clone().unwrap_or_else(|| EXCHANGE_RATE_BASE.to_string());

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl RateLookup for ExchangeRateClient {
    async fn lookup(&self, source: &str, target: &str) -> Result<f64, LookupError> {
        let url = format!("{}/v4/latest/{}", self.base_url, urlencoding::encode(source));
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| LookupError::Network(e.to_string()))?;
        let data: Value =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;

        data.get("rates")
            .and_then(|rates| rates.get(target))
            .and_then(Value::as_f64)
            .ok_or_else(|| LookupError::MissingRate(target.to_string()))
    }
}
