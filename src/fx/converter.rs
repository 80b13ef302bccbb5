//! Currency conversion that always yields a usable rate.

use super::cache::{CurrencyPair, ExchangeRate, RateCache};
use super::client::RateLookup;
use crate::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Supplies source→target multipliers from a cache, a live lookup, or the fallback.
///
/// Lookup failures (errors, timeouts, non-positive quotes) resolve to the
/// fallback rate, which is cached like a live quote so a dead provider is
/// asked at most once per cache lifetime.
pub struct RateConverter {
    lookup: Arc<dyn RateLookup>,
    cache: RateCache,
    fallback_rate: f64,
    timeout: Duration,
}

impl RateConverter {
    /// Creates a converter with explicit settings.
    pub fn new(
        lookup: Arc<dyn RateLookup>,
        cache: RateCache,
        fallback_rate: f64,
        timeout: Duration,
    ) -> Self {
        Self { lookup, cache, fallback_rate, timeout }
    }

    /// Creates a converter using the cache and timeout settings from `config`.
    pub fn from_config(lookup: Arc<dyn RateLookup>, config: &Config) -> Self {
        let cache = RateCache::new(
            config.rate_cache_capacity,
            Duration::from_secs(config.rate_ttl_secs),
        );
        Self::new(lookup, cache, config.fallback_rate, Duration::from_secs(config.fx_timeout_secs))
    }

    /// Returns the multiplier converting `source` amounts into `target`.
    pub async fn rate(&self, source: &str, target: &str) -> f64 {
        self.exchange_rate(source, target).await.rate
    }

    /// Like [`rate`](Self::rate), but also reports when and how the rate was obtained.
    pub async fn exchange_rate(&self, source: &str, target: &str) -> ExchangeRate {
        let pair = CurrencyPair::new(source, target);
        self.cache.get_or_refresh(&pair, || self.fetch(&pair)).await
    }

    async fn fetch(&self, pair: &CurrencyPair) -> (f64, bool) {
        if pair.source == pair.target {
            return (1.0, false);
        }

        match tokio::time::timeout(self.timeout, self.lookup.lookup(&pair.source, &pair.target))
            .await
        {
            Ok(Ok(rate)) if rate.is_finite() && rate > 0.0 => {
                info!("Fetched {} rate: {}", pair, rate);
                (rate, false)
            }
            Ok(Ok(rate)) => {
                warn!(
                    "Ignoring unusable {} rate {}. Using fallback {}",
                    pair, rate, self.fallback_rate
                );
                (self.fallback_rate, true)
            }
            Ok(Err(e)) => {
                warn!(
                    "Could not fetch {} rate: {}. Using fallback {}",
                    pair, e, self.fallback_rate
                );
                (self.fallback_rate, true)
            }
            Err(_) => {
                warn!(
                    "{} rate lookup timed out after {:?}. Using fallback {}",
                    pair, self.timeout, self.fallback_rate
                );
                (self.fallback_rate, true)
            }
        }
    }
}
