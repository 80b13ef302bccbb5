//! Bounded, time-limited cache of exchange rates with coalesced refreshes.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// A source→target currency pair, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurrencyPair {
    pub source: String,
    pub target: String,
}

impl CurrencyPair {
    pub fn new(source: &str, target: &str) -> Self {
        Self { source: source.trim().to_uppercase(), target: target.trim().to_uppercase() }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.target)
    }
}

/// A cached rate and when it was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRate {
    pub rate: f64,
    pub fetched_at: Instant,
    /// True when `rate` is the configured fallback rather than a live quote
    pub is_fallback: bool,
}

/// Rate cache keyed by currency pair.
///
/// A single async mutex guards the map and is held across a refresh, so a
/// burst of concurrent misses triggers one refresh and the rest observe its
/// result.
pub struct RateCache {
    capacity: usize,
    ttl: Duration,
    entries: Mutex<HashMap<CurrencyPair, ExchangeRate>>,
}

impl RateCache {
    /// Creates a cache holding at most `capacity` pairs for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self { capacity: capacity.max(1), ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Returns the fresh entry for `pair`, or awaits `refresh` and stores its result.
    pub async fn get_or_refresh<F, Fut>(&self, pair: &CurrencyPair, refresh: F) -> ExchangeRate
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = (f64, bool)>,
    {
        let mut entries = self.entries.lock().await;

        if let Some(entry) = entries.get(pair) {
            if entry.fetched_at.elapsed() < self.ttl {
                trace!("Rate cache hit for {}", pair);
                return *entry;
            }
        }

        let (rate, is_fallback) = refresh().await;
        let entry = ExchangeRate { rate, fetched_at: Instant::now(), is_fallback };

        self.make_room(&mut entries, pair);
        entries.insert(pair.clone(), entry);
        entry
    }

    /// Number of cached pairs, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns true if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drops expired entries, then the oldest ones until `pair` fits.
    fn make_room(&self, entries: &mut HashMap<CurrencyPair, ExchangeRate>, pair: &CurrencyPair) {
        entries.retain(|_, e| e.fetched_at.elapsed() < self.ttl);

        while !entries.contains_key(pair) && entries.len() >= self.capacity {
            let Some(oldest) =
                entries.iter().min_by_key(|(_, e)| e.fetched_at).map(|(k, _)| k.clone())
            else {
                break;
            };
            trace!("Evicting rate for {}", oldest);
            entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_pair_uppercased() {
        let pair = CurrencyPair::new(" try", "usd ");
        assert_eq!(pair, CurrencyPair::new("TRY", "USD"));
        assert_eq!(pair.to_string(), "TRY/USD");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = RateCache::new(4, Duration::from_secs(60));
        let pair = CurrencyPair::new("TRY", "USD");
        let counter = AtomicU32::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let entry = cache
                .get_or_refresh(&pair, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    (0.03, false)
                })
                .await;
            assert_eq!(entry.rate, 0.03);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_after_ttl() {
        let cache = RateCache::new(4, Duration::from_secs(60));
        let pair = CurrencyPair::new("TRY", "USD");

        let first = cache.get_or_refresh(&pair, || async { (0.03, false) }).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        let second = cache.get_or_refresh(&pair, || async { (0.04, false) }).await;

        assert_eq!(first.rate, 0.03);
        assert_eq!(second.rate, 0.04);
        assert!(second.fetched_at > first.fetched_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let cache = RateCache::new(2, Duration::from_secs(600));

        let a = CurrencyPair::new("TRY", "USD");
        let b = CurrencyPair::new("TRY", "EUR");
        let c = CurrencyPair::new("TRY", "GBP");

        cache.get_or_refresh(&a, || async { (1.0, false) }).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.get_or_refresh(&b, || async { (2.0, false) }).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.get_or_refresh(&c, || async { (3.0, false) }).await;

        assert_eq!(cache.len().await, 2);

        // `a` was evicted, so it refreshes again
        let entry = cache.get_or_refresh(&a, || async { (9.0, false) }).await;
        assert_eq!(entry.rate, 9.0);
    }

    #[tokio::test]
    async fn test_zero_capacity_still_caches_one() {
        let cache = RateCache::new(0, Duration::from_secs(600));
        let pair = CurrencyPair::new("TRY", "USD");

        cache.get_or_refresh(&pair, || async { (1.0, false) }).await;
        assert!(!cache.is_empty().await);
        let entry = cache.get_or_refresh(&pair, || async { (2.0, false) }).await;
        assert_eq!(entry.rate, 1.0);
    }
}
