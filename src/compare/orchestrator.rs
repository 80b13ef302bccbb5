//! Concurrent fan-out of hotel searches with per-call timeouts.

use super::models::{Outcome, Status};
use crate::config::Config;
use crate::error::{CompareError, SearchError};
use crate::serp::models::{get_array, is_truthy};
use crate::serp::{select, HotelSearch, Query, SearchContext};
use futures_util::future::join_all;
use rand::RngExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Scheduling knobs for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Bound on a single provider call
    pub request_timeout: Duration,
    /// Maximum searches in flight; 1 runs them one after another
    pub concurrency: usize,
    /// Pause before each call
    pub delay_ms: u64,
    /// Random extra pause (0 to this value)
    pub delay_jitter_ms: u64,
    /// Largest accepted batch
    pub max_hotels: usize,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            concurrency: config.concurrency,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            max_hotels: config.max_hotels,
        }
    }

    fn jittered_delay(&self) -> Duration {
        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };
        Duration::from_millis(self.delay_ms + jitter)
    }
}

/// Runs one search per hotel and collects outcomes in request order.
pub struct FetchOrchestrator {
    search: Arc<dyn HotelSearch>,
    settings: FetchSettings,
}

impl FetchOrchestrator {
    pub fn new(search: Arc<dyn HotelSearch>, settings: FetchSettings) -> Self {
        Self { search, settings }
    }

    /// Checks the request and returns the trimmed, non-blank hotel names.
    pub fn validate(
        &self,
        names: &[String],
        ctx: &SearchContext,
    ) -> Result<Vec<String>, CompareError> {
        let names: Vec<String> =
            names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()).map(String::from).collect();

        if names.is_empty() {
            return Err(CompareError::NoHotels);
        }
        if self.settings.max_hotels > 0 && names.len() > self.settings.max_hotels {
            return Err(CompareError::TooManyHotels {
                count: names.len(),
                max: self.settings.max_hotels,
            });
        }
        if ctx.location.trim().is_empty() {
            return Err(CompareError::EmptyLocation);
        }
        if ctx.check_out <= ctx.check_in {
            return Err(CompareError::InvalidDateRange {
                check_in: ctx.check_in,
                check_out: ctx.check_out,
            });
        }

        Ok(names)
    }

    /// Fetches every hotel concurrently and waits for all of them.
    ///
    /// Returns one outcome per non-blank name, in input order. Individual
    /// failures become outcome statuses; only an invalid request is an error.
    pub async fn compare(
        &self,
        names: &[String],
        ctx: &SearchContext,
    ) -> Result<Vec<Outcome>, CompareError> {
        let names = self.validate(names, ctx)?;

        info!(
            "Comparing {} hotels in {} (concurrency {})",
            names.len(),
            ctx.location,
            self.settings.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));

        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let search = Arc::clone(&self.search);
                let semaphore = Arc::clone(&semaphore);
                let query = ctx.query_for(name);
                let timeout = self.settings.request_timeout;
                let delay = self.settings.jittered_delay();

                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    if !delay.is_zero() {
                        debug!("Delaying {}ms", delay.as_millis());
                        tokio::time::sleep(delay).await;
                    }
                    fetch_one(search.as_ref(), &query, timeout).await
                })
            })
            .collect();

        let outcomes: Vec<Outcome> = join_all(handles)
            .await
            .into_iter()
            .zip(names)
            .map(|(joined, name)| {
                joined.unwrap_or_else(|e| {
                    error!("Unexpected error fetching '{}': {}", name, e);
                    Outcome::failed(name, Status::UnexpectedError)
                })
            })
            .collect();

        let available = outcomes.iter().filter(|o| o.status.is_available()).count();
        info!("{} of {} hotels priced", available, outcomes.len());

        Ok(outcomes)
    }
}

/// Issues one bounded search and classifies the result.
pub async fn fetch_one(search: &dyn HotelSearch, query: &Query, timeout: Duration) -> Outcome {
    let name = query.entity_name.as_str();

    match tokio::time::timeout(timeout, search.search(query)).await {
        Err(_) => {
            error!("Timeout fetching '{}'", name);
            Outcome::failed(name, Status::Timeout)
        }
        Ok(Err(e @ (SearchError::Network(_) | SearchError::Status(_)))) => {
            error!("Network error fetching '{}': {}", name, e);
            Outcome::failed(name, Status::NetworkError)
        }
        Ok(Err(e @ SearchError::Decode(_))) => {
            error!("Unexpected error fetching '{}': {}", name, e);
            Outcome::failed(name, Status::UnexpectedError)
        }
        Ok(Ok(data)) => classify_payload(name, &data),
    }
}

/// Turns a successful provider payload into an outcome.
pub fn classify_payload(name: &str, data: &Value) -> Outcome {
    if let Some(err) = data.get("error").filter(|e| is_truthy(e)) {
        warn!("Provider error for '{}': {}", name, err);
        return Outcome::failed(name, Status::ProviderError);
    }

    let properties = get_array(data, &["properties"]);
    debug!("'{}' returned {} candidates", name, properties.len());

    Outcome::from_selection(name, select(properties, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Payload(Value),
        Fail(SearchError),
        Slow(Duration, Value),
        Panic,
    }

    /// Mock search provider keyed by hotel name.
    struct MockSearch {
        replies: HashMap<String, Reply>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        calls: AtomicUsize,
    }

    impl MockSearch {
        fn new(replies: Vec<(&str, Reply)>) -> Self {
            Self {
                replies: replies.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl HotelSearch for MockSearch {
        async fn search(&self, query: &Query) -> Result<Value, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let result = match self.replies.get(&query.entity_name) {
                Some(Reply::Payload(v)) => {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(v.clone())
                }
                Some(Reply::Fail(e)) => Err(e.clone()),
                Some(Reply::Slow(d, v)) => {
                    tokio::time::sleep(*d).await;
                    Ok(v.clone())
                }
                Some(Reply::Panic) => panic!("Simulated crash"),
                None => Ok(json!({"properties": []})),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn ctx() -> SearchContext {
        SearchContext::new(
            "Balıkesir",
            "2025-12-01".parse().unwrap(),
            "2025-12-05".parse().unwrap(),
            2,
        )
    }

    fn settings(concurrency: usize) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_secs(30),
            concurrency,
            delay_ms: 0,
            delay_jitter_ms: 0,
            max_hotels: 4,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn priced(name: &str, price: &str) -> Reply {
        Reply::Payload(json!({"properties": [{"name": name, "price": price}]}))
    }

    #[tokio::test]
    async fn test_outcomes_keep_input_order() {
        let search = Arc::new(MockSearch::new(vec![
            ("Hotel A", Reply::Slow(Duration::from_millis(300), json!({"properties": [{"name": "Hotel A", "price": "₺500"}]}))),
            ("Hotel B", priced("Hotel B", "₺300")),
            ("Hotel C", Reply::Fail(SearchError::Network("refused".to_string()))),
        ]));
        let orchestrator = FetchOrchestrator::new(search, settings(4));

        let outcomes =
            orchestrator.compare(&names(&["Hotel A", "Hotel B", "Hotel C"]), &ctx()).await.unwrap();

        let order: Vec<&str> = outcomes.iter().map(|o| o.entity_name.as_str()).collect();
        assert_eq!(order, vec!["Hotel A", "Hotel B", "Hotel C"]);
        assert_eq!(outcomes[0].price, Some(Decimal::new(500, 0)));
        assert_eq!(outcomes[2].status, Status::NetworkError);
    }

    #[tokio::test]
    async fn test_blank_names_are_skipped() {
        let search = Arc::new(MockSearch::new(vec![("Hotel A", priced("Hotel A", "₺100"))]));
        let orchestrator = FetchOrchestrator::new(search.clone(), settings(4));

        let outcomes =
            orchestrator.compare(&names(&["", " Hotel A ", "   "]), &ctx()).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].entity_name, "Hotel A");
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let search = Arc::new(MockSearch::new(vec![
            ("Hotel A", Reply::Panic),
            ("Hotel B", priced("Hotel B", "₺300")),
            ("Hotel C", Reply::Fail(SearchError::Status(502))),
            ("Hotel D", Reply::Fail(SearchError::Decode("bad json".to_string()))),
        ]));
        let orchestrator = FetchOrchestrator::new(search, settings(4));

        let outcomes = orchestrator
            .compare(&names(&["Hotel A", "Hotel B", "Hotel C", "Hotel D"]), &ctx())
            .await
            .unwrap();

        let statuses: Vec<Status> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                Status::UnexpectedError,
                Status::Available,
                Status::NetworkError,
                Status::UnexpectedError
            ]
        );
        assert_eq!(outcomes[0].entity_name, "Hotel A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_only_affects_slow_task() {
        let search = Arc::new(MockSearch::new(vec![
            ("Hotel A", Reply::Slow(Duration::from_secs(60), json!({"properties": []}))),
            ("Hotel B", priced("Hotel B", "₺300")),
        ]));
        let orchestrator = FetchOrchestrator::new(search, settings(4));

        let outcomes = orchestrator.compare(&names(&["Hotel A", "Hotel B"]), &ctx()).await.unwrap();

        assert_eq!(outcomes[0].status, Status::Timeout);
        assert!(outcomes[0].price.is_none());
        assert_eq!(outcomes[1].status, Status::Available);
    }

    #[tokio::test]
    async fn test_concurrency_one_is_sequential() {
        let search = Arc::new(MockSearch::new(vec![
            ("Hotel A", priced("Hotel A", "₺1")),
            ("Hotel B", priced("Hotel B", "₺2")),
            ("Hotel C", priced("Hotel C", "₺3")),
        ]));
        let orchestrator = FetchOrchestrator::new(search.clone(), settings(1));

        let outcomes =
            orchestrator.compare(&names(&["Hotel A", "Hotel B", "Hotel C"]), &ctx()).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(search.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_runs_concurrently() {
        let slow = |name: &str| {
            Reply::Slow(Duration::from_millis(200), json!({"properties": [{"name": name, "price": 1}]}))
        };
        let search = Arc::new(MockSearch::new(vec![
            ("Hotel A", slow("Hotel A")),
            ("Hotel B", slow("Hotel B")),
            ("Hotel C", slow("Hotel C")),
        ]));
        let orchestrator = FetchOrchestrator::new(search.clone(), settings(4));

        orchestrator.compare(&names(&["Hotel A", "Hotel B", "Hotel C"]), &ctx()).await.unwrap();

        assert_eq!(search.max_in_flight.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_hotels_is_rejected() {
        let search = Arc::new(MockSearch::new(vec![]));
        let orchestrator = FetchOrchestrator::new(search.clone(), settings(4));

        let err = orchestrator.compare(&names(&["", "  "]), &ctx()).await.unwrap_err();
        assert_eq!(err, CompareError::NoHotels);

        let err = orchestrator.compare(&[], &ctx()).await.unwrap_err();
        assert_eq!(err, CompareError::NoHotels);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_too_many_hotels_is_rejected() {
        let orchestrator = FetchOrchestrator::new(Arc::new(MockSearch::new(vec![])), settings(4));

        let err = orchestrator
            .compare(&names(&["A", "B", "C", "D", "E"]), &ctx())
            .await
            .unwrap_err();
        assert_eq!(err, CompareError::TooManyHotels { count: 5, max: 4 });
    }

    #[tokio::test]
    async fn test_invalid_context_is_rejected() {
        let orchestrator = FetchOrchestrator::new(Arc::new(MockSearch::new(vec![])), settings(4));

        let mut bad_location = ctx();
        bad_location.location = "  ".to_string();
        let err = orchestrator.compare(&names(&["A"]), &bad_location).await.unwrap_err();
        assert_eq!(err, CompareError::EmptyLocation);

        let mut bad_dates = ctx();
        bad_dates.check_out = bad_dates.check_in;
        let err = orchestrator.compare(&names(&["A"]), &bad_dates).await.unwrap_err();
        assert!(matches!(err, CompareError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_classify_provider_error() {
        let outcome = classify_payload("Hotel A", &json!({"error": "Invalid API key."}));
        assert_eq!(outcome, Outcome::failed("Hotel A", Status::ProviderError));
    }

    #[test]
    fn test_classify_empty_error_is_ignored() {
        let outcome = classify_payload("Hotel A", &json!({"error": "", "properties": []}));
        assert_eq!(outcome.status, Status::NotFound);
    }

    #[test]
    fn test_classify_missing_properties() {
        let outcome = classify_payload("Hotel A", &json!({"search_metadata": {}}));
        assert_eq!(outcome, Outcome::failed("Hotel A", Status::NotFound));
    }

    #[test]
    fn test_jittered_delay_bounds() {
        let mut s = settings(1);
        s.delay_ms = 100;
        s.delay_jitter_ms = 50;
        for _ in 0..20 {
            let d = s.jittered_delay();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(150));
        }

        s.delay_jitter_ms = 0;
        assert_eq!(s.jittered_delay(), Duration::from_millis(100));
    }
}
