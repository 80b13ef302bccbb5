//! Hotel price comparison command.

use crate::compare::{FetchOrchestrator, FetchSettings, Report, ResultAggregator};
use crate::config::Config;
use crate::format::Formatter;
use crate::fx::{ExchangeRateClient, RateConverter, RateLookup};
use crate::serp::{HotelSearch, SearchContext, SerpClient};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Compares prices for several hotels over one stay.
///
/// The command owns one rate converter, so its cache outlives a single
/// comparison and repeated runs share cached (or fallback) rates.
pub struct CompareCommand {
    config: Config,
    converter: Arc<RateConverter>,
}

impl CompareCommand {
    /// Creates a new compare command backed by the live exchange-rate API.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let lookup =
            ExchangeRateClient::new(&config).context("Failed to create exchange-rate client")?;

        Ok(Self::with_lookup(config, Arc::new(lookup)))
    }

    /// Creates a command with a provided rate lookup (for testing).
    pub fn with_lookup(config: Config, lookup: Arc<dyn RateLookup>) -> Self {
        let converter = Arc::new(RateConverter::from_config(lookup, &config));
        Self::with_converter(config, converter)
    }

    /// Creates a command sharing an existing converter and its cache.
    pub fn with_converter(config: Config, converter: Arc<RateConverter>) -> Self {
        Self { config, converter }
    }

    /// Runs the comparison against the live search API and returns formatted output.
    pub async fn execute(&self, names: &[String], ctx: &SearchContext) -> Result<String> {
        let api_key = self.config.require_api_key()?;
        let search = SerpClient::new(&self.config, api_key)
            .context("Failed to create search client")?;

        self.execute_with(Arc::new(search), names, ctx).await
    }

    /// Runs the comparison with a provided search client (for testing).
    pub async fn execute_with(
        &self,
        search: Arc<dyn HotelSearch>,
        names: &[String],
        ctx: &SearchContext,
    ) -> Result<String> {
        let report = self.report_with(search, names, ctx).await?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_report(&report))
    }

    /// Produces the report without rendering it.
    pub async fn report_with(
        &self,
        search: Arc<dyn HotelSearch>,
        names: &[String],
        ctx: &SearchContext,
    ) -> Result<Report> {
        let orchestrator = FetchOrchestrator::new(search, FetchSettings::from_config(&self.config));
        let outcomes = orchestrator.compare(names, ctx).await?;

        let aggregator = ResultAggregator::new(
            Arc::clone(&self.converter),
            &self.config.source_currency,
            &self.config.target_currency,
        );
        let report = aggregator.finalize(&outcomes).await;

        if let Some(best) = &report.best {
            info!("Cheapest: {} at {}", best.entity_name, best.price_source);
        }

        Ok(report)
    }
}
