//! Exchange-rate lookup command.

use crate::config::Config;
use crate::format::Formatter;
use crate::fx::{CurrencyPair, ExchangeRateClient, RateConverter, RateLookup};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Prints the rate a comparison would use for the configured currency pair.
pub struct RateCommand {
    config: Config,
    converter: Arc<RateConverter>,
}

impl RateCommand {
    /// Creates a new rate command backed by the live exchange-rate API.
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

    /// Looks up the live rate (or the fallback) and returns formatted output.
    pub async fn execute(&self) -> Result<String> {
        let pair = CurrencyPair::new(&self.config.source_currency, &self.config.target_currency);
        let rate = self.converter.exchange_rate(&pair.source, &pair.target).await;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_rate(&pair, &rate))
    }
}
