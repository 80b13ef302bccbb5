//! Exchange rates: provider client, bounded cache and the degrading converter.

pub mod cache;
pub mod client;
pub mod converter;
pub mod currency;

pub use cache::{CurrencyPair, ExchangeRate, RateCache};
pub use client::{ExchangeRateClient, RateLookup};
pub use converter::RateConverter;
