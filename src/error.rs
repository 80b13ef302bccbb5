//! Typed errors for request validation and outbound provider calls.

use chrono::NaiveDate;
use thiserror::Error;

/// Caller-input errors, raised before any fetch task is launched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("no hotel names given")]
    NoHotels,

    #[error("too many hotels: {count} requested, at most {max} allowed")]
    TooManyHotels { count: usize, max: usize },

    #[error("location must not be empty")]
    EmptyLocation,

    #[error("check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange { check_in: NaiveDate, check_out: NaiveDate },
}

/// Failures of a single search provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("malformed provider response: {0}")]
    Decode(String),
}

/// Failures of a single exchange-rate lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate provider returned status {0}")]
    Status(u16),

    #[error("malformed rate response: {0}")]
    Decode(String),

    #[error("no rate for {0} in response")]
    MissingRate(String),
}
