//! hotel-compare - Compare hotel prices across one stay
//!
//! Searches each hotel through SerpAPI's Google Hotels engine concurrently,
//! picks the best-matching property, converts its price into a second
//! currency and reports the cheapest option.

pub mod commands;
pub mod compare;
pub mod config;
pub mod error;
pub mod format;
pub mod fx;
pub mod matching;
pub mod price;
pub mod serp;

pub use compare::{Outcome, Report, ReportRow, Status};
pub use config::Config;
pub use error::{CompareError, LookupError, SearchError};
pub use serp::SearchContext;
