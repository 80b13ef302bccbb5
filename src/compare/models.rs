//! Per-hotel outcomes and the report rows derived from them.

use crate::serp::Selection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one hotel's fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Available,
    NotFound,
    NoPrice,
    ProviderError,
    NetworkError,
    Timeout,
    UnexpectedError,
}

impl Status {
    /// Human-readable label shown next to each row.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Available => "✓ Available",
            Status::NotFound => "✗ Not found",
            Status::NoPrice => "✗ No price",
            Status::ProviderError => "✗ API Error",
            Status::NetworkError => "✗ Network Error",
            Status::Timeout => "✗ Timeout",
            Status::UnexpectedError => "✗ Error",
        }
    }

    /// Returns true only for a priced result.
    pub fn is_available(&self) -> bool {
        matches!(self, Status::Available)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of fetching one hotel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Provider's name for the matched hotel, or the requested name
    pub entity_name: String,
    /// Price in the source currency; present only when `status` is `Available`
    pub price: Option<Decimal>,
    pub status: Status,
}

impl Outcome {
    /// An outcome without a price.
    pub fn failed(entity_name: impl Into<String>, status: Status) -> Self {
        Self { entity_name: entity_name.into(), price: None, status }
    }

    /// Builds the outcome for a candidate selection.
    pub fn from_selection(requested: &str, selection: Selection) -> Self {
        match selection {
            Selection::NotFound => Self::failed(requested, Status::NotFound),
            Selection::NoPrice(candidate) => Self::failed(candidate.name, Status::NoPrice),
            Selection::Priced { candidate, amount } => {
                Self { entity_name: candidate.name, price: Some(amount), status: Status::Available }
            }
        }
    }
}

/// One rendered line of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub entity_name: String,
    /// Formatted source amount, or "N/A"
    pub price_source: String,
    /// Formatted target amount, or "N/A"
    pub price_target: String,
    pub status: Status,
    pub status_label: String,
}

/// Rows in request order plus the cheapest available row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub source_currency: String,
    pub target_currency: String,
    pub rows: Vec<ReportRow>,
    pub best: Option<ReportRow>,
}

impl Report {
    /// Number of rows with a price.
    pub fn available_count(&self) -> usize {
        self.rows.iter().filter(|r| r.status.is_available()).count()
    }

    /// Returns true if there are no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
