//! Converts outcomes into report rows and picks the cheapest hotel.

use super::models::{Outcome, Report, ReportRow};
use crate::fx::currency::format_amount;
use crate::fx::RateConverter;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

const NOT_AVAILABLE: &str = "N/A";

/// Builds the final report for one currency pair.
pub struct ResultAggregator {
    converter: Arc<RateConverter>,
    source_currency: String,
    target_currency: String,
}

impl ResultAggregator {
    pub fn new(
        converter: Arc<RateConverter>,
        source_currency: impl Into<String>,
        target_currency: impl Into<String>,
    ) -> Self {
        Self {
            converter,
            source_currency: source_currency.into(),
            target_currency: target_currency.into(),
        }
    }

    /// Converts prices and selects the best row. The rate is only looked up
    /// when at least one hotel is priced.
    pub async fn finalize(&self, outcomes: &[Outcome]) -> Report {
        let rate = if outcomes.iter().any(|o| o.status.is_available()) {
            Some(self.converter.rate(&self.source_currency, &self.target_currency).await)
        } else {
            None
        };

        build_report(outcomes, rate, &self.source_currency, &self.target_currency)
    }
}

/// Builds a report from outcomes and an optional source→target rate.
///
/// Rows keep outcome order. The best row is the cheapest available outcome by
/// raw amount; on ties the earliest wins.
pub fn build_report(
    outcomes: &[Outcome],
    rate: Option<f64>,
    source: &str,
    target: &str,
) -> Report {
    let multiplier = rate.filter(|r| r.is_finite() && *r > 0.0).and_then(Decimal::from_f64);

    let rows: Vec<ReportRow> =
        outcomes.iter().map(|o| to_row(o, multiplier, source, target)).collect();

    let mut best: Option<(usize, Decimal)> = None;
    for (i, outcome) in outcomes.iter().enumerate() {
        let Some(amount) = outcome.price.filter(|_| outcome.status.is_available()) else {
            continue;
        };
        if best.map_or(true, |(_, current)| amount < current) {
            best = Some((i, amount));
        }
    }

    if let Some((i, amount)) = best {
        debug!("Best price: {} at {}", outcomes[i].entity_name, amount);
    }

    Report {
        source_currency: source.to_string(),
        target_currency: target.to_string(),
        best: best.map(|(i, _)| rows[i].clone()),
        rows,
    }
}

fn to_row(
    outcome: &Outcome,
    multiplier: Option<Decimal>,
    source: &str,
    target: &str,
) -> ReportRow {
    let priced = outcome.price.filter(|_| outcome.status.is_available());

    let (price_source, price_target) = match priced {
        Some(amount) => {
            let converted = multiplier.and_then(|m| amount.checked_mul(m));
            (
                format_amount(amount, source),
                converted
                    .map(|c| format_amount(c, target))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            )
        }
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    ReportRow {
        entity_name: outcome.entity_name.clone(),
        price_source,
        price_target,
        status: outcome.status,
        status_label: outcome.status.label().to_string(),
    }
}
