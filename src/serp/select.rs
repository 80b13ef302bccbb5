//! Best-candidate selection and prioritized price extraction.

use super::models::{get_array, get_path, get_str};
use crate::matching::name_match_score;
use crate::price::extract_price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

/// The candidate chosen for a target name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedCandidate {
    /// Display name: the provider's name, or the target name when missing
    pub name: String,
    pub match_score: usize,
}

/// Result of picking a candidate and extracting its price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The provider returned no candidates.
    NotFound,
    /// A candidate was chosen but none of its price fields held a non-zero amount.
    NoPrice(MatchedCandidate),
    /// A candidate was chosen and priced.
    Priced { candidate: MatchedCandidate, amount: Decimal },
}

/// Picks the best-matching candidate from `properties` and extracts its price.
///
/// Ties on match score keep provider order. Price fields are tried in a fixed
/// priority and the first non-zero amount wins. Zero never counts as a price.
pub fn select(properties: &[Value], target_name: &str) -> Selection {
    let Some((best, match_score)) = best_candidate(properties, target_name) else {
        return Selection::NotFound;
    };

    let name = get_str(best, &["name"]).unwrap_or(target_name).to_string();
    debug!("Matched '{}' to '{}' (score {})", target_name, name, match_score);

    let candidate = MatchedCandidate { name, match_score };

    let amount = price_fields(best).into_iter().find_map(|value| {
        let amount = extract_price(value)?;
        trace!("Price field {:?} -> {}", value, amount);
        (!amount.is_zero()).then_some(amount)
    });

    match amount {
        Some(amount) => Selection::Priced { candidate, amount },
        None => Selection::NoPrice(candidate),
    }
}

/// Returns the highest-scoring candidate, keeping the earliest on ties.
fn best_candidate<'a>(properties: &'a [Value], target_name: &str) -> Option<(&'a Value, usize)> {
    let mut scored: Vec<(&Value, usize)> = properties
        .iter()
        .map(|p| (p, name_match_score(get_str(p, &["name"]).unwrap_or(""), target_name)))
        .collect();

    // Stable sort keeps provider order among equal scores
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().next()
}

/// Price fields in descending authority: top-line totals, then flat fields, then offers.
fn price_fields(record: &Value) -> Vec<Option<&Value>> {
    let mut fields = vec![
        get_path(record, &["total_rate", "lowest"]),
        get_path(record, &["rate_per_night", "lowest"]),
        get_path(record, &["price"]),
        get_path(record, &["hotel_price"]),
    ];

    for offer in get_array(record, &["offers"]) {
        fields.push(get_path(offer, &["price"]));
        fields.push(get_path(offer, &["rate"]));
    }

    fields
}
