//! Currency display helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Returns the display symbol for a currency code, if one is known.
pub fn symbol(code: &str) -> Option<&'static str> {
    match code.to_uppercase().as_str() {
        "TRY" => Some("₺"),
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// Formats an amount with two decimals, e.g. `₺2000.00` or `CHF 12.50`.
pub fn format_amount(amount: Decimal, code: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    match symbol(code) {
        Some(sym) => format!("{}{:.2}", sym, rounded),
        None => format!("{} {:.2}", code.to_uppercase(), rounded),
    }
}
