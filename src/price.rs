//! Tolerant price extraction from loosely-typed provider values.

use regex_lite::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::trace;
use unicode_normalization::UnicodeNormalization;

/// Markers removed before searching for a number. Commas are thousands separators.
const STRIP_MARKERS: [&str; 4] = ["₺", "$", ",", "TL"];

static DECIMAL_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid decimal regex"));

/// Extracts the first unsigned decimal amount from a provider value.
///
/// Strings are used as-is, any other JSON value is rendered to text first.
/// Returns `None` for absent or null input, text without digits, and numbers
/// too large to represent. Never fails.
pub fn extract_price(value: Option<&Value>) -> Option<Decimal> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    extract_price_str(&text)
}

/// Text variant of [`extract_price`].
///
/// Input is NFKC-folded first so fullwidth digits and separators read as
/// ASCII; Arabic-Indic and Persian digits are mapped explicitly. Amounts
/// beyond `Decimal`'s 28 significant digits are absent.
pub fn extract_price_str(text: &str) -> Option<Decimal> {
    let mut cleaned: String = text.nfkc().map(fold_digit).collect();
    for marker in STRIP_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }

    let found = DECIMAL_NUMBER.captures(cleaned.trim())?.get(1)?.as_str();

    match Decimal::from_str(found) {
        Ok(amount) => Some(amount),
        Err(e) => {
            trace!("Discarding unparseable amount {:?}: {}", found, e);
            None
        }
    }
}

/// Maps Arabic-Indic (U+0660..) and extended Arabic-Indic (U+06F0..) digits to ASCII.
fn fold_digit(c: char) -> char {
    let zero = match c {
        '\u{0660}'..='\u{0669}' => 0x0660,
        '\u{06F0}'..='\u{06F9}' => 0x06F0,
        _ => return c,
    };
    char::from_u32(u32::from('0') + (u32::from(c) - zero)).unwrap_or(c)
}
