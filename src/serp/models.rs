//! Query types and safe accessors over untrusted provider payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shared search parameters for every hotel in one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContext {
    /// Free-text location appended to each hotel query
    pub location: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Number of adults
    pub party_size: u32,
}

impl SearchContext {
    /// Creates a new search context.
    pub fn new(
        location: impl Into<String>,
        check_in: NaiveDate,
        check_out: NaiveDate,
        party_size: u32,
    ) -> Self {
        Self { location: location.into(), check_in, check_out, party_size }
    }

    /// Builds the query for one hotel.
    pub fn query_for(&self, entity_name: &str) -> Query {
        Query {
            entity_name: entity_name.trim().to_string(),
            location: self.location.clone(),
            check_in: self.check_in,
            check_out: self.check_out,
            party_size: self.party_size,
        }
    }
}

/// A single hotel search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub entity_name: String,
    pub location: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub party_size: u32,
}

impl Query {
    /// Free-text query sent to the provider, e.g. "Hotel A in Paris".
    pub fn search_text(&self) -> String {
        format!("{} in {}", self.entity_name, self.location)
    }
}

/// Follows `path` through nested objects, returning `None` if any segment is
/// missing or the value at that point is not an object.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Returns the string at `path` if present and non-empty.
pub fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    get_path(value, path).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Returns the array at `path`, or an empty slice when absent or not an array.
pub fn get_array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    get_path(value, path).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
