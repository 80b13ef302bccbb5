//! Hotel search provider: query model, HTTP client and candidate selection.

pub mod client;
pub mod models;
pub mod select;

pub use client::{HotelSearch, SerpClient};
pub use models::{Query, SearchContext};
pub use select::{select, MatchedCandidate, Selection};
