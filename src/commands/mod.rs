//! CLI command implementations.

pub mod compare;
pub mod rate;

pub use compare::CompareCommand;
pub use rate::RateCommand;
