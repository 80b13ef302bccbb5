//! Fetch-and-reconcile pipeline: concurrent fetch, outcome classification and reporting.

pub mod aggregate;
pub mod models;
pub mod orchestrator;

pub use aggregate::{build_report, ResultAggregator};
pub use models::{Outcome, Report, ReportRow, Status};
pub use orchestrator::{FetchOrchestrator, FetchSettings};
