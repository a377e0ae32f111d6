//! Store stock health and replenishment planner.
//!
//! Reads a sales report and a stock report, normalizes their columns, and
//! derives the daily action plan: best sellers, blocked stock to replenish,
//! merch group capacity and fragmentation, and discount exposure.
pub mod auth;
pub mod clean;
pub mod config;
pub mod error;
pub mod kpi;
pub mod loader;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod schema;
pub mod types;
pub mod util;

pub use error::{ReportError, ReportResult};
