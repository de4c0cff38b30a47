//! Scan history persistence and reporting.
//!
//! This module provides:
//! - A JSON file store of checked labels, newest first
//! - Correct/incorrect counts and confidence statistics
//! - CSV export of entries and JSON export of statistics

pub mod export;
pub mod stats;
pub mod store;

pub use export::{export_stats_to_json, export_to_csv};
pub use stats::HistoryStats;
pub use store::{HistoryFilter, HistoryItem, HistoryStore};
