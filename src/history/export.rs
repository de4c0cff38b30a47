//! CSV and JSON export of the scan history.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use super::stats::HistoryStats;
use super::store::HistoryItem;
use crate::price::EXCHANGE_RATE;

/// CSV header row.
const CSV_HEADER: &str = "id,timestamp,bgn_price,eur_price,expected_eur,is_correct,confidence";

/// Writes history entries to a CSV file, replacing any existing file.
pub fn export_to_csv(items: &[HistoryItem], output_path: &Path) -> Result<()> {
    let mut file = File::create(output_path)
        .context(format!("Failed to create CSV file: {}", output_path.display()))?;

    writeln!(file, "{}", CSV_HEADER).context("Failed to write CSV header")?;
    for item in items {
        let line = format!(
            "{},{},{:.2},{:.2},{:.2},{},{}",
            item.id,
            item.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            item.bgn_price,
            item.eur_price,
            crate::price::bgn_to_eur(item.bgn_price),
            item.is_correct,
            item.confidence.map(|c| format!("{:.0}", c)).unwrap_or_default(),
        );
        writeln!(file, "{}", line).context("Failed to write CSV row")?;
    }
    Ok(())
}

/// Statistics file contents: the figures plus the rate they were checked against.
#[derive(Serialize)]
struct StatsReport<'a> {
    generated_at: DateTime<Local>,
    exchange_rate: f64,
    #[serde(flatten)]
    stats: &'a HistoryStats,
}

/// Writes a statistics report, replacing any existing file.
pub fn export_stats_to_json(stats: &HistoryStats, output_path: &Path) -> Result<()> {
    let report = StatsReport {
        generated_at: Local::now(),
        exchange_rate: EXCHANGE_RATE,
        stats,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize statistics")?;
    fs::write(output_path, json)
        .context(format!("Failed to write statistics: {}", output_path.display()))
}
