//! Summary statistics over the scan history.
//!
//! Counts correct and incorrect labels and summarizes scan confidence.

use serde::Serialize;

use super::store::HistoryItem;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    /// Number of scans
    pub total: usize,
    /// Scans whose label matched the official conversion
    pub correct: usize,
    /// Scans whose label did not match
    pub incorrect: usize,
    /// Share of correct scans, rounded to a whole percent
    pub accuracy_percent: u32,
    /// Mean confidence over scans that recorded one
    pub mean_confidence: f64,
    /// Median confidence over scans that recorded one
    pub median_confidence: f64,
    /// Total overcharge of incorrect labels, in EUR
    pub total_overcharge_eur: f64,
}

impl HistoryStats {
    pub fn from_items(items: &[HistoryItem]) -> Self {
        let total = items.len();
        let correct = items.iter().filter(|item| item.is_correct).count();
        let incorrect = total - correct;
        let accuracy_percent = if total > 0 {
            (correct as f64 / total as f64 * 100.0).round() as u32
        } else {
            0
        };

        let mut confidences: Vec<f64> = items.iter().filter_map(|item| item.confidence).collect();
        confidences.sort_by(|a, b| a.total_cmp(b));
        let mean_confidence = calculate_mean(&confidences);
        let median_confidence = calculate_median(&confidences);

        let total_overcharge_eur = items
            .iter()
            .filter(|item| !item.is_correct)
            .map(|item| item.eur_price - crate::price::bgn_to_eur(item.bgn_price))
            .filter(|diff| *diff > 0.0)
            .sum::<f64>();

        HistoryStats {
            total,
            correct,
            incorrect,
            accuracy_percent,
            mean_confidence,
            median_confidence,
            total_overcharge_eur: crate::price::round2(total_overcharge_eur),
        }
    }
}

fn calculate_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate median from sorted values.
fn calculate_median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        let mid = n / 2;
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[n / 2]
    }
}
