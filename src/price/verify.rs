//! Checks a scanned price pair against the official conversion.
//!
//! A label is correct when its EUR amount equals the BGN amount converted at
//! the fixed rate and rounded to the cent.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::{bgn_to_eur, eur_to_bgn, ScanResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("No prices detected in the image")]
    NoPrices,
}

/// Outcome of checking one price tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub bgn_price: f64,
    pub eur_price: f64,
    /// EUR amount the BGN price should convert to
    pub expected_eur: f64,
    pub is_correct: bool,
    pub confidence: f64,
    pub raw_text: String,
    pub timestamp: DateTime<Local>,
}

impl Verdict {
    /// Label EUR minus the correct EUR, in cents. Positive means overcharged.
    pub fn difference_cents(&self) -> i64 {
        to_cents(self.eur_price) - to_cents(self.expected_eur)
    }
}

/// Completes a half pair through the rate and decides correctness.
pub fn verify(result: &ScanResult) -> Result<Verdict, VerifyError> {
    let (bgn_price, eur_price) = match (result.prices.bgn, result.prices.eur) {
        (Some(bgn), Some(eur)) => (bgn, eur),
        (Some(bgn), None) => (bgn, bgn_to_eur(bgn)),
        (None, Some(eur)) => (eur_to_bgn(eur), eur),
        (None, None) => return Err(VerifyError::NoPrices),
    };

    let expected_eur = bgn_to_eur(bgn_price);
    let is_correct = to_cents(eur_price) == to_cents(expected_eur);

    info!(
        "Verified {:.2} лв -> {:.2} € (label {:.2} €): {}",
        bgn_price,
        expected_eur,
        eur_price,
        if is_correct { "correct" } else { "incorrect" }
    );

    Ok(Verdict {
        bgn_price,
        eur_price,
        expected_eur,
        is_correct,
        confidence: result.confidence,
        raw_text: result.text.clone(),
        timestamp: Local::now(),
    })
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
