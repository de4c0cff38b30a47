//! Price-pair inference for BGN/EUR price tags.
//!
//! This module provides:
//! - Currency keyword detection
//! - BGN/EUR pair extraction from noisy OCR text
//! - Confidence scoring of an extracted pair
//! - Verification of a pair against the fixed rate

pub mod confidence;
pub mod extract;
pub mod keywords;
pub mod verify;

pub use confidence::score;
pub use extract::extract;
pub use keywords::CurrencyContext;
pub use verify::{verify, Verdict, VerifyError};

use serde::{Deserialize, Serialize};

/// Official peg: BGN per 1 EUR.
pub const EXCHANGE_RATE: f64 = 1.95583;

/// Numbers at or beyond this bound are not treated as prices.
pub const MAX_PRICE: f64 = 10_000.0;

/// The inferred BGN/EUR pair. Either side may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgn: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eur: Option<f64>,
}

impl PriceCandidate {
    pub fn pair(bgn: f64, eur: f64) -> Self {
        Self {
            bgn: Some(bgn),
            eur: Some(eur),
        }
    }

    /// True when neither price was found.
    pub fn is_empty(&self) -> bool {
        self.bgn.is_none() && self.eur.is_none()
    }

    /// Builds a pair from a BGN amount, deriving EUR through the rate.
    pub fn from_bgn(bgn: f64) -> Self {
        Self::pair(bgn, bgn_to_eur(bgn))
    }

    /// Builds a pair from a EUR amount, deriving BGN through the rate.
    pub fn from_eur(eur: f64) -> Self {
        Self::pair(eur_to_bgn(eur), eur)
    }
}

/// Result of analyzing one block of recognized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub text: String,
    /// Trust score, 0-100
    pub confidence: f64,
    pub prices: PriceCandidate,
}

/// Runs extraction and scoring over recognized text.
pub fn analyze(text: &str, ocr_confidence: f64) -> ScanResult {
    let prices = extract(text);
    let confidence = score(&prices, text, ocr_confidence);
    ScanResult {
        text: text.to_string(),
        confidence,
        prices,
    }
}

/// Rounds to exactly two decimals, the same way fixed-point formatting does.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Converts BGN to EUR, rounded to cents.
pub fn bgn_to_eur(bgn: f64) -> f64 {
    round2(bgn / EXCHANGE_RATE)
}

/// Converts EUR to BGN, rounded to cents.
pub fn eur_to_bgn(eur: f64) -> f64 {
    round2(eur * EXCHANGE_RATE)
}

/// Absolute distance of `bgn / eur` from the official rate.
pub fn ratio_error(bgn: f64, eur: f64) -> f64 {
    (bgn / eur - EXCHANGE_RATE).abs()
}

/// True when the value may be a shelf price.
pub fn is_price_range(value: f64) -> bool {
    value > 0.0 && value < MAX_PRICE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(7.669_381), 7.67);
        assert_eq!(round2(13.690_81), 13.69);
        assert_eq!(round2(12.5), 12.5);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(bgn_to_eur(15.0), 7.67);
        assert_eq!(eur_to_bgn(7.0), 13.69);
        assert_eq!(eur_to_bgn(1.0), 1.96);
    }

    #[test]
    fn test_price_range() {
        assert!(is_price_range(0.01));
        assert!(is_price_range(9999.99));
        assert!(!is_price_range(0.0));
        assert!(!is_price_range(10_000.0));
    }

    #[test]
    fn test_candidate_helpers() {
        assert!(PriceCandidate::default().is_empty());
        let candidate = PriceCandidate::from_bgn(15.0);
        assert_eq!(candidate, PriceCandidate::pair(15.0, 7.67));
        assert!(!candidate.is_empty());
    }

    #[test]
    fn test_analyze_combines_extract_and_score() {
        let result = analyze("12.50 лв / 6.39 €", 85.0);
        assert_eq!(result.prices, PriceCandidate::pair(12.5, 6.39));
        // 85 base + 20 pair + 2 keywords * 3, capped
        assert_eq!(result.confidence, 95.0);
        assert_eq!(result.text, "12.50 лв / 6.39 €");
    }
}
