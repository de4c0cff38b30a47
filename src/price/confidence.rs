//! Confidence scoring for extracted price pairs.
//!
//! Starts from the OCR engine's own confidence and adjusts it by how well the
//! pair matches the rate, currency keywords, text length and OCR noise.

use tracing::debug;

use super::keywords::count_keywords;
use super::{ratio_error, PriceCandidate};

pub const MIN_SCORE: f64 = 15.0;
pub const MAX_SCORE: f64 = 95.0;

const OCR_FLOOR: f64 = 50.0;
const OCR_CEILING: f64 = 90.0;

const KEYWORD_BONUS: f64 = 3.0;
const SINGLE_PRICE_BONUS: f64 = 8.0;
const NO_PRICE_PENALTY: f64 = 20.0;
const SHORT_TEXT_PENALTY: f64 = 15.0;
const LONG_TEXT_PENALTY: f64 = 5.0;
const NOISE_PENALTY: f64 = 10.0;

const SHORT_TEXT_LEN: usize = 3;
const LONG_TEXT_LEN: usize = 200;

/// Substrings typical of garbled OCR output.
pub const NOISE_MARKERS: [&str; 7] = ["|||", "...", "???", "***", "###", "□", "■"];

/// Scores how trustworthy an extraction is, in `[15, 95]`.
///
/// `ocr_confidence` is the mean detection confidence as a percentage.
/// NaN counts as the lowest OCR confidence.
pub fn score(candidate: &PriceCandidate, text: &str, ocr_confidence: f64) -> f64 {
    let base = if ocr_confidence.is_nan() {
        OCR_FLOOR
    } else {
        ocr_confidence.clamp(OCR_FLOOR, OCR_CEILING)
    };
    let pair = pair_adjustment(candidate);
    let keywords = count_keywords(text) as f64 * KEYWORD_BONUS;
    let length = length_adjustment(text);
    let noise = if has_noise(text) { -NOISE_PENALTY } else { 0.0 };

    let total = base + pair + keywords + length + noise;
    let clamped = total.clamp(MIN_SCORE, MAX_SCORE);

    debug!(
        "Confidence: base={} pair={:+} keywords={:+} length={:+} noise={:+} -> {}",
        base, pair, keywords, length, noise, clamped
    );
    clamped
}

fn pair_adjustment(candidate: &PriceCandidate) -> f64 {
    match (candidate.bgn, candidate.eur) {
        (Some(bgn), Some(eur)) => {
            let diff = ratio_error(bgn, eur);
            if diff <= 0.01 {
                20.0
            } else if diff <= 0.05 {
                15.0
            } else if diff <= 0.10 {
                10.0
            } else {
                5.0
            }
        }
        (Some(_), None) | (None, Some(_)) => SINGLE_PRICE_BONUS,
        (None, None) => -NO_PRICE_PENALTY,
    }
}

/// Length is counted in UTF-16 code units, as the OCR service reports text.
fn length_adjustment(text: &str) -> f64 {
    let len = text.encode_utf16().count();
    if len < SHORT_TEXT_LEN {
        -SHORT_TEXT_PENALTY
    } else if len > LONG_TEXT_LEN {
        -LONG_TEXT_PENALTY
    } else {
        0.0
    }
}

pub fn has_noise(text: &str) -> bool {
    NOISE_MARKERS.iter().any(|marker| text.contains(marker))
}
