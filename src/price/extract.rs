use regex::Regex;
use tracing::{debug, warn};

use super::keywords::{
    keyword_then_number, number_then_keyword, CurrencyContext, BGN_KEYWORDS, EUR_KEYWORDS,
};
use super::{is_price_range, ratio_error, PriceCandidate, EXCHANGE_RATE};

/// Pattern to match price-like numbers: digits, one `.` or `,`, then one or two digits.
/// ASCII digits only; OCR output may contain other Unicode digit forms that are never prices.
const PRICE_PATTERN: &str = r"[0-9]+[.,][0-9]{1,2}";

/// Maximum distance of a pair's ratio from the official rate (absorbs OCR digit noise).
const RATIO_TOLERANCE: f64 = 0.05;

/// Single numbers above this are assumed to be BGN when the text names no currency.
const AMBIGUOUS_BGN_THRESHOLD: f64 = 5.0;

/// Extracts the BGN/EUR pair from recognized text.
///
/// Never fails: unrecognizable input yields an empty candidate.
pub fn extract(text: &str) -> PriceCandidate {
    match try_extract(text) {
        Ok(candidate) => candidate,
        Err(e) => {
            warn!("Price pattern failed to compile: {}", e);
            PriceCandidate::default()
        }
    }
}

/// Multi-pass inference:
/// - Pass 1: pairwise search for two numbers whose ratio matches the rate
/// - Pass 2: a lone number is classified by currency context or magnitude
/// - Pass 3: numbers anchored next to a currency keyword
fn try_extract(text: &str) -> Result<PriceCandidate, regex::Error> {
    let tokens = tokenize(text)?;
    debug!("Price tokens: {:?}", tokens);

    match tokens.as_slice() {
        [] => {
            debug!("No price tokens found");
            return Ok(PriceCandidate::default());
        }
        [single] => return Ok(infer_single(*single, CurrencyContext::detect(text))),
        _ => {}
    }

    if let Some(candidate) = find_ratio_pair(&tokens) {
        return Ok(candidate);
    }

    debug!("No pair matches the rate, falling back to currency anchors");
    let candidate = PriceCandidate {
        bgn: anchored_price(text, &BGN_KEYWORDS)?,
        eur: anchored_price(text, &EUR_KEYWORDS)?,
    };
    debug!("Anchored prices: {:?}", candidate);
    Ok(candidate)
}

/// Collects distinct price-range numbers, largest first.
///
/// The sort is stable, and BGN amounts exceed their EUR counterparts,
/// so larger numbers are tried as BGN first.
pub fn tokenize(text: &str) -> Result<Vec<f64>, regex::Error> {
    let price_regex = Regex::new(PRICE_PATTERN)?;

    let mut tokens: Vec<f64> = Vec::new();
    for m in price_regex.find_iter(text) {
        let Some(value) = parse_price(m.as_str()) else {
            continue;
        };
        if !tokens.contains(&value) {
            tokens.push(value);
        }
    }

    tokens.sort_by(|a, b| b.total_cmp(a));
    Ok(tokens)
}

/// Parses one matched number, accepting `,` as decimal separator.
/// Returns None outside the price range.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| is_price_range(*v))
}

/// Returns the first pair (in sorted order) whose ratio is within tolerance of the rate.
///
/// First match, not best match: an earlier pair wins even if a later one is closer.
pub fn find_ratio_pair(tokens: &[f64]) -> Option<PriceCandidate> {
    for (i, &a) in tokens.iter().enumerate() {
        for &b in &tokens[i + 1..] {
            debug!(
                "Testing pair: {} / {} = {:.4} (expected {:.4})",
                a,
                b,
                a / b,
                EXCHANGE_RATE
            );
            if ratio_error(a, b) <= RATIO_TOLERANCE {
                debug!("Pair found: {} лв = {} €", a, b);
                return Some(PriceCandidate::pair(a, b));
            }
            if ratio_error(b, a) <= RATIO_TOLERANCE {
                debug!("Pair found (reversed): {} лв = {} €", b, a);
                return Some(PriceCandidate::pair(b, a));
            }
        }
    }
    None
}

/// Classifies a lone number and derives the other side through the rate.
pub fn infer_single(value: f64, context: CurrencyContext) -> PriceCandidate {
    let is_bgn = match (context.bgn, context.eur) {
        (true, false) => true,
        (false, true) => false,
        _ => value > AMBIGUOUS_BGN_THRESHOLD,
    };

    let candidate = if is_bgn {
        PriceCandidate::from_bgn(value)
    } else {
        PriceCandidate::from_eur(value)
    };
    debug!(
        "Single number {} with context {:?} -> {:?}",
        value, context, candidate
    );
    candidate
}

/// Finds the first number written right before a keyword, or failing that, right after one.
fn anchored_price(text: &str, keywords: &[&str]) -> Result<Option<f64>, regex::Error> {
    let patterns = [
        number_then_keyword(PRICE_PATTERN, keywords)?,
        keyword_then_number(PRICE_PATTERN, keywords)?,
    ];

    for pattern in &patterns {
        let found = pattern
            .captures_iter(text)
            .find_map(|caps| caps.get(1).and_then(|m| parse_price(m.as_str())));
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::round2;

    #[test]
    fn test_tokenize_sorted_distinct() {
        let tokens = tokenize("6.39\n12,50\n6.39\n3.2").unwrap();
        assert_eq!(tokens, vec![12.5, 6.39, 3.2]);
    }

    #[test]
    fn test_tokenize_filters_range() {
        let tokens = tokenize("0.00 12345.67 9999.99").unwrap();
        assert_eq!(tokens, vec![9999.99]);
    }

    #[test]
    fn test_tokenize_ignores_integers() {
        assert!(tokenize("page 12 code 4711").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_takes_two_fraction_digits() {
        // "12.505" matches as "12.50", the trailing digit stays unmatched
        assert_eq!(tokenize("12.505").unwrap(), vec![12.5]);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("15,00"), Some(15.0));
        assert_eq!(parse_price("6.39"), Some(6.39));
        assert_eq!(parse_price("0,00"), None);
        assert_eq!(parse_price("10000.00"), None);
    }

    #[test]
    fn test_pair_with_symbols() {
        let candidate = extract("12.50 лв / 6.39 €");
        assert_eq!(candidate, PriceCandidate::pair(12.5, 6.39));
    }

    #[test]
    fn test_pair_independent_of_order() {
        let forward = extract("12.50\n6.39");
        let reverse = extract("6.39\n12.50");
        assert_eq!(forward, PriceCandidate::pair(12.5, 6.39));
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_pair_ignores_wrong_labels() {
        // Ratio decides even when the symbols are swapped by OCR
        let candidate = extract("12.50 € 6.39 лв");
        assert_eq!(candidate, PriceCandidate::pair(12.5, 6.39));
    }

    #[test]
    fn test_pair_among_noise() {
        let candidate = extract("Хляб 500 g\n99.99\n2,49 лв\n1,27 €\nарт. 0.45");
        assert_eq!(candidate, PriceCandidate::pair(2.49, 1.27));
    }

    #[test]
    fn test_first_match_not_best_match() {
        // 20.00/10.00 = 2.0 (within 0.05) is tried before 19.56/10.00 (exact)
        let candidate = extract("20.00 19.56 10.00");
        assert_eq!(candidate, PriceCandidate::pair(20.0, 10.0));
    }

    #[test]
    fn test_single_bgn_context() {
        assert_eq!(extract("15,00 лв"), PriceCandidate::pair(15.0, 7.67));
    }

    #[test]
    fn test_single_eur_context() {
        assert_eq!(extract("7.00 €"), PriceCandidate::pair(13.69, 7.0));
        assert_eq!(extract("EUR 3,50"), PriceCandidate::pair(6.85, 3.5));
    }

    #[test]
    fn test_single_ambiguous_magnitude() {
        assert_eq!(extract("7.00"), PriceCandidate::pair(7.0, 3.58));
        assert_eq!(extract("5.00"), PriceCandidate::pair(9.78, 5.0));
        assert_eq!(extract("4.99 лв €"), PriceCandidate::pair(9.76, 4.99));
    }

    #[test]
    fn test_duplicate_number_is_single_token() {
        assert_eq!(extract("15.00 лв\n15.00 лв"), PriceCandidate::pair(15.0, 7.67));
    }

    #[test]
    fn test_no_numbers() {
        assert!(extract("").is_empty());
        assert!(extract("Цена лв €").is_empty());
    }

    #[test]
    fn test_context_fallback_both() {
        // 10.00/3.00 and 3.00/10.00 are far from the rate
        let candidate = extract("10.00 лв\n3.00 €");
        assert_eq!(candidate, PriceCandidate::pair(10.0, 3.0));
    }

    #[test]
    fn test_context_fallback_keyword_first() {
        let candidate = extract("BGN 10.00 / EUR 3.00");
        assert_eq!(candidate, PriceCandidate::pair(10.0, 3.0));
    }

    #[test]
    fn test_context_fallback_prefers_number_then_keyword() {
        // "лв 9.00" is a keyword-first anchor, "4.00 лв" is number-first
        let candidate = extract("лв 9.00 and 4.00 лв");
        assert_eq!(candidate.bgn, Some(4.0));
        assert_eq!(candidate.eur, None);
    }

    #[test]
    fn test_context_fallback_skips_out_of_range_anchor() {
        // "12345.67 лв" is out of range; the next number-first anchor wins over "лв\n3.00"
        let candidate = extract("12345.67 лв\n3.00\n2.00 лв");
        assert_eq!(candidate.bgn, Some(2.0));
        assert_eq!(candidate.eur, None);
    }

    #[test]
    fn test_context_fallback_partial() {
        let candidate = extract("10.00 лв\n3.00");
        assert_eq!(candidate.bgn, Some(10.0));
        assert_eq!(candidate.eur, None);
    }

    #[test]
    fn test_context_fallback_none() {
        assert!(extract("10.00\n3.00").is_empty());
    }

    #[test]
    fn test_round_trip_bgn() {
        for t in [0.01, 1.99, 12.5, 99.95, 1234.56, 9999.99] {
            let candidate = extract(&format!("{:.2} лв", t));
            assert_eq!(candidate.bgn, Some(t));
            assert_eq!(candidate.eur, Some(round2(t / EXCHANGE_RATE)));
        }
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "2,49 лв\n1,27 €\n0.45";
        assert_eq!(extract(text), extract(text));
    }
}
