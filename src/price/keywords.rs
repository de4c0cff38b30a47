//! Currency keyword sets and case-insensitive matching.

use regex::Regex;

/// Keywords that mark a BGN amount.
pub const BGN_KEYWORDS: [&str; 3] = ["лв", "bgn", "лева"];

/// Keywords that mark a EUR amount.
pub const EUR_KEYWORDS: [&str; 4] = ["€", "eur", "евро", "euro"];

/// Which currencies are mentioned anywhere in a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrencyContext {
    pub bgn: bool,
    pub eur: bool,
}

impl CurrencyContext {
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            bgn: contains_any(&lower, &BGN_KEYWORDS),
            eur: contains_any(&lower, &EUR_KEYWORDS),
        }
    }

    /// True when exactly one currency is mentioned.
    pub fn is_unambiguous(&self) -> bool {
        self.bgn != self.eur
    }
}

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}

/// Every keyword in the text, each counted once.
pub fn count_keywords(text: &str) -> usize {
    let lower = text.to_lowercase();
    BGN_KEYWORDS
        .iter()
        .chain(EUR_KEYWORDS.iter())
        .filter(|k| lower.contains(*k))
        .count()
}

/// Builds a case-insensitive alternation from a keyword set, e.g. `(?:лв|bgn|лева)`.
pub fn alternation(keywords: &[&str]) -> String {
    let escaped: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    format!("(?:{})", escaped.join("|"))
}

/// Pattern anchoring a price to a keyword that follows it.
pub fn number_then_keyword(number: &str, keywords: &[&str]) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)({})\s*{}", number, alternation(keywords)))
}

/// Pattern anchoring a price to a keyword that precedes it.
pub fn keyword_then_number(number: &str, keywords: &[&str]) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i){}\s*({})", alternation(keywords), number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bgn_only() {
        let ctx = CurrencyContext::detect("Цена 15,00 ЛВ");
        assert!(ctx.bgn);
        assert!(!ctx.eur);
        assert!(ctx.is_unambiguous());
    }

    #[test]
    fn test_detect_eur_only() {
        assert_eq!(
            CurrencyContext::detect("6.39 EUR"),
            CurrencyContext { bgn: false, eur: true }
        );
        assert_eq!(
            CurrencyContext::detect("€6.99"),
            CurrencyContext { bgn: false, eur: true }
        );
    }

    #[test]
    fn test_detect_both_and_neither() {
        assert!(!CurrencyContext::detect("12.50 лв 6.39 €").is_unambiguous());
        assert!(!CurrencyContext::detect("12.50").is_unambiguous());
    }

    #[test]
    fn test_count_keywords() {
        assert_eq!(count_keywords("nothing here"), 0);
        assert_eq!(count_keywords("12.50 лв / 6.39 €"), 2);
        // "euro" also contains "eur"
        assert_eq!(count_keywords("Euro"), 2);
        // repeated keyword counted once
        assert_eq!(count_keywords("лв лв лв"), 1);
        assert_eq!(count_keywords("BGN лева EUR евро"), 4);
    }

    #[test]
    fn test_alternation_is_built_from_set() {
        assert_eq!(alternation(&BGN_KEYWORDS), "(?:лв|bgn|лева)");
    }

    #[test]
    fn test_anchor_patterns() {
        let number = r"[0-9]+[.,][0-9]{1,2}";
        let after = number_then_keyword(number, &BGN_KEYWORDS).unwrap();
        let caps = after.captures("total 3.20 BGN").unwrap();
        assert_eq!(&caps[1], "3.20");

        let before = keyword_then_number(number, &EUR_KEYWORDS).unwrap();
        let caps = before.captures("EUR 1,64").unwrap();
        assert_eq!(&caps[1], "1,64");
    }
}
