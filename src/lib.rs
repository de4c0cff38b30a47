//! BGN/EUR price tag checker.
//!
//! Reads OCR text from a photographed price tag, works out which number is
//! the BGN price and which is the EUR price, scores how much to trust that,
//! and checks the pair against the fixed conversion rate.

pub mod config;
pub mod history;
pub mod ocr;
pub mod paths;
pub mod price;
pub mod scan;

pub use config::AppConfig;
pub use price::{analyze, extract, score, PriceCandidate, ScanResult, Verdict, EXCHANGE_RATE};
pub use scan::{ScanError, Scanner};
