//! OCR failures and the user-facing fallback text for each.

use thiserror::Error;

use crate::price::{PriceCandidate, ScanResult};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Invalid image data")]
    InvalidImage,
    #[error("Service unavailable")]
    ServiceUnavailable,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timeout")]
    Timeout,
    #[error("Image too large")]
    ImageTooLarge,
    #[error("API endpoint not found")]
    EndpointNotFound,
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Server error (HTTP {0})")]
    Server(u16),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
    #[error("OCR processing error: {0}")]
    Processing(String),
    #[error("No text detected")]
    NoTextDetected,
    #[error("Image conversion error: {0}")]
    ImageConversion(String),
}

impl OcrError {
    /// True when the failure says the service itself is down.
    pub fn marks_unavailable(&self) -> bool {
        matches!(self, OcrError::Network(_) | OcrError::Server(_))
    }

    /// Short headline shown in place of recognized text.
    pub fn headline(&self) -> &'static str {
        match self {
            OcrError::InvalidImage => "Invalid image data.",
            OcrError::ServiceUnavailable => "OCR service is temporarily unavailable.",
            OcrError::Network(_) => "Network connection error.",
            OcrError::Timeout => "Request timed out.",
            OcrError::ImageTooLarge => "Image file is too large.",
            OcrError::EndpointNotFound => "API endpoint not found.",
            OcrError::BadRequest(_) => "Bad request to OCR API.",
            OcrError::Server(_) => "OCR server error.",
            OcrError::ImageConversion(_) => "Failed to process image.",
            OcrError::NoTextDetected => "No text found in image.",
            OcrError::Http { .. } | OcrError::InvalidResponse(_) | OcrError::Processing(_) => {
                "OCR service temporarily unavailable."
            }
        }
    }

    /// What the user can do about it.
    pub fn suggestion(&self) -> &'static str {
        match self {
            OcrError::InvalidImage => {
                "The captured image data is invalid or too small. Please try taking a new photo with better lighting."
            }
            OcrError::ServiceUnavailable => {
                "The OCR service may be down. Please check that it is running and reachable."
            }
            OcrError::Network(_) => {
                "Please check your internet connection and ensure the OCR server is accessible."
            }
            OcrError::Timeout => {
                "The OCR service is slow. Please try again with a smaller or clearer image."
            }
            OcrError::ImageTooLarge => {
                "Please try with a smaller image. The current image may exceed the server limits."
            }
            OcrError::EndpointNotFound => {
                "The OCR API endpoint may be incorrect. Please verify the configured URL."
            }
            OcrError::BadRequest(_) => {
                "The image format or request structure may be incorrect. Please try with a different image."
            }
            OcrError::Server(_) => {
                "The OCR service encountered an error. Please check the server logs or try again later."
            }
            OcrError::ImageConversion(_) => {
                "There was an error converting the image. Please try taking a new photo."
            }
            OcrError::NoTextDetected => {
                "Please ensure the price label is clearly visible and well-lit in the image."
            }
            OcrError::Http { .. } | OcrError::InvalidResponse(_) | OcrError::Processing(_) => {
                "Please try again later or enter prices manually with the convert command."
            }
        }
    }

    /// Result handed to the caller in place of a recognition.
    ///
    /// Confidence is zero and no prices are set, so the caller reports "no prices detected".
    pub fn to_fallback(&self) -> ScanResult {
        let text = format!(
            "{}\n\n{}\n\nFor now, you can enter prices manually with the convert command.\n\
             Look for numbers followed by 'лв', 'BGN', '€', or 'EUR'\n\
             Common formats: '12.50 лв', '€6.99', 'BGN 15.00'",
            self.headline(),
            self.suggestion()
        );
        ScanResult {
            text,
            confidence: 0.0,
            prices: PriceCandidate::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_has_no_prices() {
        let fallback = OcrError::Timeout.to_fallback();
        assert_eq!(fallback.confidence, 0.0);
        assert!(fallback.prices.is_empty());
        assert!(fallback.text.starts_with("Request timed out."));
        assert!(fallback.text.contains("'12.50 лв'"));
    }

    #[test]
    fn test_marks_unavailable() {
        assert!(OcrError::Network("refused".into()).marks_unavailable());
        assert!(OcrError::Server(503).marks_unavailable());
        assert!(!OcrError::Timeout.marks_unavailable());
        assert!(!OcrError::ImageTooLarge.marks_unavailable());
    }

    #[test]
    fn test_bad_request_message() {
        let err = OcrError::BadRequest("image field missing".into());
        assert_eq!(err.to_string(), "Bad request: image field missing");
        assert_eq!(err.headline(), "Bad request to OCR API.");
    }
}
