use serde::{Deserialize, Serialize};

/// One text detection returned by the OCR service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrDetection {
    #[serde(default)]
    pub text: String,
    /// Detection confidence, 0.0 to 1.0
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
}

/// Response body of the PaddleOCR `ocr_system` endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResponse {
    pub status: String,
    #[serde(default)]
    pub results: Option<Vec<OcrDetection>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub processing_time: Option<f64>,
}

/// Detections merged into one text blob for price extraction
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean detection confidence as a percentage
    pub confidence: f64,
    /// Number of non-empty detections
    pub segments: usize,
}

/// Joins non-empty detections with newlines and averages their confidence.
///
/// Detections whose text is blank after trimming do not count toward the average.
pub fn combine_detections(detections: &[OcrDetection]) -> RecognizedText {
    let mut parts: Vec<&str> = Vec::new();
    let mut conf_sum = 0.0;

    for detection in detections {
        let text = detection.text.trim();
        if text.is_empty() {
            continue;
        }
        parts.push(text);
        conf_sum += detection.confidence;
    }

    let segments = parts.len();
    let confidence = if segments > 0 {
        conf_sum / segments as f64 * 100.0
    } else {
        0.0
    };

    RecognizedText {
        text: parts.join("\n"),
        confidence,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_detection(text: &str, confidence: f64) -> OcrDetection {
        OcrDetection {
            text: text.to_string(),
            confidence,
            bbox: None,
        }
    }

    #[test]
    fn test_combine_detections() {
        let detections = vec![
            make_detection(" 12.50 лв ", 0.9),
            make_detection("", 0.1),
            make_detection("6.39 €", 0.7),
        ];
        let combined = combine_detections(&detections);
        assert_eq!(combined.text, "12.50 лв\n6.39 €");
        assert_eq!(combined.segments, 2);
        assert!((combined.confidence - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_combine_blank_only() {
        let combined = combine_detections(&[make_detection("   ", 0.9)]);
        assert!(combined.text.is_empty());
        assert_eq!(combined.segments, 0);
        assert_eq!(combined.confidence, 0.0);
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "status": "success",
            "results": [
                {"text": "2,49 лв", "confidence": 0.93, "bbox": [1, 2, 3, 4]},
                {"text": "1,27 €", "confidence": 0.88}
            ],
            "processing_time": 0.42
        }"#;
        let response: OcrResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, "success");
        let results = response.results.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].bbox.as_deref(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
        assert!(results[1].bbox.is_none());
    }

    #[test]
    fn test_parse_error_response() {
        let body = r#"{"status": "error", "error": "model not loaded"}"#;
        let response: OcrResponse = serde_json::from_str(body).unwrap();
        assert!(response.results.is_none());
        assert_eq!(response.error.as_deref(), Some("model not loaded"));
    }
}
