//! Blocking client for a PaddleOCR `ocr_system` server.
//!
//! Every recognition call returns a `ScanResult`. Failures are logged and turned
//! into fallback results, and the caller-owned `ServiceStatus` is updated when
//! the service looks down.

use anyhow::{Context, Result};
use chrono::Local;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use super::engine::{combine_detections, OcrResponse, RecognizedText};
use super::error::OcrError;
use super::status::ServiceStatus;
use super::upload::{encode_image_file, to_data_url, MIN_BASE64_LEN};
use crate::config::OcrConfig;
use crate::price::{analyze, ScanResult};

const USER_AGENT: &str = concat!("bgn-eur-checker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct OcrRequest<'a> {
    image: String,
    language: &'a str,
    confidence_threshold: f64,
}

/// Outcome of an explicit service validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceValidation {
    pub valid: bool,
    pub error: Option<String>,
    pub suggestion: Option<String>,
}

pub struct OcrClient {
    http: Client,
    config: OcrConfig,
}

impl OcrClient {
    pub fn new(config: OcrConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        info!("OCR client initialized, endpoint: {}", config.api_url);
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Recognizes a price tag photo stored on disk.
    pub fn recognize_file(&self, path: &Path, status: &mut ServiceStatus) -> ScanResult {
        match encode_image_file(path) {
            Ok(encoded) => self.recognize_base64(&encoded, status),
            Err(e) => {
                warn!("Image conversion failed for {}: {}", path.display(), e);
                e.to_fallback()
            }
        }
    }

    /// Recognizes a base64-encoded photo (raw or as a data URL).
    pub fn recognize_base64(&self, base64_image: &str, status: &mut ServiceStatus) -> ScanResult {
        match self.try_recognize(base64_image, status) {
            Ok(result) => result,
            Err(e) => {
                warn!("OCR failed: {}", e);
                if e.marks_unavailable() {
                    status.mark_unavailable();
                }
                e.to_fallback()
            }
        }
    }

    fn try_recognize(
        &self,
        base64_image: &str,
        status: &mut ServiceStatus,
    ) -> Result<ScanResult, OcrError> {
        if base64_image.len() < MIN_BASE64_LEN {
            return Err(OcrError::InvalidImage);
        }

        if status.needs_check(Local::now(), self.config.health_check_interval()) {
            self.check_health(status);
        }
        if !status.available {
            return Err(OcrError::ServiceUnavailable);
        }

        let request = OcrRequest {
            image: to_data_url(base64_image),
            language: &self.config.language,
            confidence_threshold: self.config.confidence_threshold,
        };
        debug!(
            "POST {} ({} bytes of image data)",
            self.config.api_url,
            request.image.len()
        );

        let response = self
            .http
            .post(&self.config.api_url)
            .header(ACCEPT, "application/json")
            .timeout(self.config.request_timeout())
            .json(&request)
            .send()
            .map_err(classify_transport_error)?;

        let code = response.status();
        let body = response.text().map_err(classify_transport_error)?;
        debug!("OCR response status {}, {} bytes", code, body.len());

        if !code.is_success() {
            return Err(error_for_status(code.as_u16(), &body));
        }

        let recognized = parse_response(&body)?;
        info!(
            "Recognized {} text segments, mean confidence {:.1}%",
            recognized.segments, recognized.confidence
        );
        Ok(analyze(&recognized.text, recognized.confidence))
    }

    /// Probes the health URL and records the outcome.
    pub fn check_health(&self, status: &mut ServiceStatus) {
        debug!("Checking OCR service health at {}", self.config.health_url);
        let available = match self
            .http
            .get(&self.config.health_url)
            .timeout(self.config.health_timeout())
            .send()
        {
            Ok(response) => {
                let ok = response.status().is_success();
                if ok {
                    info!("OCR service is healthy");
                } else {
                    warn!("OCR service health check failed: {}", response.status());
                }
                ok
            }
            Err(e) => {
                warn!("OCR service health check error: {}", e);
                false
            }
        };
        status.record_check(available, Local::now());
    }

    /// Checks the service on demand and explains any failure.
    pub fn validate(&self, status: &mut ServiceStatus) -> ServiceValidation {
        info!("Validating OCR service at {}", self.config.health_url);
        let result = self
            .http
            .get(&self.config.health_url)
            .timeout(self.config.validation_timeout())
            .send();

        match result {
            Ok(response) if response.status().is_success() => {
                status.record_check(true, Local::now());
                ServiceValidation {
                    valid: true,
                    error: None,
                    suggestion: None,
                }
            }
            Ok(response) => {
                let code = response.status().as_u16();
                let body = response.text().unwrap_or_default();
                let suggestion = if code == 404 {
                    "The health endpoint may not be available. Check the configured health URL."
                } else if code >= 500 {
                    "The OCR service is experiencing server errors. Check the server logs."
                } else {
                    "Check if the OCR service is running."
                };
                ServiceValidation {
                    valid: false,
                    error: Some(format!("HTTP {}: {}", code, body)),
                    suggestion: Some(suggestion.to_string()),
                }
            }
            Err(e) => {
                let suggestion = if e.is_timeout() {
                    "The service request timed out. The server may be slow or unresponsive."
                } else {
                    "Check your network connection and the configured OCR URLs."
                };
                ServiceValidation {
                    valid: false,
                    error: Some(e.to_string()),
                    suggestion: Some(suggestion.to_string()),
                }
            }
        }
    }
}

fn classify_transport_error(e: reqwest::Error) -> OcrError {
    if e.is_timeout() {
        OcrError::Timeout
    } else if e.is_builder() {
        OcrError::BadRequest(e.to_string())
    } else {
        OcrError::Network(e.to_string())
    }
}

/// Maps a non-success HTTP status to the matching failure.
pub fn error_for_status(status: u16, body: &str) -> OcrError {
    match status {
        s if s >= 500 => OcrError::Server(s),
        413 => OcrError::ImageTooLarge,
        404 => OcrError::EndpointNotFound,
        400 => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| {
                    v.get("msg")
                        .or_else(|| v.get("message"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "Bad request format".to_string());
            OcrError::BadRequest(message)
        }
        s => OcrError::Http {
            status: s,
            body: body.to_string(),
        },
    }
}

/// Parses a successful response body into merged text.
pub fn parse_response(body: &str) -> Result<RecognizedText, OcrError> {
    let response: OcrResponse =
        serde_json::from_str(body).map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

    debug!(
        "OCR status={} results={} processing_time={:?}",
        response.status,
        response.results.as_ref().map_or(0, |r| r.len()),
        response.processing_time
    );

    let detections = match response.results {
        Some(results) if response.status == "success" => results,
        _ => {
            return Err(OcrError::Processing(
                response
                    .error
                    .unwrap_or_else(|| "Unknown OCR error".to_string()),
            ));
        }
    };

    let recognized = combine_detections(&detections);
    if recognized.text.trim().is_empty() {
        return Err(OcrError::NoTextDetected);
    }
    Ok(recognized)
}
