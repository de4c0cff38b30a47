//! Remote OCR collaborator.
//!
//! Sends price tag photos to a PaddleOCR server and turns the detections into
//! a `ScanResult` through the price engine.

pub mod client;
pub mod engine;
pub mod error;
pub mod status;
pub mod upload;

pub use client::{OcrClient, ServiceValidation};
pub use engine::{combine_detections, OcrDetection, OcrResponse, RecognizedText};
pub use error::OcrError;
pub use status::ServiceStatus;
