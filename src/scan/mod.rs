//! One price-tag check, end to end.
//!
//! Paces scan triggers, sends the photo to the OCR service, verifies the
//! extracted pair and records the verdict in the history.

pub mod gate;

pub use gate::{ScanGate, ScanPermit, ScanRejected};

use anyhow::Result;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::history::{HistoryItem, HistoryStore};
use crate::ocr::{OcrClient, ServiceStatus, ServiceValidation};
use crate::price::{verify, ScanResult, Verdict};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Rejected(#[from] ScanRejected),
    /// Carries the recognized text, or the OCR failure explanation.
    #[error("No prices detected in the image")]
    NoPrices { text: String, confidence: f64 },
}

/// Shareable between threads; the gate rejects overlapping scans.
pub struct Scanner {
    client: OcrClient,
    status: Mutex<ServiceStatus>,
    gate: ScanGate,
    history: HistoryStore,
}

impl Scanner {
    pub fn new(config: &AppConfig, history: HistoryStore) -> Result<Self> {
        Ok(Self {
            client: OcrClient::new(config.ocr.clone())?,
            status: Mutex::new(ServiceStatus::default()),
            gate: ScanGate::new(config.min_scan_interval()),
            history,
        })
    }

    pub fn status(&self) -> ServiceStatus {
        self.lock_status().clone()
    }

    pub fn reset_status(&self) {
        self.lock_status().reset();
        info!("Service status reset, will recheck on next request");
    }

    pub fn validate_service(&self) -> ServiceValidation {
        self.client.validate(&mut self.lock_status())
    }

    /// Checks the price tag in an image file and records the verdict.
    pub fn scan_file(&self, path: &Path) -> Result<Verdict, ScanError> {
        let _permit = self.gate.try_acquire()?;
        info!("Scanning {}", path.display());

        let result = self.client.recognize_file(path, &mut self.lock_status());
        self.finish(result)
    }

    /// Checks already-recognized text, bypassing the OCR service.
    pub fn scan_text(&self, text: &str, ocr_confidence: f64) -> Result<Verdict, ScanError> {
        let _permit = self.gate.try_acquire()?;
        self.finish(crate::price::analyze(text, ocr_confidence))
    }

    fn lock_status(&self) -> MutexGuard<'_, ServiceStatus> {
        match self.status.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn finish(&self, result: ScanResult) -> Result<Verdict, ScanError> {
        let verdict = verify(&result).map_err(|_| ScanError::NoPrices {
            text: result.text.clone(),
            confidence: result.confidence,
        })?;

        if let Err(e) = self.history.add(HistoryItem::from_verdict(&verdict)) {
            warn!("Failed to save to history: {:#}", e);
        }
        Ok(verdict)
    }
}
