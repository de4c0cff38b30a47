//! Application configuration.
//!
//! Loads settings from config.json at startup. Provides the OCR service
//! endpoints, network timeouts, scan pacing and history size.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// OCR service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// PaddleOCR `ocr_system` prediction endpoint
    pub api_url: String,
    /// URL probed by health checks
    pub health_url: String,
    /// Timeout for a recognition request (milliseconds)
    pub request_timeout_ms: u64,
    /// Timeout for the periodic health check (milliseconds)
    pub health_timeout_ms: u64,
    /// Timeout for an explicit service validation (milliseconds)
    pub validation_timeout_ms: u64,
    /// Minimum time between health checks (milliseconds)
    pub health_check_interval_ms: u64,
    /// Language hint sent with each request
    pub language: String,
    /// Detection confidence threshold sent with each request (0.0-1.0)
    pub confidence_threshold: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8868/predict/ocr_system".to_string(),
            health_url: "http://localhost:8868/".to_string(),
            request_timeout_ms: 45_000,
            health_timeout_ms: 10_000,
            validation_timeout_ms: 15_000,
            health_check_interval_ms: 2 * 60 * 1000,
            // English recognizes digits better than the Cyrillic models
            language: "en".to_string(),
            confidence_threshold: 0.3,
        }
    }
}

impl OcrConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ocr: OcrConfig,
    /// Minimum time between two scan triggers (milliseconds)
    #[serde(default = "default_min_scan_interval_ms")]
    pub min_scan_interval_ms: u64,
    /// Number of history entries kept, newest first
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_min_scan_interval_ms() -> u64 {
    2000
}

fn default_history_limit() -> usize {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            min_scan_interval_ms: default_min_scan_interval_ms(),
            history_limit: default_history_limit(),
        }
    }
}

impl AppConfig {
    pub fn min_scan_interval(&self) -> Duration {
        Duration::from_millis(self.min_scan_interval_ms)
    }

    /// Loads configuration from the given file or returns defaults.
    pub fn load(config_path: &Path) -> AppConfig {
        info!("Looking for config at: {}", config_path.display());

        if !config_path.exists() {
            info!("config.json not found. Using default config.");
            return AppConfig::default();
        }

        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!("Config loaded from {}", config_path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config.json: {}. Using defaults.", e);
                    AppConfig::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config.json: {}. Using defaults.", e);
                AppConfig::default()
            }
        }
    }
}
