use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

/// Availability of the OCR service as last observed.
///
/// Owned by the caller and passed into each client call, so the client itself stays stateless.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub available: bool,
    pub last_checked: Option<DateTime<Local>>,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self {
            available: true,
            last_checked: None,
        }
    }
}

impl ServiceStatus {
    /// True when no health check happened within `interval` before `now`.
    pub fn needs_check(&self, now: DateTime<Local>, interval: Duration) -> bool {
        match self.last_checked {
            None => true,
            Some(checked) => (now - checked)
                .to_std()
                .map(|elapsed| elapsed > interval)
                .unwrap_or(false),
        }
    }

    pub fn record_check(&mut self, available: bool, at: DateTime<Local>) {
        self.available = available;
        self.last_checked = Some(at);
    }

    pub fn mark_unavailable(&mut self) {
        self.available = false;
    }

    /// Assumes the service is back; the next request re-checks health.
    pub fn reset(&mut self) {
        self.available = true;
        self.last_checked = None;
    }
}
