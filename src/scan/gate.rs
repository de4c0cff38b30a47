//! Scan pacing.
//!
//! At most one scan runs at a time, and a new scan may start only after the
//! minimum interval since the previous one started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanRejected {
    #[error("A scan is already in progress")]
    InProgress,
    #[error("Too soon after the previous scan, wait {0:?}")]
    TooSoon(Duration),
}

#[derive(Debug)]
pub struct ScanGate {
    min_interval: Duration,
    in_flight: AtomicBool,
    last_started: Mutex<Option<Instant>>,
}

/// Held for the duration of one scan. Dropping it lets the next scan in.
#[derive(Debug)]
pub struct ScanPermit<'a> {
    gate: &'a ScanGate,
}

impl Drop for ScanPermit<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.store(false, Ordering::SeqCst);
    }
}

impl ScanGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            in_flight: AtomicBool::new(false),
            last_started: Mutex::new(None),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn try_acquire(&self) -> Result<ScanPermit<'_>, ScanRejected> {
        self.try_acquire_at(Instant::now())
    }

    /// Acquires a permit as of `now`.
    pub fn try_acquire_at(&self, now: Instant) -> Result<ScanPermit<'_>, ScanRejected> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ScanRejected::InProgress);
        }

        let mut last = match self.last_started.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = *last {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < self.min_interval {
                self.in_flight.store(false, Ordering::SeqCst);
                return Err(ScanRejected::TooSoon(self.min_interval - elapsed));
            }
        }
        *last = Some(now);

        Ok(ScanPermit { gate: self })
    }
}
