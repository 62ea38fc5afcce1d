//! Metrics collection for swap session monitoring.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Session metrics.
pub struct SessionMetrics {
    /// Total fetches issued (user and background).
    pub fetches_attempted: AtomicU64,
    /// Fetches that installed new prices.
    pub fetches_succeeded: AtomicU64,
    /// Fetches that failed or timed out.
    pub fetches_failed: AtomicU64,
    /// Fetches discarded because a newer one was issued.
    pub fetches_superseded: AtomicU64,
    /// Swaps confirmed by the user.
    pub swaps_confirmed: AtomicU64,
    /// Swaps that reached settlement.
    pub swaps_settled: AtomicU64,
    /// Confirm dialogs cancelled.
    pub swaps_cancelled: AtomicU64,
    /// Actions blocked by the amount validator.
    pub validation_failures: AtomicU64,
}

impl SessionMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self {
            fetches_attempted: AtomicU64::new(0),
            fetches_succeeded: AtomicU64::new(0),
            fetches_failed: AtomicU64::new(0),
            fetches_superseded: AtomicU64::new(0),
            swaps_confirmed: AtomicU64::new(0),
            swaps_settled: AtomicU64::new(0),
            swaps_cancelled: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
        }
    }

    pub fn fetch_attempted(&self) {
        self.fetches_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_succeeded(&self) {
        self.fetches_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_superseded(&self) {
        self.fetches_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn swap_confirmed(&self) {
        self.swaps_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn swap_settled(&self) {
        self.swaps_settled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn swap_cancelled(&self) {
        self.swaps_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_failed(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches_attempted: self.fetches_attempted.load(Ordering::Relaxed),
            fetches_succeeded: self.fetches_succeeded.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            fetches_superseded: self.fetches_superseded.load(Ordering::Relaxed),
            swaps_confirmed: self.swaps_confirmed.load(Ordering::Relaxed),
            swaps_settled: self.swaps_settled.load(Ordering::Relaxed),
            swaps_cancelled: self.swaps_cancelled.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub fetches_attempted: u64,
    pub fetches_succeeded: u64,
    pub fetches_failed: u64,
    pub fetches_superseded: u64,
    pub swaps_confirmed: u64,
    pub swaps_settled: u64,
    pub swaps_cancelled: u64,
    pub validation_failures: u64,
}

/// Shared metrics instance.
pub type SharedMetrics = Arc<SessionMetrics>;
