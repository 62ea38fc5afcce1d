//! Holder of the latest price snapshot.

use parking_lot::RwLock;
use std::sync::Arc;
use swapdesk_common::PriceQuote;
use tracing::debug;

use crate::snapshot::PriceSnapshot;

/// Read-only view over the most recent successful price snapshot.
///
/// Readers get a cheap `Arc` handle; replacement swaps the handle under a
/// write lock, so nobody ever observes a half-updated snapshot.
pub struct PriceRepository {
    current: RwLock<Arc<PriceSnapshot>>,
}

impl PriceRepository {
    /// Create a repository holding the empty snapshot.
    pub fn new() -> Self {
        Self::with_snapshot(PriceSnapshot::empty())
    }

    /// Create a repository seeded with a snapshot.
    pub fn with_snapshot(snapshot: PriceSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Get a handle to the current snapshot.
    pub fn current(&self) -> Arc<PriceSnapshot> {
        self.current.read().clone()
    }

    /// Unit price for a symbol, or `0` if unknown or no data yet.
    pub fn get_price(&self, symbol: &str) -> f64 {
        self.current.read().price(symbol)
    }

    /// Quotes in ingestion order, for populating currency pickers.
    pub fn list_quotes(&self) -> Vec<PriceQuote> {
        self.current.read().quotes().to_vec()
    }

    /// Check if any prices are available.
    pub fn has_data(&self) -> bool {
        !self.current.read().is_empty()
    }

    /// Swap in a new snapshot.
    pub(crate) fn replace(&self, snapshot: Arc<PriceSnapshot>) {
        debug!(
            generation = %snapshot.generation(),
            quotes = snapshot.len(),
            "Replacing price snapshot"
        );
        *self.current.write() = snapshot;
    }
}

impl Default for PriceRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared price repository.
pub type SharedPriceRepository = Arc<PriceRepository>;
