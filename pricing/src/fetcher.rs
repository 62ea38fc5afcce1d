//! Price fetching with retry tracking and fetch generations.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use swapdesk_common::FetchGeneration;
use tracing::{debug, info, instrument, warn};

use crate::error::{FetchError, FetchResult, SourceError};
use crate::repository::PriceRepository;
use crate::snapshot::PriceSnapshot;
use crate::source::PriceSource;

/// Pulls price lists from a [`PriceSource`] into a [`PriceRepository`].
///
/// Every call to [`fetch`](Self::fetch) is tagged with a new generation. Only a
/// response carrying the latest generation is applied; anything older is
/// discarded as [`FetchError::Superseded`], so a slow retry can never
/// overwrite fresher data.
pub struct PriceFetcher {
    source: Arc<dyn PriceSource>,
    repository: Arc<PriceRepository>,
    timeout: Duration,
    latest: AtomicU64,
    retry_count: AtomicU32,
    apply: Mutex<()>,
}

impl PriceFetcher {
    /// Create a new fetcher.
    pub fn new(
        source: Arc<dyn PriceSource>,
        repository: Arc<PriceRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            repository,
            timeout,
            latest: AtomicU64::new(FetchGeneration::INITIAL.value()),
            retry_count: AtomicU32::new(0),
            apply: Mutex::new(()),
        }
    }

    /// Fetch a fresh snapshot and install it in the repository.
    ///
    /// On failure the repository keeps whatever it held before.
    #[instrument(skip(self), fields(source = %self.source.name()))]
    pub async fn fetch(&self) -> FetchResult<Arc<PriceSnapshot>> {
        let generation = FetchGeneration::new(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(generation = %generation, "Fetching prices");

        let outcome = match tokio::time::timeout(self.timeout, self.source.fetch_records()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };

        // Generation check and repository swap happen together.
        let _guard = self.apply.lock();

        let latest = self.latest_generation();
        if generation != latest {
            debug!(
                generation = %generation,
                latest = %latest,
                "Discarding superseded price response"
            );
            return Err(FetchError::Superseded { generation, latest });
        }

        match outcome {
            Ok(records) => {
                let received = records.len();
                let snapshot = Arc::new(PriceSnapshot::from_records(records, generation));
                self.repository.replace(snapshot.clone());
                self.retry_count.store(0, Ordering::SeqCst);

                info!(
                    generation = %generation,
                    received,
                    quotes = snapshot.len(),
                    dropped = snapshot.dropped(),
                    "Prices updated"
                );
                Ok(snapshot)
            }
            Err(e) => {
                let retry_count = self.retry_count.fetch_add(1, Ordering::SeqCst) + 1;
                warn!(
                    generation = %generation,
                    retry_count,
                    error = %e,
                    "Price fetch failed"
                );
                Err(FetchError::Network {
                    generation,
                    message: e.to_string(),
                    retry_count,
                })
            }
        }
    }

    /// Consecutive failed fetches since the last success.
    pub fn retry_count(&self) -> u32 {
        self.retry_count.load(Ordering::SeqCst)
    }

    /// Generation of the most recently issued fetch.
    pub fn latest_generation(&self) -> FetchGeneration {
        FetchGeneration::new(self.latest.load(Ordering::SeqCst))
    }

    /// The repository this fetcher writes to.
    pub fn repository(&self) -> &Arc<PriceRepository> {
        &self.repository
    }

    /// Name of the underlying source.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }
}
