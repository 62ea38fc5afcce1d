//! Simulated price market for testing.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use swapdesk_common::{now, RawPriceRecord};
use swapdesk_pricing::{PriceSource, SourceError};
use tracing::debug;

/// Starting quotes, roughly matching the public price feed.
const BASE_QUOTES: [(&str, f64); 12] = [
    ("USD", 1.0),
    ("USDC", 0.9998),
    ("ETH", 1645.93),
    ("ATOM", 7.18),
    ("OSMO", 0.3772),
    ("WBTC", 26002.82),
    ("bNEO", 7.19),
    ("stATOM", 8.19),
    ("wstETH", 1872.25),
    ("SWTH", 0.0040),
    ("BLUR", 0.2081),
    ("LUNA", 0.0),
];

/// A price source that publishes drifting quotes and fails on demand.
///
/// Each fetch moves every price by a small random step. `failure_rate`
/// failures happen at random; [`fail_next`](Self::fail_next) forces failures
/// for scripted scenarios.
pub struct SimulatedPriceSource {
    rng: Mutex<StdRng>,
    prices: Mutex<Vec<(String, f64)>>,
    failure_rate: f64,
    latency: Duration,
    forced_failures: AtomicU32,
    served: AtomicUsize,
}

impl SimulatedPriceSource {
    /// Create a new simulated source.
    pub fn new(seed: Option<u64>, failure_rate: f64, latency: Duration) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            rng: Mutex::new(rng),
            prices: Mutex::new(
                BASE_QUOTES
                    .iter()
                    .map(|(symbol, price)| (symbol.to_string(), *price))
                    .collect(),
            ),
            failure_rate: if failure_rate.is_finite() {
                failure_rate.clamp(0.0, 1.0)
            } else {
                0.0
            },
            latency,
            forced_failures: AtomicU32::new(0),
            served: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` fetches fail.
    pub fn fail_next(&self, count: u32) {
        self.forced_failures.fetch_add(count, Ordering::SeqCst);
    }

    /// Number of fetches answered so far.
    pub fn served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    fn should_fail(&self) -> bool {
        let forced = self
            .forced_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        forced || self.rng.lock().gen_bool(self.failure_rate)
    }

    fn next_records(&self) -> Vec<RawPriceRecord> {
        let date = now().to_rfc3339();
        let mut rng = self.rng.lock();
        let mut prices = self.prices.lock();

        prices
            .iter_mut()
            .map(|(symbol, price)| {
                // USD is the reference; zero prices stay zero.
                if symbol.as_str() != "USD" && *price > 0.0 {
                    *price *= 1.0 + rng.gen_range(-0.005..0.005);
                }
                RawPriceRecord::new(symbol.clone(), *price, date.clone())
            })
            .collect()
    }
}

#[async_trait]
impl PriceSource for SimulatedPriceSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn fetch_records(&self) -> Result<Vec<RawPriceRecord>, SourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.served.fetch_add(1, Ordering::SeqCst);

        if self.should_fail() {
            debug!("Simulated price source failing this fetch");
            return Err(SourceError::Status { status: 503 });
        }

        Ok(self.next_records())
    }
}
