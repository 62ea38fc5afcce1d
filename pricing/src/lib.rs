//! SwapDesk Pricing
//!
//! Price data for the swap engine: where quotes come from, where the latest
//! snapshot lives, and how cross-rates are derived from it.
//!
//! # Features
//!
//! - Pluggable price sources (HTTP, scripted for tests)
//! - Atomic snapshot replacement with stale-data retention on failure
//! - Fetch generations so a slow, superseded response is never applied
//! - Cross-rate and conversion helpers that never divide by zero
//!
//! # Example
//!
//! ```rust,ignore
//! use swapdesk_pricing::{HttpPriceSource, PriceFetcher, PriceRepository};
//!
//! let repository = Arc::new(PriceRepository::new());
//! let source = Arc::new(HttpPriceSource::new(url, timeout)?);
//! let fetcher = PriceFetcher::new(source, repository.clone(), timeout);
//!
//! let snapshot = fetcher.fetch().await?;
//! let rate = swapdesk_pricing::rate("USD", "ETH", &snapshot);
//! ```

pub mod source;
pub mod snapshot;
pub mod repository;
pub mod fetcher;
pub mod conversion;
pub mod error;

pub use source::{HttpPriceSource, PriceSource, DEFAULT_PRICE_URL};
#[cfg(any(test, feature = "test-utils"))]
pub use source::ScriptedPriceSource;
pub use snapshot::PriceSnapshot;
pub use repository::PriceRepository;
pub use fetcher::PriceFetcher;
pub use conversion::{convert, format_fixed, quote, rate, Conversion, RECEIVE_AMOUNT_DECIMALS};
pub use error::{FetchError, FetchResult, SourceError};
