//! Immutable price snapshots.

use std::collections::HashMap;

use swapdesk_common::{now, Currency, FetchGeneration, PriceQuote, RawPriceRecord, Timestamp};
use tracing::debug;

/// The complete set of known quotes at one point in time.
///
/// Quotes keep the order in which their symbol was first seen, and every
/// symbol appears once. A snapshot is never modified after construction;
/// newer data arrives as a whole new snapshot.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    quotes: Vec<PriceQuote>,
    index: HashMap<Currency, usize>,
    generation: FetchGeneration,
    fetched_at: Option<Timestamp>,
    dropped: usize,
}

impl PriceSnapshot {
    /// The empty snapshot a session starts with.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from raw source records, dropping invalid ones.
    pub fn from_records(records: Vec<RawPriceRecord>, generation: FetchGeneration) -> Self {
        let received_at = now();
        let mut dropped = 0;
        let quotes = records.into_iter().filter_map(|record| {
            match PriceQuote::from_record(record, received_at) {
                Ok(quote) => Some(quote),
                Err(e) => {
                    debug!(code = e.error_code(), reason = %e, "Dropping price record");
                    dropped += 1;
                    None
                }
            }
        });
        let quotes: Vec<PriceQuote> = quotes.collect();

        let mut snapshot = Self::from_quotes(quotes, generation);
        snapshot.dropped += dropped;
        snapshot
    }

    /// Build a snapshot from validated quotes.
    ///
    /// When a symbol repeats, the quote with the latest date wins and takes
    /// the slot of the first occurrence. Equal dates keep the first quote.
    pub fn from_quotes(quotes: Vec<PriceQuote>, generation: FetchGeneration) -> Self {
        let mut kept: Vec<PriceQuote> = Vec::with_capacity(quotes.len());
        let mut index: HashMap<Currency, usize> = HashMap::with_capacity(quotes.len());
        let mut dropped = 0;

        for quote in quotes {
            match index.get(&quote.currency) {
                Some(&slot) => {
                    if quote.date > kept[slot].date {
                        kept[slot] = quote;
                    }
                    dropped += 1;
                }
                None => {
                    index.insert(quote.currency.clone(), kept.len());
                    kept.push(quote);
                }
            }
        }

        Self {
            quotes: kept,
            index,
            generation,
            fetched_at: Some(now()),
            dropped,
        }
    }

    /// Look up the quote for a symbol.
    pub fn get(&self, symbol: &str) -> Option<&PriceQuote> {
        self.index.get(symbol).map(|&slot| &self.quotes[slot])
    }

    /// Unit price for a symbol, or `0` when the symbol is unknown.
    pub fn price(&self, symbol: &str) -> f64 {
        self.get(symbol).map(|q| q.price).unwrap_or(0.0)
    }

    /// Check if the snapshot quotes a symbol.
    pub fn contains(&self, symbol: &str) -> bool {
        self.index.contains_key(symbol)
    }

    /// Quotes in ingestion order.
    pub fn quotes(&self) -> &[PriceQuote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Fetch generation that produced this snapshot.
    pub fn generation(&self) -> FetchGeneration {
        self.generation
    }

    /// When the snapshot was built. `None` for the initial empty snapshot.
    pub fn fetched_at(&self) -> Option<Timestamp> {
        self.fetched_at
    }

    /// Records discarded while building (invalid or duplicate).
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(currency: &str, price: f64, date: &str) -> RawPriceRecord {
        RawPriceRecord::new(currency, price, date)
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = PriceSnapshot::empty();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.price("USD"), 0.0);
        assert_eq!(snapshot.generation(), FetchGeneration::INITIAL);
        assert!(snapshot.fetched_at().is_none());
    }

    #[test]
    fn test_invalid_records_dropped() {
        let snapshot = PriceSnapshot::from_records(
            vec![
                record("USD", 1.0, "2023-08-29T07:10:30.000Z"),
                record("LUNA", 0.0, "2023-08-29T07:10:30.000Z"),
                record("ETH", 1645.93, "2023-08-29T07:10:52.000Z"),
                record("BAD", -3.0, "2023-08-29T07:10:52.000Z"),
            ],
            FetchGeneration::new(1),
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.dropped(), 2);
        assert!(!snapshot.contains("LUNA"));
        assert_eq!(snapshot.price("LUNA"), 0.0);
        assert_eq!(snapshot.price("ETH"), 1645.93);
    }

    #[test]
    fn test_undated_record_is_kept() {
        let snapshot = PriceSnapshot::from_records(
            vec![
                record("USD", 1.0, "2023-08-29T07:10:30.000Z"),
                RawPriceRecord {
                    currency: "SWTH".to_string(),
                    price: Some(0.004),
                    date: None,
                },
                record("ATOM", 7.18, "not a date"),
            ],
            FetchGeneration::new(1),
        );

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.dropped(), 0);
        assert_eq!(snapshot.price("SWTH"), 0.004);
        assert_eq!(snapshot.price("ATOM"), 7.18);
    }

    #[test]
    fn test_order_is_first_seen() {
        let snapshot = PriceSnapshot::from_records(
            vec![
                record("ETH", 1645.93, "2023-08-29T07:10:52.000Z"),
                record("USD", 1.0, "2023-08-29T07:10:30.000Z"),
                record("ATOM", 7.18, "2023-08-29T07:10:50.000Z"),
            ],
            FetchGeneration::new(1),
        );

        let symbols: Vec<&str> = snapshot.quotes().iter().map(|q| q.currency.symbol()).collect();
        assert_eq!(symbols, vec!["ETH", "USD", "ATOM"]);
    }

    #[test]
    fn test_duplicates_keep_latest_in_first_slot() {
        let snapshot = PriceSnapshot::from_records(
            vec![
                record("USDC", 0.9998, "2023-08-29T07:10:30.000Z"),
                record("ETH", 1645.93, "2023-08-29T07:10:52.000Z"),
                record("USDC", 0.9999, "2023-08-29T07:10:40.000Z"),
                record("USDC", 1.0001, "2023-08-29T07:10:35.000Z"),
            ],
            FetchGeneration::new(1),
        );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.quotes()[0].currency.symbol(), "USDC");
        assert_eq!(snapshot.price("USDC"), 0.9999);
    }

    #[test]
    fn test_duplicate_with_equal_date_keeps_first() {
        let snapshot = PriceSnapshot::from_records(
            vec![
                record("BLUR", 0.20, "2023-08-29T07:10:40.000Z"),
                record("BLUR", 0.21, "2023-08-29T07:10:40.000Z"),
            ],
            FetchGeneration::new(1),
        );

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.price("BLUR"), 0.20);
    }

    proptest! {
        #[test]
        fn prop_snapshot_holds_only_positive_unique_prices(
            entries in proptest::collection::vec(("[A-C]{1,2}", -10.0f64..10.0), 0..40)
        ) {
            let records = entries
                .iter()
                .map(|(symbol, price)| record(symbol, *price, "2023-08-29T07:10:40.000Z"))
                .collect();

            let snapshot = PriceSnapshot::from_records(records, FetchGeneration::new(1));

            let mut seen = std::collections::HashSet::new();
            for quote in snapshot.quotes() {
                prop_assert!(quote.price > 0.0);
                prop_assert!(seen.insert(quote.currency.clone()));
            }
        }
    }
}
