//! Currency symbols and price quotes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::QuoteError;
use crate::time::now;

/// A currency or token ticker as published by the price source.
///
/// Symbols are case-preserving: `bNEO` and `BNEO` are different tickers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from its ticker. Surrounding whitespace is trimmed.
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let trimmed = symbol.trim();
        if trimmed.len() == symbol.len() {
            Self(symbol)
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Get the ticker.
    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// Whether the ticker is empty (an unselected currency).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eth() -> Self {
        Self::new("ETH")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for Currency {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A record exactly as it arrives from the price source.
///
/// Every field is optional on the wire so that one malformed entry can be
/// dropped without rejecting the whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPriceRecord {
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

impl RawPriceRecord {
    /// Create a record, mainly for tests and simulated sources.
    pub fn new(currency: impl Into<String>, price: f64, date: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            price: Some(price),
            date: Some(date.into()),
        }
    }
}

/// A currency's unit price at a point in time.
///
/// Invariant: `price` is finite and strictly positive. The only way to build a
/// `PriceQuote` from untrusted input is [`PriceQuote::from_record`], which enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// The quoted currency.
    pub currency: Currency,
    /// Unit price in the source's reference currency.
    pub price: f64,
    /// When the price was quoted.
    pub date: DateTime<Utc>,
}

impl PriceQuote {
    /// Create a quote from already-validated parts.
    pub fn new(currency: Currency, price: f64, date: DateTime<Utc>) -> Result<Self, QuoteError> {
        if currency.is_empty() {
            return Err(QuoteError::EmptySymbol);
        }
        if !price.is_finite() {
            return Err(QuoteError::NonFinitePrice {
                currency: currency.to_string(),
            });
        }
        if price <= 0.0 {
            return Err(QuoteError::NonPositivePrice {
                currency: currency.to_string(),
                price,
            });
        }

        Ok(Self {
            currency,
            price,
            date,
        })
    }
}

impl PriceQuote {
    /// Validate a wire record.
    ///
    /// Only the symbol and price decide whether a record is kept. A missing or
    /// unparseable date falls back to `received_at`.
    pub fn from_record(
        record: RawPriceRecord,
        received_at: DateTime<Utc>,
    ) -> Result<Self, QuoteError> {
        let currency = Currency::new(record.currency);
        let price = record.price.ok_or_else(|| QuoteError::MissingPrice {
            currency: currency.to_string(),
        })?;
        let date = record
            .date
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or(received_at);

        Self::new(currency, price, date)
    }
}

impl TryFrom<RawPriceRecord> for PriceQuote {
    type Error = QuoteError;

    fn try_from(record: RawPriceRecord) -> Result<Self, Self::Error> {
        Self::from_record(record, now())
    }
}
