//! Error types shared across SwapDesk crates.

use thiserror::Error;

/// Reasons a price record is refused at ingestion.
///
/// These are never surfaced to the user: the offending record is dropped and
/// the rest of the response is kept.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// Record has no ticker.
    #[error("Price record has an empty currency symbol")]
    EmptySymbol,

    /// Record carries no price.
    #[error("Price record for {currency} has no price")]
    MissingPrice { currency: String },

    /// Price is zero or negative (market unavailable).
    #[error("Price {price} for {currency} is not positive")]
    NonPositivePrice { currency: String, price: f64 },

    /// Price is NaN or infinite.
    #[error("Price for {currency} is not a finite number")]
    NonFinitePrice { currency: String },
}

impl QuoteError {
    /// Get error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            QuoteError::EmptySymbol => "EMPTY_SYMBOL",
            QuoteError::MissingPrice { .. } => "MISSING_PRICE",
            QuoteError::NonPositivePrice { .. } => "NON_POSITIVE_PRICE",
            QuoteError::NonFinitePrice { .. } => "NON_FINITE_PRICE",
        }
    }
}

/// Configuration problems detected at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
