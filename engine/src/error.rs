//! Swap engine error types.

use swapdesk_pricing::FetchError;
use thiserror::Error;

use crate::state::SwapPhase;

/// Errors returned by swap session actions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SwapError {
    /// The amount failed validation; the message is shown inline.
    #[error("{message}")]
    Validation { message: String },

    #[error("Both currencies must be selected")]
    CurrencyNotSelected,

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// No usable price for one of the legs.
    #[error("No exchange rate available for {from} to {to}")]
    RateUnavailable { from: String, to: String },

    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: SwapPhase, to: SwapPhase },

    #[error("Cannot {action} while {phase}")]
    ActionNotAllowed {
        action: &'static str,
        phase: SwapPhase,
    },

    /// A timer fired for a ticket the session no longer holds.
    #[error("Stale {timer} timer")]
    StaleTimer { timer: &'static str },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl SwapError {
    /// Check if the user can recover by retrying the price fetch.
    pub fn is_retryable(&self) -> bool {
        match self {
            SwapError::Fetch(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Get error code for logs and views.
    pub fn error_code(&self) -> &'static str {
        match self {
            SwapError::Validation { .. } => "VALIDATION_ERROR",
            SwapError::CurrencyNotSelected => "CURRENCY_NOT_SELECTED",
            SwapError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            SwapError::RateUnavailable { .. } => "RATE_UNAVAILABLE",
            SwapError::InvalidTransition { .. } => "INVALID_TRANSITION",
            SwapError::ActionNotAllowed { .. } => "ACTION_NOT_ALLOWED",
            SwapError::StaleTimer { .. } => "STALE_TIMER",
            SwapError::Fetch(e) => e.error_code(),
        }
    }
}

/// Result type for swap operations.
pub type SwapResult<T> = Result<T, SwapError>;
