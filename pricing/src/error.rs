//! Pricing error types.

use swapdesk_common::FetchGeneration;
use thiserror::Error;

/// Failure reported by a [`PriceSource`](crate::PriceSource).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Request never produced a response (DNS, connect, TLS, reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// Source answered with a non-success HTTP status.
    #[error("price source returned HTTP {status}")]
    Status { status: u16 },

    /// Response body was not a list of price records.
    #[error("malformed price response: {0}")]
    Decode(String),

    /// Source did not answer in time.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Errors that can occur while fetching prices.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The fetch failed or timed out. The previous snapshot is untouched.
    #[error("Failed to fetch prices: {message} (consecutive failures: {retry_count})")]
    Network {
        generation: FetchGeneration,
        message: String,
        retry_count: u32,
    },

    /// A newer fetch was issued before this one completed; its result was discarded.
    #[error("Fetch {generation} superseded by {latest}")]
    Superseded {
        generation: FetchGeneration,
        latest: FetchGeneration,
    },
}

impl FetchError {
    /// Check if the user should be offered a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }

    /// Generation of the fetch that produced this error.
    pub fn generation(&self) -> FetchGeneration {
        match self {
            FetchError::Network { generation, .. } | FetchError::Superseded { generation, .. } => {
                *generation
            }
        }
    }

    /// Consecutive failures including this one (zero for superseded fetches).
    pub fn retry_count(&self) -> u32 {
        match self {
            FetchError::Network { retry_count, .. } => *retry_count,
            FetchError::Superseded { .. } => 0,
        }
    }

    /// Banner text for the presentation layer.
    ///
    /// The first failure reads plainly; later ones append `(Retry N)` where N
    /// counts the retries that also failed.
    pub fn user_message(&self) -> String {
        let base = "Failed to fetch prices. Please check your connection.";
        match self.retry_count() {
            0 | 1 => base.to_string(),
            n => format!("{} (Retry {})", base, n - 1),
        }
    }

    /// Get error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Network { .. } => "NETWORK_ERROR",
            FetchError::Superseded { .. } => "FETCH_SUPERSEDED",
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
