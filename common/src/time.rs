//! Time utilities and constants for the swap lifecycle.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Lifecycle timing constants.
pub mod constants {
    use super::Duration;

    /// Upper bound on a single price fetch (10 seconds).
    pub fn fetch_timeout() -> Duration {
        Duration::from_secs(10)
    }

    /// Simulated settlement latency after the user confirms (1.5 seconds).
    pub fn settlement_delay() -> Duration {
        Duration::from_millis(1500)
    }

    /// How long the success notification stays up (5 seconds).
    pub fn notification_duration() -> Duration {
        Duration::from_secs(5)
    }

    /// Delay between settlement and the form reset (4.1 seconds).
    pub fn reset_delay() -> Duration {
        Duration::from_millis(4100)
    }
}

/// A timestamp, always UTC.
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Calculate a deadline `duration` from now.
pub fn expires_in(duration: Duration) -> Timestamp {
    let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
    now() + delta
}

/// Check if a deadline has passed.
pub fn is_expired(expiry: Timestamp) -> bool {
    now() > expiry
}

/// Scale a delay by a speed multiplier. Non-positive or non-finite speeds leave it unchanged.
pub fn scaled(duration: Duration, speed: f64) -> Duration {
    if !speed.is_finite() || speed <= 0.0 {
        return duration;
    }
    Duration::from_secs_f64(duration.as_secs_f64() / speed)
}
