//! Engine configuration.

use std::time::Duration;

use swapdesk_common::{constants, scaled, ConfigError};
use swapdesk_pricing::DEFAULT_PRICE_URL;

/// Price source configuration.
#[derive(Debug, Clone)]
pub struct PriceSourceConfig {
    /// Price list URL.
    pub url: String,
    /// Fetch timeout.
    pub timeout: Duration,
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PRICE_URL.to_string(),
            timeout: constants::fetch_timeout(),
        }
    }
}

/// Main swap engine configuration.
#[derive(Debug, Clone)]
pub struct SwapConfig {
    /// Price source configuration.
    pub price_source: PriceSourceConfig,
    /// Delay between confirmation and settlement.
    pub settlement_delay: Duration,
    /// How long a success notification stays up.
    pub notification_duration: Duration,
    /// Delay between settlement and the form reset.
    pub reset_delay: Duration,
    /// Background price refresh period. `None` disables refreshing.
    pub refresh_interval: Option<Duration>,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            price_source: PriceSourceConfig::default(),
            settlement_delay: constants::settlement_delay(),
            notification_duration: constants::notification_duration(),
            reset_delay: constants::reset_delay(),
            refresh_interval: None,
        }
    }
}

impl SwapConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SWAPDESK_PRICE_URL") {
            config.price_source.url = url;
        }

        if let Some(timeout) = env_millis("SWAPDESK_FETCH_TIMEOUT_MS") {
            config.price_source.timeout = timeout;
        }

        if let Some(delay) = env_millis("SWAPDESK_SETTLEMENT_DELAY_MS") {
            config.settlement_delay = delay;
        }

        if let Some(interval) = env_millis("SWAPDESK_REFRESH_INTERVAL_MS") {
            config.refresh_interval = (!interval.is_zero()).then_some(interval);
        }

        config
    }

    /// Speed every timer up by `speed` (2.0 halves all delays).
    pub fn scaled(mut self, speed: f64) -> Self {
        self.settlement_delay = scaled(self.settlement_delay, speed);
        self.notification_duration = scaled(self.notification_duration, speed);
        self.reset_delay = scaled(self.reset_delay, speed);
        self.refresh_interval = self.refresh_interval.map(|i| scaled(i, speed));
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.price_source.url.trim().is_empty() {
            return Err(ConfigError::new("Price source URL cannot be empty"));
        }

        if !self.price_source.url.starts_with("http://")
            && !self.price_source.url.starts_with("https://")
        {
            return Err(ConfigError::new("Price source URL must be http or https"));
        }

        if self.price_source.timeout.is_zero() {
            return Err(ConfigError::new("Fetch timeout cannot be 0"));
        }

        if self.notification_duration.is_zero() {
            return Err(ConfigError::new("Notification duration cannot be 0"));
        }

        if matches!(self.refresh_interval, Some(interval) if interval.is_zero()) {
            return Err(ConfigError::new("Refresh interval cannot be 0"));
        }

        Ok(())
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}
