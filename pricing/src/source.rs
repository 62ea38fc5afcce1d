//! Price source trait and implementations.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use swapdesk_common::{ConfigError, RawPriceRecord};
use tracing::debug;

use crate::error::SourceError;

/// Default price feed.
pub const DEFAULT_PRICE_URL: &str = "https://interview.switcheo.com/prices.json";

/// Something that can hand out the full list of current price records.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch every record the source currently publishes, unfiltered.
    async fn fetch_records(&self) -> Result<Vec<RawPriceRecord>, SourceError>;
}

/// Price source backed by a JSON document served over HTTP.
pub struct HttpPriceSource {
    client: Client,
    url: String,
}

impl HttpPriceSource {
    /// Create a new HTTP source. `timeout` bounds the whole request.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create with a pre-configured client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch_records(&self) -> Result<Vec<RawPriceRecord>, SourceError> {
        debug!(url = %self.url, "Requesting price list");

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Transport(format!("request timeout: {}", e))
            } else if e.is_connect() {
                SourceError::Transport(format!("connection failed: {}", e))
            } else {
                SourceError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<RawPriceRecord>>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

/// Scripted price source for testing.
///
/// Responses are served in the order they were pushed. Once the script runs
/// out, the last response is repeated.
#[cfg(any(test, feature = "test-utils"))]
pub struct ScriptedPriceSource {
    name: String,
    script: parking_lot::Mutex<std::collections::VecDeque<ScriptedResponse>>,
    last: parking_lot::Mutex<Option<ScriptedResponse>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
#[derive(Clone)]
struct ScriptedResponse {
    result: Result<Vec<RawPriceRecord>, SourceError>,
    delay: Duration,
}

#[cfg(any(test, feature = "test-utils"))]
impl ScriptedPriceSource {
    /// Create a new scripted source with an empty script.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            last: parking_lot::Mutex::new(None),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Queue a successful response.
    pub fn push_records(&self, records: Vec<RawPriceRecord>) -> &Self {
        self.push(Ok(records), Duration::ZERO)
    }

    /// Queue a failure.
    pub fn push_error(&self, error: SourceError) -> &Self {
        self.push(Err(error), Duration::ZERO)
    }

    /// Queue a successful response that takes `delay` to arrive.
    pub fn push_delayed(&self, records: Vec<RawPriceRecord>, delay: Duration) -> &Self {
        self.push(Ok(records), delay)
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn push(&self, result: Result<Vec<RawPriceRecord>, SourceError>, delay: Duration) -> &Self {
        self.script.lock().push_back(ScriptedResponse { result, delay });
        self
    }

    fn next_response(&self) -> ScriptedResponse {
        let next = self.script.lock().pop_front();
        let mut last = self.last.lock();
        match next {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().unwrap_or(ScriptedResponse {
                result: Err(SourceError::Transport("no scripted response".to_string())),
                delay: Duration::ZERO,
            }),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl PriceSource for ScriptedPriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_records(&self) -> Result<Vec<RawPriceRecord>, SourceError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let response = self.next_response();
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.result
    }
}
