//! Core swap engine implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use swapdesk_common::{ConfigError, SessionId, TicketId};
use swapdesk_pricing::{
    FetchError, HttpPriceSource, PriceFetcher, PriceRepository, PriceSource,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use crate::config::SwapConfig;
use crate::confirmation::SwapConfirmation;
use crate::error::{SwapError, SwapResult};
use crate::metrics::{MetricsSnapshot, SessionMetrics, SharedMetrics};
use crate::session::{FetchApplied, SwapSession};
use crate::state::SwapPhase;
use crate::view::SessionView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TimerKind {
    Settlement,
    Notification,
    Reset,
    Refresh,
}

/// Drives one swap session: fetches prices, applies user actions and runs
/// the settlement, notification and reset timers.
///
/// Every method that schedules work must be called from within a Tokio
/// runtime. Dropping the engine aborts all pending timers.
pub struct SwapEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    /// Configuration.
    config: SwapConfig,
    /// The session; locked only for short synchronous transitions.
    session: Mutex<SwapSession>,
    fetcher: PriceFetcher,
    metrics: SharedMetrics,
    /// Latest view, republished after every transition.
    view_tx: watch::Sender<SessionView>,
    /// Pending timer tasks, one per kind.
    timers: Mutex<HashMap<TimerKind, JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl SwapEngine {
    /// Create an engine reading prices from `source`.
    pub fn new(config: SwapConfig, source: Arc<dyn PriceSource>) -> Self {
        let repository = Arc::new(PriceRepository::new());
        let fetcher = PriceFetcher::new(source, repository, config.price_source.timeout);
        let session = SwapSession::new();
        let (view_tx, _) = watch::channel(SessionView::from_session(&session));

        Self {
            inner: Arc::new(EngineInner {
                config,
                session: Mutex::new(session),
                fetcher,
                metrics: Arc::new(SessionMetrics::new()),
                view_tx,
                timers: Mutex::new(HashMap::new()),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Create an engine reading prices over HTTP from the configured URL.
    pub fn with_http_source(config: SwapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = Arc::new(HttpPriceSource::new(
            config.price_source.url.clone(),
            config.price_source.timeout,
        )?);
        Ok(Self::new(config, source))
    }

    /// Load prices for the first time and start background refreshing.
    ///
    /// A failed fetch is not an error here: it shows up as the banner in the
    /// view and the session lands in `Error` (no data) so the user can retry.
    #[instrument(skip(self), fields(session_id = %self.session_id()))]
    pub async fn start(&self) -> SwapResult<FetchApplied> {
        info!(source = self.inner.fetcher.source_name(), "Starting swap engine");

        self.inner.with_session(|s| s.begin_loading())?;

        if let Some(interval) = self.inner.config.refresh_interval {
            self.inner.start_refresh_loop(interval);
        }

        self.inner.run_fetch().await
    }

    /// Re-fetch prices after a failure, showing the loading state.
    #[instrument(skip(self), fields(session_id = %self.session_id()))]
    pub async fn retry(&self) -> SwapResult<FetchApplied> {
        self.inner.with_session(|s| {
            if !s.phase().can_retry() {
                return Err(SwapError::ActionNotAllowed {
                    action: "retry",
                    phase: s.phase(),
                });
            }
            s.begin_loading()
        })?;

        info!("Retrying price fetch");
        self.inner.run_fetch().await
    }

    /// Re-fetch prices without touching the phase.
    pub async fn refresh(&self) -> SwapResult<FetchApplied> {
        self.inner.refresh().await
    }

    pub fn select_from(&self, symbol: &str) -> SwapResult<()> {
        self.inner.with_session(|s| s.select_from(symbol))
    }

    pub fn select_to(&self, symbol: &str) -> SwapResult<()> {
        self.inner.with_session(|s| s.select_to(symbol))
    }

    pub fn set_amount(&self, raw: &str) -> SwapResult<()> {
        self.inner.with_session(|s| s.set_amount(raw))
    }

    pub fn swap_positions(&self) -> SwapResult<()> {
        self.inner.with_session(|s| s.swap_positions())
    }

    /// Validate the form and open the confirm dialog.
    pub fn initiate_swap(&self) -> SwapResult<SwapConfirmation> {
        self.inner.with_session(|s| s.initiate_swap())
    }

    pub fn cancel_confirmation(&self) -> SwapResult<()> {
        self.inner.with_session(|s| s.cancel_confirmation())?;
        self.inner.metrics.swap_cancelled();
        Ok(())
    }

    /// Confirm the frozen swap and schedule its settlement.
    pub fn confirm(&self) -> SwapResult<TicketId> {
        if self.is_shut_down() {
            return Err(SwapError::ActionNotAllowed {
                action: "confirm",
                phase: self.phase(),
            });
        }

        let ticket = self.inner.with_session(|s| s.confirm())?;
        self.inner.metrics.swap_confirmed();

        self.inner.schedule(
            TimerKind::Settlement,
            self.inner.config.settlement_delay,
            move |inner| inner.settle(ticket),
        );
        Ok(ticket)
    }

    /// Close the success notification before it hides itself.
    pub fn dismiss_notification(&self) -> SwapResult<()> {
        self.inner.with_session(|s| match s.notification().map(|n| n.id) {
            Some(id) => s.dismiss_notification(id),
            None => Ok(()),
        })?;
        self.inner.cancel_timer(TimerKind::Notification);
        Ok(())
    }

    /// Current view.
    pub fn view(&self) -> SessionView {
        self.inner.view_tx.borrow().clone()
    }

    /// Receive a new view after every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.view_tx.subscribe()
    }

    pub fn phase(&self) -> SwapPhase {
        self.inner.session.lock().phase()
    }

    pub fn session_id(&self) -> SessionId {
        self.inner.session.lock().id()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    pub fn config(&self) -> &SwapConfig {
        &self.inner.config
    }

    /// Consecutive failed fetches since the last success.
    pub fn retry_count(&self) -> u32 {
        self.inner.fetcher.retry_count()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }

    /// Abort every pending timer. Nothing fires against the session afterwards.
    pub fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        let aborted = self.inner.abort_timers();
        info!(session_id = %self.session_id(), aborted, "Swap engine shut down");
    }
}

impl Drop for SwapEngine {
    fn drop(&mut self) {
        self.inner.shut_down.store(true, Ordering::SeqCst);
        self.inner.abort_timers();
    }
}

impl EngineInner {
    /// Run a transition and publish the resulting view.
    fn with_session<T>(
        &self,
        transition: impl FnOnce(&mut SwapSession) -> SwapResult<T>,
    ) -> SwapResult<T> {
        let mut session = self.session.lock();
        let result = transition(&mut session);

        if let Err(e) = &result {
            if matches!(e, SwapError::Validation { .. }) {
                self.metrics.validation_failed();
            }
            debug!(code = e.error_code(), error = %e, phase = %session.phase(), "Action rejected");
        }

        self.view_tx.send_replace(SessionView::from_session(&session));
        result
    }

    async fn run_fetch(&self) -> SwapResult<FetchApplied> {
        self.metrics.fetch_attempted();
        let outcome = self.fetcher.fetch().await;

        match &outcome {
            Ok(_) => self.metrics.fetch_succeeded(),
            Err(FetchError::Superseded { .. }) => self.metrics.fetch_superseded(),
            Err(FetchError::Network { .. }) => self.metrics.fetch_failed(),
        }

        self.with_session(|s| s.apply_fetch_outcome(outcome))
    }

    async fn refresh(&self) -> SwapResult<FetchApplied> {
        let phase = self.session.lock().phase();
        if !phase.accepts_refresh() {
            debug!(phase = %phase, "Skipping background refresh");
            return Ok(FetchApplied::Ignored);
        }
        self.run_fetch().await
    }

    fn settle(self: &Arc<Self>, ticket: TicketId) {
        let settled = match self.with_session(|s| {
            s.complete_settlement(ticket, self.config.notification_duration)
        }) {
            Ok(settled) => settled,
            Err(e) => {
                debug!(ticket = %ticket, error = %e, "Settlement timer ignored");
                return;
            }
        };
        self.metrics.swap_settled();

        let notification_id = settled.notification.id;
        self.schedule(
            TimerKind::Notification,
            self.config.notification_duration,
            move |inner| {
                if inner
                    .with_session(|s| s.dismiss_notification(notification_id))
                    .is_ok()
                {
                    debug!(notification_id = %notification_id, "Notification hidden");
                }
            },
        );

        let reset_ticket = settled.reset_ticket;
        self.schedule(TimerKind::Reset, self.config.reset_delay, move |inner| {
            if let Err(e) = inner.with_session(|s| s.reset_form(reset_ticket)) {
                debug!(ticket = %reset_ticket, error = %e, "Reset timer ignored");
            }
        });
    }

    /// Run `action` after `delay`, replacing any pending timer of the same kind.
    fn schedule<F>(self: &Arc<Self>, kind: TimerKind, delay: Duration, action: F)
    where
        F: FnOnce(&Arc<EngineInner>) + Send + 'static,
    {
        if self.shut_down.load(Ordering::SeqCst) {
            return;
        }

        let weak: Weak<EngineInner> = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                action(&inner);
            }
        });

        debug!(timer = ?kind, delay_ms = delay.as_millis() as u64, "Timer scheduled");
        if let Some(previous) = self.timers.lock().insert(kind, handle) {
            previous.abort();
        }
    }

    fn start_refresh_loop(self: &Arc<Self>, interval: Duration) {
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = inner.refresh().await {
                    warn!(error = %e, "Background refresh failed");
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "Background refresh enabled");
        if let Some(previous) = self.timers.lock().insert(TimerKind::Refresh, handle) {
            previous.abort();
        }
    }

    fn cancel_timer(&self, kind: TimerKind) {
        if let Some(handle) = self.timers.lock().remove(&kind) {
            handle.abort();
        }
    }

    fn abort_timers(&self) -> usize {
        let mut timers = self.timers.lock();
        let count = timers.len();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapdesk_common::RawPriceRecord;
    use swapdesk_pricing::{ScriptedPriceSource, SourceError};

    fn record(currency: &str, price: f64) -> RawPriceRecord {
        RawPriceRecord::new(currency, price, "2023-08-29T07:10:40.000Z")
    }

    fn prices(eth: f64) -> Vec<RawPriceRecord> {
        vec![record("USD", 1.0), record("ETH", eth), record("LUNA", 0.0)]
    }

    fn engine_with(source: Arc<ScriptedPriceSource>, config: SwapConfig) -> SwapEngine {
        SwapEngine::new(config, source)
    }

    async fn ready_engine() -> SwapEngine {
        let source = Arc::new(ScriptedPriceSource::new("test"));
        source.push_records(prices(2500.0));
        let engine = engine_with(source, SwapConfig::default());
        engine.start().await.unwrap();
        engine
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_loads_prices() {
        let source = Arc::new(ScriptedPriceSource::new("test"));
        source.push_records(prices(2500.0));
        let engine = engine_with(source, SwapConfig::default());
        let mut views = engine.subscribe();

        assert_eq!(engine.phase(), SwapPhase::Idle);
        let applied = tokio_test::assert_ok!(engine.start().await);

        assert_eq!(applied, FetchApplied::Updated);
        assert!(views.has_changed().unwrap());
        let view = views.borrow_and_update().clone();
        assert_eq!(view.phase, SwapPhase::Ready);
        assert_eq!(view.currencies.len(), 2);
        assert!(view.banner.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_rejected() {
        let engine = ready_engine().await;

        assert!(matches!(
            engine.start().await,
            Err(SwapError::InvalidTransition { from: SwapPhase::Ready, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_retry() {
        let source = Arc::new(ScriptedPriceSource::new("flaky"));
        source
            .push_error(SourceError::Transport("connection refused".to_string()))
            .push_error(SourceError::Status { status: 503 })
            .push_records(prices(2500.0));
        let engine = engine_with(source, SwapConfig::default());

        engine.start().await.unwrap();
        assert_eq!(engine.phase(), SwapPhase::Error);
        assert_eq!(
            engine.view().banner.unwrap().message,
            "Failed to fetch prices. Please check your connection."
        );

        engine.retry().await.unwrap();
        assert_eq!(engine.phase(), SwapPhase::Error);
        assert_eq!(engine.retry_count(), 2);
        let banner = engine.view().banner.unwrap();
        assert_eq!(
            banner.message,
            "Failed to fetch prices. Please check your connection. (Retry 1)"
        );
        assert!(banner.can_retry);

        engine.retry().await.unwrap();
        assert_eq!(engine.phase(), SwapPhase::Ready);
        assert_eq!(engine.retry_count(), 0);
        assert!(engine.view().banner.is_none());

        let metrics = engine.metrics();
        assert_eq!(metrics.fetches_attempted, 3);
        assert_eq!(metrics.fetches_failed, 2);
        assert_eq!(metrics.fetches_succeeded, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_banner() {
        let source = Arc::new(ScriptedPriceSource::new("slow"));
        source.push_delayed(prices(2500.0), Duration::from_secs(60));
        let engine = engine_with(source, SwapConfig::default());

        engine.start().await.unwrap();

        assert_eq!(engine.phase(), SwapPhase::Error);
        assert_eq!(engine.view().banner.unwrap().code, "NETWORK_ERROR");
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_lifecycle_with_timers() {
        let engine = ready_engine().await;
        engine.select_from("USD").unwrap();
        engine.select_to("ETH").unwrap();
        engine.set_amount("2500").unwrap();

        let confirmation = engine.initiate_swap().unwrap();
        assert_eq!(confirmation.receive_amount, "1.000000");
        assert_eq!(engine.phase(), SwapPhase::Confirming);

        engine.confirm().unwrap();
        assert_eq!(engine.phase(), SwapPhase::Executing);
        assert!(engine.view().busy);
        assert!(engine.set_amount("1").is_err());

        sleep_ms(1400).await;
        assert_eq!(engine.phase(), SwapPhase::Executing);

        sleep_ms(200).await;
        assert_eq!(engine.phase(), SwapPhase::Settled);
        let notification = engine.view().notification.unwrap();
        assert_eq!(notification.amount, "2500");
        assert_eq!(notification.receive_amount, "1.000000");

        // Reset fires 4.1s after settlement.
        sleep_ms(4100).await;
        let view = engine.view();
        assert_eq!(view.phase, SwapPhase::Ready);
        assert_eq!(view.amount, "");
        assert_eq!(view.receive_amount, "");
        assert!(!view.show_validation);
        assert_eq!(view.from, "USD");
        assert_eq!(view.to, "ETH");
        assert!(view.notification.is_some());

        // Notification hides 5s after settlement.
        sleep_ms(1000).await;
        assert!(engine.view().notification.is_none());

        let metrics = engine.metrics();
        assert_eq!(metrics.swaps_confirmed, 1);
        assert_eq!(metrics.swaps_settled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_dismisses_notification() {
        let engine = ready_engine().await;
        engine.select_from("USD").unwrap();
        engine.select_to("ETH").unwrap();
        engine.set_amount("10").unwrap();
        engine.initiate_swap().unwrap();
        engine.confirm().unwrap();

        sleep_ms(1600).await;
        assert!(engine.view().notification.is_some());

        engine.dismiss_notification().unwrap();
        assert!(engine.view().notification.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_validation_metrics() {
        let engine = ready_engine().await;
        engine.select_from("USD").unwrap();
        engine.select_to("ETH").unwrap();

        assert!(matches!(
            engine.initiate_swap(),
            Err(SwapError::Validation { .. })
        ));
        assert_eq!(engine.view().validation_message, "Amount is required");

        engine.set_amount("5").unwrap();
        engine.initiate_swap().unwrap();
        engine.cancel_confirmation().unwrap();

        assert_eq!(engine.phase(), SwapPhase::Ready);
        let metrics = engine.metrics();
        assert_eq!(metrics.validation_failures, 1);
        assert_eq!(metrics.swaps_cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_settlement() {
        let engine = ready_engine().await;
        engine.select_from("USD").unwrap();
        engine.select_to("ETH").unwrap();
        engine.set_amount("10").unwrap();
        engine.initiate_swap().unwrap();
        engine.confirm().unwrap();

        engine.shutdown();
        sleep_ms(3000).await;

        assert!(engine.is_shut_down());
        assert_eq!(engine.phase(), SwapPhase::Executing);
        assert_eq!(engine.metrics().swaps_settled, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_refresh_keeps_confirmation() {
        let source = Arc::new(ScriptedPriceSource::new("moving"));
        source
            .push_records(prices(2500.0))
            .push_records(prices(5000.0));
        let config = SwapConfig {
            refresh_interval: Some(Duration::from_secs(1)),
            ..SwapConfig::default()
        };
        let engine = engine_with(source.clone(), config);

        engine.start().await.unwrap();
        engine.select_from("USD").unwrap();
        engine.select_to("ETH").unwrap();
        engine.set_amount("2500").unwrap();
        let frozen = engine.initiate_swap().unwrap();

        sleep_ms(1100).await;

        let view = engine.view();
        assert!(source.calls() >= 2);
        assert_eq!(view.phase, SwapPhase::Confirming);
        assert_eq!(view.rate, Some(0.0002));
        assert_eq!(view.receive_amount, "0.500000");
        assert_eq!(view.confirmation, Some(frozen));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_session_waits_for_user_retry() {
        let source = Arc::new(ScriptedPriceSource::new("down"));
        source
            .push_error(SourceError::Status { status: 503 })
            .push_records(prices(2500.0));
        let config = SwapConfig {
            refresh_interval: Some(Duration::from_secs(1)),
            ..SwapConfig::default()
        };
        let engine = engine_with(source.clone(), config);

        engine.start().await.unwrap();
        sleep_ms(1100).await;

        let view = engine.view();
        assert_eq!(source.calls(), 1);
        assert_eq!(view.phase, SwapPhase::Error);
        assert!(view.banner.unwrap().can_retry);

        engine.retry().await.unwrap();
        assert_eq!(engine.phase(), SwapPhase::Ready);
        assert!(engine.select_from("USD").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_only_counts_from_confirming() {
        let engine = ready_engine().await;
        engine.select_from("USD").unwrap();
        engine.select_to("ETH").unwrap();
        engine.set_amount("2500").unwrap();

        assert!(engine.cancel_confirmation().is_err());

        engine.initiate_swap().unwrap();
        engine.confirm().unwrap();
        assert!(engine.cancel_confirmation().is_err());

        sleep_ms(1600).await;
        assert_eq!(engine.phase(), SwapPhase::Settled);
        assert!(engine.cancel_confirmation().is_err());

        sleep_ms(4200).await;
        assert_eq!(engine.phase(), SwapPhase::Ready);
        assert_eq!(engine.view().amount, "");
        assert_eq!(engine.metrics().swaps_cancelled, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_skipped_before_start() {
        let source = Arc::new(ScriptedPriceSource::new("test"));
        source.push_records(prices(2500.0));
        let engine = engine_with(source.clone(), SwapConfig::default());

        assert_eq!(engine.refresh().await.unwrap(), FetchApplied::Ignored);
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_http_engine_rejects_bad_config() {
        let mut config = SwapConfig::default();
        config.price_source.url = String::new();

        assert!(SwapEngine::with_http_source(config).is_err());
    }
}
