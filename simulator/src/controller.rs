//! Simulation controller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use swapdesk_common::scaled;
use swapdesk_engine::{
    sanitize_amount_input, MetricsSnapshot, SwapConfig, SwapEngine, SwapError, SwapResult,
};
use tracing::{info, warn};

use crate::market::SimulatedPriceSource;
use crate::metrics::SimulationMetrics;
use crate::scenario::{Scenario, ScenarioStep};

/// Controls the simulation.
pub struct SimulationController {
    /// The session under simulation.
    engine: SwapEngine,
    /// Simulated market, absent when running against the live feed.
    market: Option<Arc<SimulatedPriceSource>>,
    /// Simulation speed multiplier.
    speed: f64,
    /// Simulation metrics.
    metrics: SimulationMetrics,
}

impl SimulationController {
    /// Create a controller. Without a market, prices come from the configured URL.
    pub fn new(
        config: SwapConfig,
        market: Option<Arc<SimulatedPriceSource>>,
        speed: f64,
    ) -> anyhow::Result<Self> {
        let engine = match &market {
            Some(market) => {
                config.validate()?;
                SwapEngine::new(config, market.clone())
            }
            None => SwapEngine::with_http_source(config)?,
        };

        Ok(Self {
            engine,
            market,
            speed,
            metrics: SimulationMetrics::new(),
        })
    }

    /// Load the first prices.
    pub async fn initialize(&mut self) -> anyhow::Result<()> {
        info!(session_id = %self.engine.session_id(), "Initializing swap session");

        self.engine.start().await?;
        self.log_view("start");

        Ok(())
    }

    /// Run a scenario.
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> anyhow::Result<()> {
        info!("Running scenario: {} - {}", scenario.name, scenario.description);

        for step in &scenario.steps {
            let started = Instant::now();
            self.execute_step(step).await?;
            if !matches!(step, ScenarioStep::Wait { .. }) {
                self.metrics.record_step(started.elapsed().as_millis() as u64);
            }
        }

        Ok(())
    }

    /// Log every view change until `duration` passes or Ctrl+C.
    pub async fn run(&mut self, duration: Option<Duration>) -> anyhow::Result<()> {
        info!("Watching session");

        let mut views = self.engine.subscribe();
        let deadline = async {
            match duration {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = views.borrow_and_update().clone();
                    info!(generation = %view.prices_generation, "{}", view.summary());
                }
                _ = &mut deadline => break,
                result = tokio::signal::ctrl_c() => {
                    result?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Execute a single scenario step.
    async fn execute_step(&mut self, step: &ScenarioStep) -> anyhow::Result<()> {
        match step {
            ScenarioStep::SelectFrom { symbol } => {
                let result = self.engine.select_from(symbol);
                self.finish_action("select from", result);
            }
            ScenarioStep::SelectTo { symbol } => {
                let result = self.engine.select_to(symbol);
                self.finish_action("select to", result);
            }
            ScenarioStep::EnterAmount { raw } => match sanitize_amount_input(raw) {
                Some(cleaned) => {
                    let result = self.engine.set_amount(&cleaned);
                    self.finish_action("enter amount", result);
                }
                None => {
                    warn!(input = %raw, "Amount edit rejected by sanitizer");
                    self.metrics.record_rejected_edit();
                }
            },
            ScenarioStep::SwapPositions => {
                let result = self.engine.swap_positions();
                self.finish_action("swap positions", result);
            }
            ScenarioStep::InitiateSwap => {
                let result = self.engine.initiate_swap();
                if let Ok(confirmation) = &result {
                    info!(
                        "Confirm {} {} for {} {} at {}",
                        confirmation.amount,
                        confirmation.from,
                        confirmation.receive_amount,
                        confirmation.to,
                        confirmation.rate_display()
                    );
                }
                self.finish_action("initiate swap", result);
            }
            ScenarioStep::Confirm => {
                let result = self.engine.confirm();
                self.finish_action("confirm", result);
            }
            ScenarioStep::Cancel => {
                let result = self.engine.cancel_confirmation();
                self.finish_action("cancel", result);
            }
            ScenarioStep::DismissNotification => {
                let result = self.engine.dismiss_notification();
                self.finish_action("dismiss notification", result);
            }
            ScenarioStep::Retry => {
                let result = self.engine.retry().await;
                self.finish_action("retry", result);
            }
            ScenarioStep::InjectFailures { count } => match &self.market {
                Some(market) => {
                    info!("Injecting {} price fetch failures", count);
                    market.fail_next(*count);
                }
                None => warn!("Fault injection needs the simulated market; skipping"),
            },
            ScenarioStep::Wait { millis } => {
                let delay = scaled(Duration::from_millis(*millis), self.speed);
                info!("Waiting {}ms (adjusted: {}ms)", millis, delay.as_millis());
                tokio::time::sleep(delay).await;
                self.log_view("wait");
            }
            ScenarioStep::ExpectPhase { phase } => {
                let actual = self.engine.phase();
                self.check(actual == *phase, format!("phase {} (actual {})", phase, actual));
            }
            ScenarioStep::ExpectValidation { message } => {
                let actual = self.engine.view().validation_message;
                self.check(
                    actual == *message,
                    format!("validation {:?} (actual {:?})", message, actual),
                );
            }
        }

        Ok(())
    }

    fn finish_action<T>(&mut self, action: &str, result: SwapResult<T>) {
        if let Err(e) = result {
            self.report_rejection(action, &e);
        }
        self.log_view(action);
    }

    fn report_rejection(&mut self, action: &str, error: &SwapError) {
        warn!(action, code = error.error_code(), "Rejected: {}", error);
        self.metrics.record_rejection();
    }

    fn check(&mut self, held: bool, description: String) {
        if held {
            info!("Expectation met: {}", description);
        } else {
            warn!("Expectation failed: {}", description);
        }
        self.metrics.record_expectation(held);
    }

    fn log_view(&self, after: &str) {
        info!(after, "{}", self.engine.view().summary());
    }

    /// Get simulation metrics.
    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    /// Get the engine's own counters.
    pub fn engine_metrics(&self) -> MetricsSnapshot {
        self.engine.metrics()
    }

    /// Stop the session's timers.
    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}
