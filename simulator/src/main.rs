//! SwapDesk Simulator
//!
//! Drives a swap session from the command line, against the live price feed
//! or a simulated market with injectable failures.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use swapdesk_engine::SwapConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod market;
mod metrics;
mod scenario;

use controller::SimulationController;
use market::SimulatedPriceSource;
use scenario::Scenario;

/// SwapDesk Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "SwapDesk swap session simulator")]
struct Args {
    /// Scenario to run (happy-path, invalid-amount, flaky-source, position-swap)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Use the live HTTP price feed instead of the simulated market
    #[arg(long)]
    live: bool,

    /// Simulation speed multiplier
    #[arg(long, default_value = "1.0", value_parser = parse_speed)]
    speed: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a simulated price fetch fails
    #[arg(long, default_value = "0.0", value_parser = parse_probability)]
    failure_rate: f64,

    /// Simulated price fetch latency in milliseconds
    #[arg(long, default_value = "150")]
    latency_ms: u64,

    /// Background price refresh period in milliseconds (0 = off)
    #[arg(long, default_value = "0")]
    refresh_ms: u64,

    /// Watch duration in seconds when no scenario is given (0 = until Ctrl+C)
    #[arg(long, default_value = "0")]
    duration: u64,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

fn parse_speed(raw: &str) -> Result<f64, String> {
    let speed: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err("speed must be a positive number".to_string())
    }
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let p: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err("failure rate must be between 0 and 1".to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    if args.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    info!("Starting SwapDesk Simulator");
    info!("Source: {}", if args.live { "live" } else { "simulated" });
    info!("Speed: {}x", args.speed);

    let mut config = SwapConfig::from_env();
    if args.refresh_ms > 0 {
        config.refresh_interval = Some(Duration::from_millis(args.refresh_ms));
    }
    let config = config.scaled(args.speed);

    let market = (!args.live).then(|| {
        Arc::new(SimulatedPriceSource::new(
            args.seed,
            args.failure_rate,
            Duration::from_millis(args.latency_ms),
        ))
    });

    let mut controller = SimulationController::new(config, market, args.speed)?;
    controller.initialize().await?;

    if let Some(scenario_name) = &args.scenario {
        let scenario = Scenario::load(scenario_name)?;
        controller.run_scenario(&scenario).await?;
    } else {
        info!("Running in watch mode");
        info!("Press Ctrl+C to stop");

        let duration = if args.duration > 0 {
            Some(Duration::from_secs(args.duration))
        } else {
            None
        };

        controller.run(duration).await?;
    }

    controller.shutdown();

    // Print metrics
    let metrics = controller.metrics();
    info!("Simulation complete");
    info!("Steps: {}", metrics.steps_total);
    info!("Rejected actions: {}", metrics.actions_rejected);
    info!("Rejected edits: {}", metrics.edits_rejected);
    info!(
        "Expectations: {} met, {} failed",
        metrics.expectations_met, metrics.expectations_failed
    );
    info!("Average step: {}ms", metrics.average_step_ms());
    info!(
        "Engine metrics: {}",
        serde_json::to_string(&controller.engine_metrics())?
    );

    if !metrics.all_expectations_met() {
        anyhow::bail!("{} scenario expectations failed", metrics.expectations_failed);
    }

    Ok(())
}
