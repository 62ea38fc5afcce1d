//! Simulation scenarios.

use serde::{Deserialize, Serialize};
use swapdesk_engine::SwapPhase;

/// A scripted user journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioStep {
    SelectFrom { symbol: String },
    SelectTo { symbol: String },
    /// Type into the amount field; the input is sanitized first.
    EnterAmount { raw: String },
    SwapPositions,
    InitiateSwap,
    Confirm,
    Cancel,
    DismissNotification,
    Retry,
    /// Make the simulated source fail its next fetches.
    InjectFailures { count: u32 },
    /// Wait (scaled by the simulation speed).
    Wait { millis: u64 },
    /// Check the session phase.
    ExpectPhase { phase: SwapPhase },
    /// Check the inline validation message.
    ExpectValidation { message: String },
}

impl ScenarioStep {
    fn select_from(symbol: &str) -> Self {
        ScenarioStep::SelectFrom {
            symbol: symbol.to_string(),
        }
    }

    fn select_to(symbol: &str) -> Self {
        ScenarioStep::SelectTo {
            symbol: symbol.to_string(),
        }
    }

    fn amount(raw: &str) -> Self {
        ScenarioStep::EnterAmount {
            raw: raw.to_string(),
        }
    }

    fn expect(phase: SwapPhase) -> Self {
        ScenarioStep::ExpectPhase { phase }
    }
}

impl Scenario {
    /// Names accepted by [`Scenario::load`].
    pub const NAMES: [&'static str; 4] =
        ["happy-path", "invalid-amount", "flaky-source", "position-swap"];

    /// Load a scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "happy-path" => Ok(Self::happy_path()),
            "invalid-amount" => Ok(Self::invalid_amount()),
            "flaky-source" => Ok(Self::flaky_source()),
            "position-swap" => Ok(Self::position_swap()),
            _ => Err(anyhow::anyhow!(
                "Unknown scenario: {} (expected one of: {})",
                name,
                Self::NAMES.join(", ")
            )),
        }
    }

    /// Swap USD to ETH and watch it settle and reset.
    fn happy_path() -> Self {
        Self {
            name: "happy-path".to_string(),
            description: "Confirm a USD to ETH swap and wait for reset".to_string(),
            steps: vec![
                ScenarioStep::expect(SwapPhase::Ready),
                ScenarioStep::select_from("USD"),
                ScenarioStep::select_to("ETH"),
                ScenarioStep::amount("2,500"),
                ScenarioStep::InitiateSwap,
                ScenarioStep::expect(SwapPhase::Confirming),
                ScenarioStep::Confirm,
                ScenarioStep::expect(SwapPhase::Executing),
                ScenarioStep::Wait { millis: 1600 },
                ScenarioStep::expect(SwapPhase::Settled),
                ScenarioStep::Wait { millis: 4200 },
                ScenarioStep::expect(SwapPhase::Ready),
            ],
        }
    }

    /// Every validation message, then a cancelled confirmation.
    fn invalid_amount() -> Self {
        Self {
            name: "invalid-amount".to_string(),
            description: "Try empty, zero and oversized amounts".to_string(),
            steps: vec![
                ScenarioStep::select_from("ATOM"),
                ScenarioStep::select_to("OSMO"),
                ScenarioStep::InitiateSwap,
                ScenarioStep::ExpectValidation {
                    message: "Amount is required".to_string(),
                },
                ScenarioStep::amount("0"),
                ScenarioStep::InitiateSwap,
                ScenarioStep::ExpectValidation {
                    message: "Amount must be greater than 0".to_string(),
                },
                ScenarioStep::amount("2000000"),
                ScenarioStep::InitiateSwap,
                ScenarioStep::ExpectValidation {
                    message: "Amount is too large".to_string(),
                },
                ScenarioStep::amount("1.2.3"),
                ScenarioStep::amount("12.5"),
                ScenarioStep::InitiateSwap,
                ScenarioStep::expect(SwapPhase::Confirming),
                ScenarioStep::Cancel,
                ScenarioStep::expect(SwapPhase::Ready),
            ],
        }
    }

    /// Fail twice, then recover through retries.
    fn flaky_source() -> Self {
        Self {
            name: "flaky-source".to_string(),
            description: "Price fetch failures with retry and stale data".to_string(),
            steps: vec![
                ScenarioStep::expect(SwapPhase::Ready),
                ScenarioStep::select_from("WBTC"),
                ScenarioStep::select_to("USDC"),
                ScenarioStep::amount("0.5"),
                ScenarioStep::InjectFailures { count: 2 },
                ScenarioStep::Retry,
                ScenarioStep::expect(SwapPhase::Ready),
                ScenarioStep::Retry,
                ScenarioStep::expect(SwapPhase::Ready),
                ScenarioStep::Retry,
                ScenarioStep::InitiateSwap,
                ScenarioStep::Confirm,
                ScenarioStep::Wait { millis: 1600 },
                ScenarioStep::DismissNotification,
                ScenarioStep::Wait { millis: 4200 },
                ScenarioStep::expect(SwapPhase::Ready),
            ],
        }
    }

    /// Swap positions with a valid and an invalid amount.
    fn position_swap() -> Self {
        Self {
            name: "position-swap".to_string(),
            description: "Exchange currencies, blocked by an invalid amount".to_string(),
            steps: vec![
                ScenarioStep::select_from("USD"),
                ScenarioStep::select_to("ETH"),
                ScenarioStep::amount("100"),
                ScenarioStep::SwapPositions,
                ScenarioStep::amount(""),
                ScenarioStep::SwapPositions,
                ScenarioStep::ExpectValidation {
                    message: "Amount is required".to_string(),
                },
                ScenarioStep::amount("3"),
                ScenarioStep::ExpectValidation {
                    message: String::new(),
                },
                ScenarioStep::SwapPositions,
                ScenarioStep::expect(SwapPhase::Ready),
            ],
        }
    }
}
