//! Swap session phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a swap session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPhase {
    /// Session created, prices not requested yet.
    Idle,
    /// A user-visible price fetch is in flight.
    Loading,
    /// Form is editable.
    Ready,
    /// An action is checking the amount.
    Validating,
    /// Waiting for the user to confirm a frozen swap.
    Confirming,
    /// Swap confirmed; settlement is pending.
    Executing,
    /// Swap settled; waiting for the form to reset.
    Settled,
    /// No prices could be loaded.
    Error,
}

impl SwapPhase {
    /// Get valid next phases from the current one.
    pub fn valid_transitions(&self) -> &[SwapPhase] {
        match self {
            SwapPhase::Idle => &[SwapPhase::Loading],
            SwapPhase::Loading => &[SwapPhase::Ready, SwapPhase::Error],
            SwapPhase::Ready => &[SwapPhase::Loading, SwapPhase::Validating],
            SwapPhase::Validating => &[SwapPhase::Ready, SwapPhase::Confirming],
            SwapPhase::Confirming => &[SwapPhase::Ready, SwapPhase::Executing],
            SwapPhase::Executing => &[SwapPhase::Settled],
            SwapPhase::Settled => &[SwapPhase::Ready],
            SwapPhase::Error => &[SwapPhase::Loading],
        }
    }

    /// Check if transition to given phase is valid.
    pub fn can_transition_to(&self, next: SwapPhase) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Check if the form accepts currency and amount edits.
    pub fn accepts_edits(&self) -> bool {
        matches!(self, SwapPhase::Ready)
    }

    /// Check if the session is waiting on something and rejects user actions.
    pub fn is_busy(&self) -> bool {
        matches!(self, SwapPhase::Loading | SwapPhase::Executing)
    }

    /// Check if a user retry may start a fetch.
    pub fn can_retry(&self) -> bool {
        matches!(self, SwapPhase::Ready | SwapPhase::Error)
    }

    /// Check if a background refresh may run. Only sessions that hold
    /// prices qualify; `Error` recovers through a user retry.
    pub fn accepts_refresh(&self) -> bool {
        !matches!(
            self,
            SwapPhase::Idle | SwapPhase::Loading | SwapPhase::Error
        )
    }
}

impl fmt::Display for SwapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwapPhase::Idle => "idle",
            SwapPhase::Loading => "loading",
            SwapPhase::Ready => "ready",
            SwapPhase::Validating => "validating",
            SwapPhase::Confirming => "confirming",
            SwapPhase::Executing => "executing",
            SwapPhase::Settled => "settled",
            SwapPhase::Error => "error",
        };
        f.write_str(name)
    }
}
