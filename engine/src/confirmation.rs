//! Frozen swap confirmations.

use serde::{Deserialize, Serialize};
use swapdesk_common::format::format_rate;
use swapdesk_common::{now, ConfirmationId, Currency, Timestamp};
use swapdesk_pricing::Conversion;

/// The terms of a swap as shown in the confirm dialog.
///
/// Captured once when the user initiates the swap. Later price refreshes do
/// not touch it; settlement and the success notification use exactly these
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapConfirmation {
    /// Unique confirmation ID.
    pub id: ConfirmationId,
    pub from: Currency,
    pub to: Currency,
    /// Amount as the user typed it.
    pub amount: String,
    /// Receive amount, fixed to six decimals.
    pub receive_amount: String,
    /// Units of `to` per unit of `from`.
    pub rate: f64,
    pub created_at: Timestamp,
}

impl SwapConfirmation {
    /// Freeze a priced conversion.
    pub fn new(amount: impl Into<String>, conversion: &Conversion) -> Self {
        Self {
            id: ConfirmationId::new(),
            from: conversion.from.clone(),
            to: conversion.to.clone(),
            amount: amount.into(),
            receive_amount: conversion.receive_amount_fixed(),
            rate: conversion.rate,
            created_at: now(),
        }
    }

    /// Rate line for the confirm dialog, e.g. `1 USD = 0.0004 ETH`.
    pub fn rate_display(&self) -> String {
        format_rate(self.rate, self.from.symbol(), self.to.symbol())
    }

    /// Time since the confirmation was frozen.
    pub fn age(&self) -> chrono::Duration {
        now().signed_duration_since(self.created_at)
    }
}
