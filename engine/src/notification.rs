//! Success notifications raised when a swap settles.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use swapdesk_common::format::{format_amount, FormatOptions};
use swapdesk_common::{expires_in, is_expired, now, Currency, NotificationId, Timestamp};

use crate::confirmation::SwapConfirmation;
use crate::validator::parse_amount;

/// Payload of the "swap successful" notification.
///
/// Built from the confirmation at settlement time, so clearing the form
/// afterwards does not change what the notification says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessNotification {
    pub id: NotificationId,
    pub amount: String,
    pub from: Currency,
    pub receive_amount: String,
    pub to: Currency,
    pub raised_at: Timestamp,
    /// When the notification hides itself.
    pub expires_at: Timestamp,
}

impl SuccessNotification {
    /// Raise a notification for a settled confirmation.
    pub fn from_confirmation(confirmation: &SwapConfirmation, duration: Duration) -> Self {
        Self {
            id: NotificationId::new(),
            amount: confirmation.amount.clone(),
            from: confirmation.from.clone(),
            receive_amount: confirmation.receive_amount.clone(),
            to: confirmation.to.clone(),
            raised_at: now(),
            expires_at: expires_in(duration),
        }
    }

    /// Human-readable summary using display formatting.
    pub fn message(&self) -> String {
        let options = FormatOptions::default();
        format!(
            "Swapped {} {} for {} {}",
            display(&self.amount, &options),
            self.from,
            display(&self.receive_amount, &options),
            self.to
        )
    }

    pub fn is_expired(&self) -> bool {
        is_expired(self.expires_at)
    }
}

fn display(raw: &str, options: &FormatOptions) -> String {
    format_amount(parse_amount(raw).unwrap_or(f64::NAN), options)
}
