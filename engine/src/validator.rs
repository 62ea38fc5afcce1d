//! Amount validation and input sanitizing.

use serde::{Deserialize, Serialize};

/// Largest amount a single swap may send.
pub const MAX_AMOUNT: f64 = 1_000_000.0;

pub const AMOUNT_REQUIRED: &str = "Amount is required";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount must be greater than 0";
pub const AMOUNT_TOO_LARGE: &str = "Amount is too large";

/// Outcome of validating a raw amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Empty when valid.
    pub message: String,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Validate a raw amount string. The first failing rule wins.
pub fn validate(raw: &str) -> ValidationResult {
    if raw.trim().is_empty() {
        return ValidationResult::invalid(AMOUNT_REQUIRED);
    }

    let amount = match parse_amount(raw) {
        Some(amount) if amount > 0.0 => amount,
        _ => return ValidationResult::invalid(AMOUNT_NOT_POSITIVE),
    };

    if amount > MAX_AMOUNT {
        return ValidationResult::invalid(AMOUNT_TOO_LARGE);
    }

    ValidationResult::ok()
}

/// Parse a raw amount as a finite number. Surrounding whitespace is ignored.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Clean a keystroke-level amount edit.
///
/// Everything except digits and `.` is stripped. An edit that still holds
/// more than one decimal point is rejected and the caller keeps the previous
/// amount.
pub fn sanitize_amount_input(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.matches('.').count() > 1 {
        return None;
    }
    Some(cleaned)
}
