//! Display formatting for amounts and rates.
//!
//! Presentation only: nothing in the engine parses these strings back or uses
//! them for arithmetic. Output follows en-US conventions (`,` thousands
//! separator, `.` decimal point).

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Options for [`format_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Minimum number of fraction digits (zero-padded).
    pub min_fraction_digits: u32,
    /// Maximum number of fraction digits (rounded half away from zero).
    pub max_fraction_digits: u32,
    /// Whether to insert thousands separators.
    pub use_grouping: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            min_fraction_digits: 0,
            max_fraction_digits: 8,
            use_grouping: true,
        }
    }
}

impl FormatOptions {
    /// Fixed number of fraction digits.
    pub fn fixed(digits: u32) -> Self {
        Self {
            min_fraction_digits: digits,
            max_fraction_digits: digits,
            ..Self::default()
        }
    }

    pub fn without_grouping(mut self) -> Self {
        self.use_grouping = false;
        self
    }
}

/// Format a numeric amount for display. Non-finite values render as `"0"`.
pub fn format_amount(value: f64, options: &FormatOptions) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    // Rust's float Display is the shortest round-trip form, which keeps
    // 1645.93 as 1645.93 instead of its binary expansion.
    let decimal = match value
        .to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_f64(value))
    {
        Some(d) => d,
        None => return "0".to_string(),
    };

    format_decimal(decimal, options)
}

/// Format a decimal amount for display.
pub fn format_decimal(value: Decimal, options: &FormatOptions) -> String {
    let max = options.max_fraction_digits.max(options.min_fraction_digits);
    let rounded = value
        .round_dp_with_strategy(max, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (digits, String::new()),
    };

    let mut frac = frac_part;
    while (frac.len() as u32) < options.min_fraction_digits {
        frac.push('0');
    }

    let int_part = if options.use_grouping {
        group_thousands(&int_part)
    } else {
        int_part
    };

    let mut out = String::with_capacity(int_part.len() + frac.len() + 2);
    if negative {
        out.push('-');
    }
    out.push_str(&int_part);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(&frac);
    }
    out
}

/// Render an exchange rate as `1 FROM = x TO`.
pub fn format_rate(rate: f64, from: &str, to: &str) -> String {
    format!(
        "1 {} = {} {}",
        from,
        format_amount(rate, &FormatOptions::default()),
        to
    )
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
