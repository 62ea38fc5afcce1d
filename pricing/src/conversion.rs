//! Cross-rate derivation and amount conversion.

use serde::{Deserialize, Serialize};
use swapdesk_common::Currency;

use crate::snapshot::PriceSnapshot;

/// Decimal places of a receive amount.
pub const RECEIVE_AMOUNT_DECIMALS: usize = 6;

/// Units of `to` obtained for one unit of `from`.
///
/// Returns `None` when either symbol is empty or unknown, or when the result
/// is not finite. Unknown symbols price at zero, so this never divides by zero.
pub fn rate(from: &str, to: &str, snapshot: &PriceSnapshot) -> Option<f64> {
    if from.is_empty() || to.is_empty() {
        return None;
    }

    let from_price = snapshot.price(from);
    let to_price = snapshot.price(to);
    if from_price <= 0.0 || to_price <= 0.0 {
        return None;
    }

    let rate = from_price / to_price;
    rate.is_finite().then_some(rate)
}

/// Convert `amount` units of `from` into `to`.
pub fn convert(amount: f64, from: &str, to: &str, snapshot: &PriceSnapshot) -> Option<f64> {
    if !amount.is_finite() {
        return None;
    }
    rate(from, to, snapshot)?;
    let result = amount * snapshot.price(from) / snapshot.price(to);
    result.is_finite().then_some(result)
}

/// Render a receive amount with exactly [`RECEIVE_AMOUNT_DECIMALS`] places.
pub fn format_fixed(value: f64) -> String {
    format!("{:.*}", RECEIVE_AMOUNT_DECIMALS, value)
}

/// A priced conversion, captured at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub from: Currency,
    pub to: Currency,
    pub amount: f64,
    pub rate: f64,
    pub receive_amount: f64,
}

impl Conversion {
    /// Receive amount as shown to the user.
    pub fn receive_amount_fixed(&self) -> String {
        format_fixed(self.receive_amount)
    }

    /// Check if either leg names the given symbol.
    pub fn involves(&self, symbol: &str) -> bool {
        self.from.symbol() == symbol || self.to.symbol() == symbol
    }
}

/// Price a conversion against a snapshot.
pub fn quote(amount: f64, from: &str, to: &str, snapshot: &PriceSnapshot) -> Option<Conversion> {
    let rate = rate(from, to, snapshot)?;
    let receive_amount = convert(amount, from, to, snapshot)?;

    Some(Conversion {
        from: Currency::new(from),
        to: Currency::new(to),
        amount,
        rate,
        receive_amount,
    })
}
