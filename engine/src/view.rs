//! Read-only session view for the presentation layer.

use serde::{Deserialize, Serialize};
use swapdesk_common::format::format_rate;
use swapdesk_common::{FetchGeneration, PriceQuote, SessionId};

use crate::confirmation::SwapConfirmation;
use crate::notification::SuccessNotification;
use crate::session::SwapSession;
use crate::state::SwapPhase;

/// Price fetch failure banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchBanner {
    pub message: String,
    pub code: String,
    pub retry_count: u32,
    /// Whether a retry button should be offered right now.
    pub can_retry: bool,
}

/// Everything a renderer needs, captured after a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub phase: SwapPhase,
    pub busy: bool,
    /// Selectable currencies in ingestion order.
    pub currencies: Vec<PriceQuote>,
    pub prices_generation: FetchGeneration,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub receive_amount: String,
    pub rate: Option<f64>,
    pub rate_display: Option<String>,
    pub show_validation: bool,
    pub validation_message: String,
    pub banner: Option<FetchBanner>,
    pub confirmation: Option<SwapConfirmation>,
    pub notification: Option<SuccessNotification>,
}

impl SessionView {
    pub fn from_session(session: &SwapSession) -> Self {
        let from = session
            .from_currency()
            .map(|c| c.symbol().to_string())
            .unwrap_or_default();
        let to = session
            .to_currency()
            .map(|c| c.symbol().to_string())
            .unwrap_or_default();
        let rate = session.rate();

        Self {
            session_id: session.id(),
            phase: session.phase(),
            busy: session.is_busy(),
            currencies: session.snapshot().quotes().to_vec(),
            prices_generation: session.snapshot().generation(),
            rate_display: rate.map(|r| format_rate(r, &from, &to)),
            from,
            to,
            amount: session.amount().to_string(),
            receive_amount: session.receive_amount().to_string(),
            rate,
            show_validation: session.show_validation(),
            validation_message: session.validation_message().to_string(),
            banner: session.fetch_error().map(|e| FetchBanner {
                message: e.user_message(),
                code: e.error_code().to_string(),
                retry_count: e.retry_count(),
                can_retry: e.is_retryable() && session.phase().can_retry(),
            }),
            confirmation: session.confirmation().cloned(),
            notification: session.notification().cloned(),
        }
    }

    /// One-line rendering for logs.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "[{}] {} {} -> {} {}",
            self.phase,
            or_dash(&self.amount),
            or_dash(&self.from),
            or_dash(&self.receive_amount),
            or_dash(&self.to)
        );
        if let Some(rate) = &self.rate_display {
            line.push_str(&format!(" ({})", rate));
        }
        if self.show_validation && !self.validation_message.is_empty() {
            line.push_str(&format!(" !{}", self.validation_message));
        }
        if let Some(banner) = &self.banner {
            line.push_str(&format!(" [{}]", banner.message));
        }
        if let Some(notification) = &self.notification {
            line.push_str(&format!(" <{}>", notification.message()));
        }
        line
    }
}

impl From<&SwapSession> for SessionView {
    fn from(session: &SwapSession) -> Self {
        Self::from_session(session)
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use swapdesk_common::RawPriceRecord;
    use swapdesk_pricing::{FetchError, PriceSnapshot};

    fn loaded_session() -> SwapSession {
        let mut session = SwapSession::new();
        session.begin_loading().unwrap();
        session
            .apply_fetch_outcome(Ok(Arc::new(PriceSnapshot::from_records(
                vec![
                    RawPriceRecord::new("USD", 1.0, "2023-08-29T07:10:40.000Z"),
                    RawPriceRecord::new("ETH", 2500.0, "2023-08-29T07:10:40.000Z"),
                ],
                FetchGeneration::new(1),
            ))))
            .unwrap();
        session
    }

    #[test]
    fn test_view_reflects_form() {
        let mut session = loaded_session();
        session.select_from("USD").unwrap();
        session.select_to("ETH").unwrap();
        session.set_amount("2500").unwrap();

        let view = SessionView::from_session(&session);

        assert_eq!(view.phase, SwapPhase::Ready);
        assert!(!view.busy);
        assert_eq!(view.currencies.len(), 2);
        assert_eq!(view.receive_amount, "1.000000");
        assert_eq!(view.rate_display.as_deref(), Some("1 USD = 0.0004 ETH"));
        assert_eq!(view.summary(), "[ready] 2500 USD -> 1.000000 ETH (1 USD = 0.0004 ETH)");
    }

    #[test]
    fn test_banner_after_failure() {
        let mut session = loaded_session();
        session.begin_loading().unwrap();
        session
            .apply_fetch_outcome(Err(FetchError::Network {
                generation: FetchGeneration::new(2),
                message: "connection refused".to_string(),
                retry_count: 2,
            }))
            .unwrap();

        let view = SessionView::from(&session);
        let banner = view.banner.unwrap();

        assert_eq!(
            banner.message,
            "Failed to fetch prices. Please check your connection. (Retry 1)"
        );
        assert_eq!(banner.retry_count, 2);
        assert!(banner.can_retry);
    }

    #[test]
    fn test_view_serializes() {
        let view = SessionView::from_session(&loaded_session());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["phase"], "ready");
        assert_eq!(json["currencies"][1]["currency"], "ETH");
    }
}
