//! The swap session aggregate.
//!
//! `SwapSession` owns the form, the price snapshot it computes against and
//! the lifecycle phase. Every method is a synchronous transition; the async
//! engine wraps it in a lock and drives the timers and fetches around it.

use std::sync::Arc;
use std::time::Duration;

use swapdesk_common::{Currency, NotificationId, SessionId, TicketId};
use swapdesk_pricing::{quote, rate, Conversion, FetchError, FetchResult, PriceSnapshot};
use tracing::{debug, info, warn};

use crate::confirmation::SwapConfirmation;
use crate::error::{SwapError, SwapResult};
use crate::notification::SuccessNotification;
use crate::state::SwapPhase;
use crate::validator::{parse_amount, validate};

/// What a fetch result did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    /// New prices installed.
    Updated,
    /// Fetch failed; the banner is up and older prices (if any) remain.
    Failed,
    /// Result belonged to an older fetch and was ignored.
    Ignored,
}

/// A confirmed swap waiting to settle.
#[derive(Debug, Clone)]
struct PendingSettlement {
    ticket: TicketId,
    confirmation: SwapConfirmation,
}

/// Returned when a settlement completes.
#[derive(Debug, Clone)]
pub struct SettledSwap {
    pub notification: SuccessNotification,
    /// Ticket the form reset must present.
    pub reset_ticket: TicketId,
}

/// State of one user's swap form.
#[derive(Debug)]
pub struct SwapSession {
    id: SessionId,
    phase: SwapPhase,
    snapshot: Arc<PriceSnapshot>,
    from: Option<Currency>,
    to: Option<Currency>,
    amount: String,
    receive_amount: String,
    show_validation: bool,
    validation_message: String,
    fetch_error: Option<FetchError>,
    confirmation: Option<SwapConfirmation>,
    settlement: Option<PendingSettlement>,
    reset_ticket: Option<TicketId>,
    notification: Option<SuccessNotification>,
}

impl SwapSession {
    /// Create an idle session with no prices.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            phase: SwapPhase::Idle,
            snapshot: Arc::new(PriceSnapshot::empty()),
            from: None,
            to: None,
            amount: String::new(),
            receive_amount: String::new(),
            show_validation: false,
            validation_message: String::new(),
            fetch_error: None,
            confirmation: None,
            settlement: None,
            reset_ticket: None,
            notification: None,
        }
    }

    // --- Price loading ---

    /// Enter `Loading` ahead of a user-visible fetch (start or retry).
    pub fn begin_loading(&mut self) -> SwapResult<()> {
        self.transition(SwapPhase::Loading)
    }

    /// Apply the result of any fetch, user-initiated or background.
    ///
    /// A `Loading` session always leaves `Loading` on a real result: to
    /// `Ready` when prices are available, otherwise to `Error`. Other phases
    /// only pick up the new prices or the failure banner.
    pub fn apply_fetch_outcome(
        &mut self,
        outcome: FetchResult<Arc<PriceSnapshot>>,
    ) -> SwapResult<FetchApplied> {
        match outcome {
            Ok(snapshot) => {
                if snapshot.generation() < self.snapshot.generation() {
                    return Ok(FetchApplied::Ignored);
                }
                self.snapshot = snapshot;
                self.fetch_error = None;
                if self.phase == SwapPhase::Loading {
                    self.transition(SwapPhase::Ready)?;
                }
                self.recompute_receive_amount();
                info!(
                    session_id = %self.id,
                    generation = %self.snapshot.generation(),
                    quotes = self.snapshot.len(),
                    "Session prices updated"
                );
                Ok(FetchApplied::Updated)
            }
            Err(FetchError::Superseded { generation, latest }) => {
                debug!(
                    session_id = %self.id,
                    generation = %generation,
                    latest = %latest,
                    "Ignoring superseded fetch"
                );
                Ok(FetchApplied::Ignored)
            }
            Err(error) if error.generation() < self.snapshot.generation() => {
                debug!(
                    session_id = %self.id,
                    generation = %error.generation(),
                    current = %self.snapshot.generation(),
                    "Ignoring failure older than current prices"
                );
                Ok(FetchApplied::Ignored)
            }
            Err(error) => {
                warn!(
                    session_id = %self.id,
                    retry_count = error.retry_count(),
                    error = %error,
                    "Session price fetch failed"
                );
                self.fetch_error = Some(error);
                if self.phase == SwapPhase::Loading {
                    let next = if self.snapshot.is_empty() {
                        SwapPhase::Error
                    } else {
                        SwapPhase::Ready
                    };
                    self.transition(next)?;
                }
                Ok(FetchApplied::Failed)
            }
        }
    }

    // --- Form edits ---

    /// Select the currency to send. An empty symbol clears the selection.
    pub fn select_from(&mut self, symbol: &str) -> SwapResult<()> {
        self.ensure_editable("select currency")?;
        self.from = self.resolve_symbol(symbol)?;
        self.recompute_receive_amount();
        Ok(())
    }

    /// Select the currency to receive. An empty symbol clears the selection.
    pub fn select_to(&mut self, symbol: &str) -> SwapResult<()> {
        self.ensure_editable("select currency")?;
        self.to = self.resolve_symbol(symbol)?;
        self.recompute_receive_amount();
        Ok(())
    }

    /// Replace the raw amount.
    pub fn set_amount(&mut self, raw: &str) -> SwapResult<()> {
        self.ensure_editable("edit amount")?;
        self.amount = raw.to_string();
        if self.show_validation && !raw.is_empty() {
            self.validation_message.clear();
        }
        self.recompute_receive_amount();
        Ok(())
    }

    // --- Actions ---

    /// Exchange the two currencies, if the amount is valid.
    pub fn swap_positions(&mut self) -> SwapResult<()> {
        self.ensure_editable("swap positions")?;
        if self.from.is_none() || self.to.is_none() {
            return Err(SwapError::CurrencyNotSelected);
        }

        self.run_validation()?;

        std::mem::swap(&mut self.from, &mut self.to);
        self.transition(SwapPhase::Ready)?;
        self.recompute_receive_amount();
        Ok(())
    }

    /// Validate the form and freeze the swap terms for confirmation.
    pub fn initiate_swap(&mut self) -> SwapResult<SwapConfirmation> {
        self.ensure_editable("initiate swap")?;

        self.run_validation()?;

        let conversion = match self.priced_conversion() {
            Ok(conversion) => conversion,
            Err(e) => {
                self.transition(SwapPhase::Ready)?;
                return Err(e);
            }
        };

        let confirmation = SwapConfirmation::new(self.amount.clone(), &conversion);
        self.transition(SwapPhase::Confirming)?;
        info!(
            session_id = %self.id,
            confirmation_id = %confirmation.id.as_uuid(),
            from = %confirmation.from,
            to = %confirmation.to,
            amount = %confirmation.amount,
            receive_amount = %confirmation.receive_amount,
            "Swap awaiting confirmation"
        );
        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    /// Back out of the confirm dialog.
    pub fn cancel_confirmation(&mut self) -> SwapResult<()> {
        if self.phase != SwapPhase::Confirming {
            return Err(SwapError::ActionNotAllowed {
                action: "cancel confirmation",
                phase: self.phase,
            });
        }
        self.transition(SwapPhase::Ready)?;
        self.confirmation = None;
        debug!(session_id = %self.id, "Swap confirmation cancelled");
        Ok(())
    }

    /// Accept the frozen terms. Returns the ticket the settlement timer must present.
    pub fn confirm(&mut self) -> SwapResult<TicketId> {
        if self.phase != SwapPhase::Confirming {
            return Err(SwapError::InvalidTransition {
                from: self.phase,
                to: SwapPhase::Executing,
            });
        }
        let confirmation = self
            .confirmation
            .take()
            .ok_or(SwapError::InvalidTransition {
                from: self.phase,
                to: SwapPhase::Executing,
            })?;

        self.transition(SwapPhase::Executing)?;
        let ticket = TicketId::new();
        info!(
            session_id = %self.id,
            ticket = %ticket,
            "Swap confirmed, settling"
        );
        self.settlement = Some(PendingSettlement {
            ticket,
            confirmation,
        });
        Ok(ticket)
    }

    // --- Timer-driven transitions ---

    /// Finish the pending settlement and raise the success notification.
    pub fn complete_settlement(
        &mut self,
        ticket: TicketId,
        notification_duration: Duration,
    ) -> SwapResult<SettledSwap> {
        let pending = match self.settlement.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.settlement = other;
                return Err(SwapError::StaleTimer { timer: "settlement" });
            }
        };

        self.transition(SwapPhase::Settled)?;
        let notification =
            SuccessNotification::from_confirmation(&pending.confirmation, notification_duration);
        let reset_ticket = TicketId::new();
        self.reset_ticket = Some(reset_ticket);
        self.notification = Some(notification.clone());

        info!(
            session_id = %self.id,
            ticket = %ticket,
            notification_id = %notification.id,
            "Swap settled"
        );
        Ok(SettledSwap {
            notification,
            reset_ticket,
        })
    }

    /// Hide the success notification, if it is still the one given.
    pub fn dismiss_notification(&mut self, id: NotificationId) -> SwapResult<()> {
        match &self.notification {
            Some(current) if current.id == id => {
                self.notification = None;
                Ok(())
            }
            _ => Err(SwapError::StaleTimer {
                timer: "notification",
            }),
        }
    }

    /// Clear the form after a settled swap. Currency selections persist.
    pub fn reset_form(&mut self, ticket: TicketId) -> SwapResult<()> {
        if self.reset_ticket != Some(ticket) {
            return Err(SwapError::StaleTimer { timer: "reset" });
        }

        self.transition(SwapPhase::Ready)?;
        self.reset_ticket = None;
        self.amount.clear();
        self.receive_amount.clear();
        self.validation_message.clear();
        self.show_validation = false;
        debug!(session_id = %self.id, "Swap form reset");
        Ok(())
    }

    // --- Accessors ---

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SwapPhase {
        self.phase
    }

    pub fn snapshot(&self) -> &Arc<PriceSnapshot> {
        &self.snapshot
    }

    pub fn from_currency(&self) -> Option<&Currency> {
        self.from.as_ref()
    }

    pub fn to_currency(&self) -> Option<&Currency> {
        self.to.as_ref()
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Receive amount fixed to six decimals, or empty when it cannot be computed.
    pub fn receive_amount(&self) -> &str {
        &self.receive_amount
    }

    /// Current cross-rate between the selected currencies.
    pub fn rate(&self) -> Option<f64> {
        let from = self.from.as_ref()?;
        let to = self.to.as_ref()?;
        rate(from.symbol(), to.symbol(), &self.snapshot)
    }

    pub fn show_validation(&self) -> bool {
        self.show_validation
    }

    pub fn validation_message(&self) -> &str {
        &self.validation_message
    }

    pub fn fetch_error(&self) -> Option<&FetchError> {
        self.fetch_error.as_ref()
    }

    /// Terms in the confirm dialog, or being settled.
    pub fn confirmation(&self) -> Option<&SwapConfirmation> {
        self.confirmation
            .as_ref()
            .or(self.settlement.as_ref().map(|p| &p.confirmation))
    }

    pub fn notification(&self) -> Option<&SuccessNotification> {
        self.notification.as_ref()
    }

    pub fn settlement_ticket(&self) -> Option<TicketId> {
        self.settlement.as_ref().map(|p| p.ticket)
    }

    pub fn reset_ticket(&self) -> Option<TicketId> {
        self.reset_ticket
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    // --- Private methods ---

    fn transition(&mut self, next: SwapPhase) -> SwapResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(SwapError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        debug!(session_id = %self.id, from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
        Ok(())
    }

    fn ensure_editable(&self, action: &'static str) -> SwapResult<()> {
        if self.phase.accepts_edits() {
            Ok(())
        } else {
            Err(SwapError::ActionNotAllowed {
                action,
                phase: self.phase,
            })
        }
    }

    fn resolve_symbol(&self, symbol: &str) -> SwapResult<Option<Currency>> {
        let currency = Currency::new(symbol);
        if currency.is_empty() {
            return Ok(None);
        }
        if !self.snapshot.contains(currency.symbol()) {
            return Err(SwapError::UnknownCurrency(currency.symbol().to_string()));
        }
        Ok(Some(currency))
    }

    /// Ready -> Validating, then back to Ready if the amount is invalid.
    fn run_validation(&mut self) -> SwapResult<()> {
        self.transition(SwapPhase::Validating)?;
        self.show_validation = true;

        let result = validate(&self.amount);
        self.validation_message = result.message;
        if result.valid {
            return Ok(());
        }

        self.transition(SwapPhase::Ready)?;
        debug!(
            session_id = %self.id,
            message = %self.validation_message,
            "Amount rejected"
        );
        Err(SwapError::Validation {
            message: self.validation_message.clone(),
        })
    }

    fn priced_conversion(&self) -> SwapResult<Conversion> {
        let (from, to) = match (&self.from, &self.to) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(SwapError::CurrencyNotSelected),
        };
        let unavailable = || SwapError::RateUnavailable {
            from: from.symbol().to_string(),
            to: to.symbol().to_string(),
        };

        let amount = parse_amount(&self.amount).ok_or_else(unavailable)?;
        quote(amount, from.symbol(), to.symbol(), &self.snapshot).ok_or_else(unavailable)
    }

    fn recompute_receive_amount(&mut self) {
        self.receive_amount = self
            .live_conversion()
            .map(|c| c.receive_amount_fixed())
            .unwrap_or_default();
    }

    fn live_conversion(&self) -> Option<Conversion> {
        let from = self.from.as_ref()?;
        let to = self.to.as_ref()?;
        let amount = parse_amount(&self.amount).filter(|amount| *amount >= 0.0)?;
        quote(amount, from.symbol(), to.symbol(), &self.snapshot)
    }
}

impl Default for SwapSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{AMOUNT_NOT_POSITIVE, AMOUNT_REQUIRED};
    use swapdesk_common::{FetchGeneration, RawPriceRecord};

    const DATE: &str = "2023-08-29T07:10:40.000Z";

    fn snapshot(entries: &[(&str, f64)], generation: u64) -> Arc<PriceSnapshot> {
        Arc::new(PriceSnapshot::from_records(
            entries
                .iter()
                .map(|(c, p)| RawPriceRecord::new(*c, *p, DATE))
                .collect(),
            FetchGeneration::new(generation),
        ))
    }

    fn network_error(retry_count: u32) -> FetchError {
        FetchError::Network {
            generation: FetchGeneration::new(2),
            message: "connection refused".to_string(),
            retry_count,
        }
    }

    fn ready_session() -> SwapSession {
        let mut session = SwapSession::new();
        session.begin_loading().unwrap();
        session
            .apply_fetch_outcome(Ok(snapshot(&[("USD", 1.0), ("ETH", 2500.0), ("ATOM", 7.18)], 1)))
            .unwrap();
        session
    }

    fn filled_session(amount: &str) -> SwapSession {
        let mut session = ready_session();
        session.select_from("USD").unwrap();
        session.select_to("ETH").unwrap();
        session.set_amount(amount).unwrap();
        session
    }

    #[test]
    fn test_new_session_is_idle() {
        let mut session = SwapSession::new();

        assert_eq!(session.phase(), SwapPhase::Idle);
        assert!(session.snapshot().is_empty());
        assert!(matches!(
            session.select_from("USD"),
            Err(SwapError::ActionNotAllowed { phase: SwapPhase::Idle, .. })
        ));
    }

    #[test]
    fn test_load_success_enters_ready() {
        let session = ready_session();

        assert_eq!(session.phase(), SwapPhase::Ready);
        assert_eq!(session.snapshot().len(), 3);
        assert!(session.fetch_error().is_none());
    }

    #[test]
    fn test_load_failure_without_data_enters_error() {
        let mut session = SwapSession::new();
        session.begin_loading().unwrap();

        let applied = session.apply_fetch_outcome(Err(network_error(1))).unwrap();

        assert_eq!(applied, FetchApplied::Failed);
        assert_eq!(session.phase(), SwapPhase::Error);
        assert!(session.fetch_error().unwrap().is_retryable());

        // Retry re-enters Loading.
        session.begin_loading().unwrap();
        assert_eq!(session.phase(), SwapPhase::Loading);
    }

    #[test]
    fn test_load_failure_with_stale_data_stays_usable() {
        let mut session = filled_session("2500");
        session.begin_loading().unwrap();

        session.apply_fetch_outcome(Err(network_error(1))).unwrap();

        assert_eq!(session.phase(), SwapPhase::Ready);
        assert_eq!(session.receive_amount(), "1.000000");
        assert!(session.fetch_error().is_some());
    }

    #[test]
    fn test_superseded_fetch_is_ignored() {
        let mut session = ready_session();
        let applied = session
            .apply_fetch_outcome(Err(FetchError::Superseded {
                generation: FetchGeneration::new(1),
                latest: FetchGeneration::new(2),
            }))
            .unwrap();

        assert_eq!(applied, FetchApplied::Ignored);
        assert!(session.fetch_error().is_none());
    }

    #[test]
    fn test_older_snapshot_is_ignored() {
        let mut session = ready_session();
        session
            .apply_fetch_outcome(Ok(snapshot(&[("USD", 1.0), ("ETH", 3000.0)], 5)))
            .unwrap();

        let applied = session
            .apply_fetch_outcome(Ok(snapshot(&[("USD", 1.0), ("ETH", 1000.0)], 4)))
            .unwrap();

        assert_eq!(applied, FetchApplied::Ignored);
        assert_eq!(session.snapshot().price("ETH"), 3000.0);
    }

    #[test]
    fn test_edits_rejected_while_loading() {
        let mut session = SwapSession::new();
        session.begin_loading().unwrap();

        assert!(matches!(
            session.set_amount("5"),
            Err(SwapError::ActionNotAllowed { phase: SwapPhase::Loading, .. })
        ));
    }

    #[test]
    fn test_receive_amount_usd_to_eth() {
        let session = filled_session("2500");

        assert_eq!(session.rate(), Some(0.0004));
        assert_eq!(session.receive_amount(), "1.000000");
    }

    #[test]
    fn test_receive_amount_cleared_when_not_computable() {
        let mut session = filled_session("2500");

        session.set_amount("").unwrap();
        assert_eq!(session.receive_amount(), "");

        session.set_amount("abc").unwrap();
        assert_eq!(session.receive_amount(), "");

        session.set_amount("10").unwrap();
        session.select_to("").unwrap();
        assert_eq!(session.receive_amount(), "");
        assert_eq!(session.rate(), None);
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let mut session = ready_session();

        assert_eq!(
            session.select_from("LUNA"),
            Err(SwapError::UnknownCurrency("LUNA".to_string()))
        );
        assert!(session.from_currency().is_none());
    }

    #[test]
    fn test_symbols_are_trimmed() {
        let mut session = ready_session();
        session.select_from("  ATOM ").unwrap();

        assert_eq!(session.from_currency().unwrap().symbol(), "ATOM");
    }

    #[test]
    fn test_swap_positions() {
        let mut session = filled_session("2500");

        session.swap_positions().unwrap();

        assert_eq!(session.from_currency().unwrap().symbol(), "ETH");
        assert_eq!(session.to_currency().unwrap().symbol(), "USD");
        assert_eq!(session.amount(), "2500");
        assert_eq!(session.receive_amount(), "6250000.000000");
        assert_eq!(session.phase(), SwapPhase::Ready);
        assert!(session.show_validation());
    }

    #[test]
    fn test_swap_positions_with_invalid_amount() {
        let mut session = filled_session("0");

        let err = session.swap_positions().unwrap_err();

        assert_eq!(
            err,
            SwapError::Validation {
                message: AMOUNT_NOT_POSITIVE.to_string()
            }
        );
        assert_eq!(session.from_currency().unwrap().symbol(), "USD");
        assert_eq!(session.to_currency().unwrap().symbol(), "ETH");
        assert_eq!(session.validation_message(), AMOUNT_NOT_POSITIVE);
        assert_eq!(session.phase(), SwapPhase::Ready);
    }

    #[test]
    fn test_swap_positions_requires_both_currencies() {
        let mut session = ready_session();
        session.select_from("USD").unwrap();

        assert_eq!(session.swap_positions(), Err(SwapError::CurrencyNotSelected));
        assert!(!session.show_validation());
    }

    #[test]
    fn test_typing_clears_stale_validation_message() {
        let mut session = filled_session("");
        assert!(session.initiate_swap().is_err());
        assert_eq!(session.validation_message(), AMOUNT_REQUIRED);

        session.set_amount("5").unwrap();

        assert!(session.validation_message().is_empty());
        assert!(session.show_validation());
    }

    #[test]
    fn test_initiate_requires_currencies() {
        let mut session = ready_session();
        session.set_amount("10").unwrap();

        assert_eq!(session.initiate_swap(), Err(SwapError::CurrencyNotSelected));
        assert_eq!(session.phase(), SwapPhase::Ready);
    }

    #[test]
    fn test_cancel_discards_confirmation() {
        let mut session = filled_session("2500");
        session.initiate_swap().unwrap();
        assert_eq!(session.phase(), SwapPhase::Confirming);

        session.cancel_confirmation().unwrap();

        assert_eq!(session.phase(), SwapPhase::Ready);
        assert!(session.confirmation().is_none());
        assert_eq!(session.amount(), "2500");
    }

    #[test]
    fn test_cancel_outside_confirming_is_rejected() {
        let mut loading = SwapSession::new();
        loading.begin_loading().unwrap();
        assert_eq!(
            loading.cancel_confirmation(),
            Err(SwapError::ActionNotAllowed {
                action: "cancel confirmation",
                phase: SwapPhase::Loading
            })
        );
        assert_eq!(loading.phase(), SwapPhase::Loading);

        let mut session = filled_session("2500");
        session.initiate_swap().unwrap();
        let ticket = session.confirm().unwrap();
        assert!(matches!(
            session.cancel_confirmation(),
            Err(SwapError::ActionNotAllowed { phase: SwapPhase::Executing, .. })
        ));

        let settled = session
            .complete_settlement(ticket, Duration::from_secs(5))
            .unwrap();
        assert!(matches!(
            session.cancel_confirmation(),
            Err(SwapError::ActionNotAllowed { phase: SwapPhase::Settled, .. })
        ));
        assert_eq!(session.phase(), SwapPhase::Settled);

        // The reset timer still clears the form.
        session.reset_form(settled.reset_ticket).unwrap();
        assert_eq!(session.amount(), "");
        assert!(!session.show_validation());
        assert!(session.reset_ticket().is_none());
    }

    #[test]
    fn test_failure_older_than_prices_is_ignored() {
        let mut session = filled_session("2500");
        session
            .apply_fetch_outcome(Ok(snapshot(&[("USD", 1.0), ("ETH", 2500.0)], 3)))
            .unwrap();

        let applied = session
            .apply_fetch_outcome(Err(FetchError::Network {
                generation: FetchGeneration::new(2),
                message: "connection refused".to_string(),
                retry_count: 1,
            }))
            .unwrap();

        assert_eq!(applied, FetchApplied::Ignored);
        assert!(session.fetch_error().is_none());
        assert_eq!(session.phase(), SwapPhase::Ready);
    }

    #[test]
    fn test_confirmation_survives_price_change() {
        let mut session = filled_session("2500");
        let frozen = session.initiate_swap().unwrap();

        session
            .apply_fetch_outcome(Ok(snapshot(&[("USD", 1.0), ("ETH", 5000.0)], 2)))
            .unwrap();

        assert_eq!(session.phase(), SwapPhase::Confirming);
        assert_eq!(session.confirmation(), Some(&frozen));
        assert_eq!(session.receive_amount(), "0.500000");

        let ticket = session.confirm().unwrap();
        let settled = session
            .complete_settlement(ticket, Duration::from_secs(5))
            .unwrap();

        assert_eq!(settled.notification.receive_amount, "1.000000");
        assert_eq!(settled.notification.amount, "2500");
    }

    #[test]
    fn test_full_lifecycle() {
        let mut session = filled_session("100");
        session.initiate_swap().unwrap();
        let ticket = session.confirm().unwrap();

        assert_eq!(session.phase(), SwapPhase::Executing);
        assert!(session.is_busy());
        assert!(session.set_amount("1").is_err());
        assert!(session.initiate_swap().is_err());

        let settled = session
            .complete_settlement(ticket, Duration::from_secs(5))
            .unwrap();
        assert_eq!(session.phase(), SwapPhase::Settled);
        assert!(session.notification().is_some());

        session.reset_form(settled.reset_ticket).unwrap();
        assert_eq!(session.phase(), SwapPhase::Ready);
        assert_eq!(session.amount(), "");
        assert_eq!(session.receive_amount(), "");
        assert!(!session.show_validation());
        assert_eq!(session.from_currency().unwrap().symbol(), "USD");
        assert_eq!(session.to_currency().unwrap().symbol(), "ETH");
        // Notification outlives the reset.
        assert!(session.notification().is_some());

        session
            .dismiss_notification(settled.notification.id)
            .unwrap();
        assert!(session.notification().is_none());
    }

    #[test]
    fn test_stale_tickets_are_rejected() {
        let mut session = filled_session("100");
        session.initiate_swap().unwrap();
        let ticket = session.confirm().unwrap();

        assert_eq!(
            session
                .complete_settlement(TicketId::new(), Duration::from_secs(5))
                .unwrap_err(),
            SwapError::StaleTimer { timer: "settlement" }
        );
        assert_eq!(session.settlement_ticket(), Some(ticket));

        let settled = session
            .complete_settlement(ticket, Duration::from_secs(5))
            .unwrap();
        assert!(session.reset_form(TicketId::new()).is_err());
        assert!(session.dismiss_notification(NotificationId::new()).is_err());

        session.reset_form(settled.reset_ticket).unwrap();
        assert!(session.reset_form(settled.reset_ticket).is_err());
    }

    #[test]
    fn test_confirm_outside_confirming_is_invalid() {
        let mut session = filled_session("100");

        assert_eq!(
            session.confirm(),
            Err(SwapError::InvalidTransition {
                from: SwapPhase::Ready,
                to: SwapPhase::Executing
            })
        );
    }
}
