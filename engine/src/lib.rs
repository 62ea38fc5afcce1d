//! SwapDesk Engine
//!
//! The swap session state machine and the async engine that drives it.
//! A session loads prices, lets the user pick two currencies and an amount,
//! freezes the terms for confirmation, then settles, notifies and resets on
//! timers.
//!
//! # Example
//!
//! ```rust,ignore
//! use swapdesk_engine::{SwapConfig, SwapEngine};
//!
//! let engine = SwapEngine::with_http_source(SwapConfig::from_env())?;
//! let mut views = engine.subscribe();
//!
//! engine.start().await?;
//! engine.select_from("USD")?;
//! engine.select_to("ETH")?;
//! engine.set_amount("2500")?;
//! engine.initiate_swap()?;
//! engine.confirm()?;
//! ```

pub mod config;
pub mod confirmation;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod notification;
pub mod session;
pub mod state;
pub mod validator;
pub mod view;

pub use config::{PriceSourceConfig, SwapConfig};
pub use confirmation::SwapConfirmation;
pub use engine::SwapEngine;
pub use error::{SwapError, SwapResult};
pub use metrics::{MetricsSnapshot, SessionMetrics};
pub use notification::SuccessNotification;
pub use session::{FetchApplied, SettledSwap, SwapSession};
pub use state::SwapPhase;
pub use validator::{sanitize_amount_input, validate, ValidationResult, MAX_AMOUNT};
pub use view::{FetchBanner, SessionView};
