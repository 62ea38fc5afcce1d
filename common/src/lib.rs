//! SwapDesk Common Types
//!
//! This crate contains shared types used across the SwapDesk swap engine,
//! including currency symbols, price quotes, identifiers, timing constants
//! and the display formatter used by presentation layers.

pub mod identifiers;
pub mod quote;
pub mod error;
pub mod time;
pub mod format;

pub use identifiers::*;
pub use quote::*;
pub use error::*;
pub use time::*;
