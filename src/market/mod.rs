//! Simulated market for cross-exchange arbitrage.
//!
//! This module handles:
//! - Asset and exchange types
//! - Base price random walk
//! - Per-exchange quote generation
//! - Fixed quote source for testing

pub mod mock;
pub mod price_model;
pub mod quotes;
pub mod types;

pub use mock::FixedQuotes;
pub use price_model::{PriceModel, DEFAULT_PRICE_STEP};
pub use quotes::{QuoteSource, RandomQuotes};
pub use types::{Asset, Exchange, Quote};
