//! Trading module for simulated execution.
//!
//! This module handles:
//! - Trade sizing and profit booking
//! - Portfolio state and drawdown policy
//! - Trade records

pub mod ledger;
pub mod portfolio;
pub mod record;

pub use ledger::{TradeLedger, DEFAULT_RISK_FRACTION, MONEY_DP};
pub use portfolio::{DrawdownPolicy, PortfolioState};
pub use record::TradeRecord;
