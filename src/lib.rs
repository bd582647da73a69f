//! Cross-exchange crypto arbitrage simulator.
//!
//! Synthetic prices are generated per exchange around a shared base price.
//! Each iteration the scanner finds the asset whose cheapest and dearest
//! quotes are furthest apart after fees, and the ledger books a trade sized
//! at a fixed fraction of capital:
//!
//! ```text
//! SOL base price:  $100.00
//! Buy  on A @ $100.00 + 0.1% fee  = $100.10
//! Sell on B @ $110.00 - 0.5% fee  = $109.45
//! ──────────────────────────────────────────
//! Profit: 9.34% after fees ✅
//! ```
//!
//! There is no real market data, no order execution and no persistence.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Assets, exchanges, price walk and quotes
//! - [`arbitrage`]: Opportunity calculation and selection
//! - [`trading`]: Trade ledger, portfolio state and records
//! - [`simulation`]: Iteration driver and reporters
//! - [`metrics`]: Counters, gauges and histograms
//! - [`utils`]: Utility functions

pub mod arbitrage;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod simulation;
pub mod trading;
pub mod utils;

pub use config::Config;
pub use error::{ConfigError, Result, SimError};
