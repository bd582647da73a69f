//! Arbitrage module for detecting cross-exchange opportunities.
//!
//! This module handles:
//! - Per-asset fee-adjusted profit calculations
//! - Best-opportunity selection across assets

pub mod calculator;
pub mod detector;

pub use calculator::{break_even_spread_pct, calculate_opportunity, Opportunity};
pub use detector::{select_best, NoOpportunityDiagnosis, OpportunityScanner, ScanReport};
