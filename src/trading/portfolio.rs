//! Capital and running statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What happens when a losing trade would push capital below zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum DrawdownPolicy {
    /// Capital may go negative.
    #[default]
    #[strum(serialize = "unbounded")]
    Unbounded,
    /// Capital is clamped at zero.
    #[strum(to_string = "floor_at_zero", serialize = "floor")]
    FloorAtZero,
}

/// Mutable aggregate owned by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioState {
    /// Capital at the start of the run.
    pub initial_capital: Decimal,
    /// Current capital.
    pub capital: Decimal,
    /// Sum of net profit over all trades.
    pub total_profit: Decimal,
    /// Iterations that executed a trade.
    pub successful_trades: u64,
    /// Iterations with no qualifying opportunity.
    pub missed_iterations: u64,
}

impl PortfolioState {
    /// Fresh state holding `capital`.
    pub fn new(capital: Decimal) -> Self {
        Self {
            initial_capital: capital,
            capital,
            total_profit: Decimal::ZERO,
            successful_trades: 0,
            missed_iterations: 0,
        }
    }

    /// Iterations processed so far.
    pub fn iterations(&self) -> u64 {
        self.successful_trades + self.missed_iterations
    }

    /// Apply a trade's net profit under `policy`.
    pub fn apply_trade(&mut self, net_profit: Decimal, policy: DrawdownPolicy) {
        self.capital += net_profit;
        if policy == DrawdownPolicy::FloorAtZero && self.capital < Decimal::ZERO {
            self.capital = Decimal::ZERO;
        }
        self.total_profit += net_profit;
        self.successful_trades += 1;
    }

    /// Count an iteration without a trade.
    pub fn record_miss(&mut self) {
        self.missed_iterations += 1;
    }

    /// Share of iterations that traded.
    pub fn success_rate(&self) -> Option<Decimal> {
        let total = self.iterations();
        if total == 0 {
            None
        } else {
            Some(Decimal::from(self.successful_trades) / Decimal::from(total))
        }
    }

    /// Return on starting capital, as a percentage.
    pub fn roi_pct(&self) -> Option<Decimal> {
        if self.initial_capital <= Decimal::ZERO {
            None
        } else {
            Some(self.total_profit / self.initial_capital * Decimal::ONE_HUNDRED)
        }
    }

    /// Mean net profit per executed trade.
    pub fn avg_profit_per_trade(&self) -> Option<Decimal> {
        if self.successful_trades == 0 {
            None
        } else {
            Some(self.total_profit / Decimal::from(self.successful_trades))
        }
    }
}
