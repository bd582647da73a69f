//! Simulated trade execution against a capital ledger.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::portfolio::{DrawdownPolicy, PortfolioState};
use super::record::TradeRecord;
use crate::arbitrage::Opportunity;
use crate::error::ConfigError;

/// Default share of current capital committed to one trade.
pub const DEFAULT_RISK_FRACTION: Decimal = dec!(0.1);

/// Decimal places kept for quantities and money figures of a booked trade.
///
/// Every booked figure has at most this scale, so capital and cumulative
/// profit add up exactly over any number of trades.
pub const MONEY_DP: u32 = 12;

/// Owns the portfolio and the trade history.
#[derive(Debug, Clone)]
pub struct TradeLedger {
    state: PortfolioState,
    risk_fraction: Decimal,
    policy: DrawdownPolicy,
    trades: Vec<TradeRecord>,
}

impl TradeLedger {
    /// Ledger with default sizing and an unbounded drawdown.
    pub fn new(initial_capital: Decimal) -> Result<Self, ConfigError> {
        Self::with_options(
            initial_capital,
            DEFAULT_RISK_FRACTION,
            DrawdownPolicy::default(),
        )
    }

    /// Ledger with explicit sizing and drawdown policy.
    pub fn with_options(
        initial_capital: Decimal,
        risk_fraction: Decimal,
        policy: DrawdownPolicy,
    ) -> Result<Self, ConfigError> {
        if initial_capital <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveCapital(initial_capital));
        }
        if risk_fraction <= Decimal::ZERO || risk_fraction > Decimal::ONE {
            return Err(ConfigError::InvalidRiskFraction(risk_fraction));
        }

        Ok(Self {
            state: PortfolioState::new(initial_capital),
            risk_fraction,
            policy,
            trades: Vec::new(),
        })
    }

    /// Process one iteration's outcome.
    ///
    /// `None` counts a miss and leaves capital alone. `Some` sizes a trade at
    /// the risk fraction of current capital and books its net profit.
    #[instrument(skip_all, fields(asset = opportunity.map(|o| o.asset.as_str())))]
    pub fn execute(&mut self, opportunity: Option<&Opportunity>) -> Option<TradeRecord> {
        let Some(opp) = opportunity else {
            self.state.record_miss();
            debug!(missed = self.state.missed_iterations, "No qualifying opportunity");
            return None;
        };

        let trade_size = self.state.capital * self.risk_fraction;
        let quantity = (trade_size / opp.buy_price).round_dp(MONEY_DP);

        let buy_fee = (opp.buy_fee * quantity).round_dp(MONEY_DP);
        let sell_fee = (opp.sell_fee * quantity).round_dp(MONEY_DP);
        let total_cost = (opp.buy_price * quantity).round_dp(MONEY_DP) + buy_fee;
        let total_revenue = (opp.sell_price * quantity).round_dp(MONEY_DP) - sell_fee;
        let net_profit = total_revenue - total_cost;

        self.state.apply_trade(net_profit, self.policy);

        if net_profit < Decimal::ZERO {
            warn!(net_profit = %net_profit, capital = %self.state.capital, "Trade closed at a loss");
        }

        let record = TradeRecord {
            seq: self.trades.len() as u64 + 1,
            timestamp: OffsetDateTime::now_utc(),
            asset: opp.asset.clone(),
            quantity,
            buy_exchange: opp.buy_exchange.clone(),
            sell_exchange: opp.sell_exchange.clone(),
            buy_price: opp.buy_price,
            sell_price: opp.sell_price,
            buy_fee_per_unit: opp.buy_fee,
            sell_fee_per_unit: opp.sell_fee,
            buy_fee,
            sell_fee,
            total_fees: buy_fee + sell_fee,
            total_cost,
            total_revenue,
            net_profit,
            profit_pct: opp.profit_pct,
            capital_after: self.state.capital,
        };

        info!(
            seq = record.seq,
            asset = %record.asset,
            quantity = %record.quantity.round_dp(6),
            net_profit = %record.net_profit.round_dp(2),
            capital = %record.capital_after.round_dp(2),
            "Simulated trade executed"
        );

        self.trades.push(record.clone());
        Some(record)
    }

    /// Current portfolio.
    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    /// Trade history in execution order.
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Share of capital committed per trade.
    pub fn risk_fraction(&self) -> Decimal {
        self.risk_fraction
    }

    /// Drawdown policy in force.
    pub fn policy(&self) -> DrawdownPolicy {
        self.policy
    }
}
