//! Executed trade snapshots.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

/// Immutable record of one simulated arbitrage trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    /// 1-based position in the trade history.
    pub seq: u64,
    /// When the trade was executed.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Asset symbol.
    pub asset: String,
    /// Units bought and sold.
    pub quantity: Decimal,
    /// Buy-side exchange.
    pub buy_exchange: String,
    /// Sell-side exchange.
    pub sell_exchange: String,
    /// Buy price per unit.
    pub buy_price: Decimal,
    /// Sell price per unit.
    pub sell_price: Decimal,
    /// Buy fee per unit.
    pub buy_fee_per_unit: Decimal,
    /// Sell fee per unit.
    pub sell_fee_per_unit: Decimal,
    /// Total buy fee in currency.
    pub buy_fee: Decimal,
    /// Total sell fee in currency.
    pub sell_fee: Decimal,
    /// Buy plus sell fees.
    pub total_fees: Decimal,
    /// Quantity * buy price + buy fee.
    pub total_cost: Decimal,
    /// Quantity * sell price - sell fee.
    pub total_revenue: Decimal,
    /// Revenue minus cost.
    pub net_profit: Decimal,
    /// Profit percentage the scanner reported.
    pub profit_pct: Decimal,
    /// Capital after applying the trade.
    pub capital_after: Decimal,
}

impl TradeRecord {
    /// Whether the trade lost money.
    pub fn is_loss(&self) -> bool {
        self.net_profit < Decimal::ZERO
    }

    /// Notional spent on the buy leg before fees.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.buy_price
    }
}
