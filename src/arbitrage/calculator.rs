//! Profit and cost calculations for arbitrage opportunities.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::market::Quote;

/// Detected arbitrage opportunity for one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    /// Asset symbol.
    pub asset: String,
    /// Exchange quoting the lowest price.
    pub buy_exchange: String,
    /// Exchange quoting the highest price.
    pub sell_exchange: String,
    /// Lowest quoted price.
    pub buy_price: Decimal,
    /// Highest quoted price.
    pub sell_price: Decimal,
    /// Buy-side fee per unit, in currency.
    pub buy_fee: Decimal,
    /// Sell-side fee per unit, in currency.
    pub sell_fee: Decimal,
    /// Buy price plus fee.
    pub net_buy_price: Decimal,
    /// Sell price minus fee.
    pub net_sell_price: Decimal,
    /// Profit percentage after fees ((net_sell - net_buy) / net_buy * 100).
    pub profit_pct: Decimal,
    /// Timestamp when opportunity was detected.
    #[serde(with = "time::serde::rfc3339")]
    pub detected_at: OffsetDateTime,
}

impl Opportunity {
    /// Net profit per unit after both fees.
    pub fn profit_per_unit(&self) -> Decimal {
        self.net_sell_price - self.net_buy_price
    }

    /// Gross spread between sell and buy quotes.
    pub fn spread(&self) -> Decimal {
        self.sell_price - self.buy_price
    }

    /// Whether buy and sell happen on the same exchange.
    pub fn is_same_exchange(&self) -> bool {
        self.buy_exchange == self.sell_exchange
    }

    /// Whether the opportunity clears `min_profit_pct`.
    pub fn meets_threshold(&self, min_profit_pct: Decimal) -> bool {
        self.profit_pct >= min_profit_pct
    }
}

/// Lowest and highest quotes, first in list order winning ties.
pub fn price_extremes<'q, 'a>(quotes: &'q [Quote<'a>]) -> Option<(&'q Quote<'a>, &'q Quote<'a>)> {
    let first = quotes.first()?;
    let mut low = first;
    let mut high = first;

    for quote in &quotes[1..] {
        if quote.price < low.price {
            low = quote;
        }
        if quote.price > high.price {
            high = quote;
        }
    }

    Some((low, high))
}

/// Compute the fee-adjusted candidate for one asset from its quotes.
///
/// Returns `None` for an empty quote set or when the net buy price is not
/// positive. The candidate is returned regardless of profitability.
pub fn calculate_opportunity(asset: &str, quotes: &[Quote<'_>]) -> Option<Opportunity> {
    let (low, high) = price_extremes(quotes)?;

    let buy_price = low.price;
    let sell_price = high.price;
    let buy_fee = low.exchange.fee(buy_price);
    let sell_fee = high.exchange.fee(sell_price);

    let net_buy_price = buy_price + buy_fee;
    let net_sell_price = sell_price - sell_fee;
    if net_buy_price <= Decimal::ZERO {
        return None;
    }

    let profit_pct = (net_sell_price - net_buy_price) / net_buy_price * Decimal::ONE_HUNDRED;

    Some(Opportunity {
        asset: asset.to_string(),
        buy_exchange: low.exchange.name().to_string(),
        sell_exchange: high.exchange.name().to_string(),
        buy_price,
        sell_price,
        buy_fee,
        sell_fee,
        net_buy_price,
        net_sell_price,
        profit_pct,
        detected_at: OffsetDateTime::now_utc(),
    })
}

/// Gross spread (before fees) needed to break even across two exchanges,
/// as a percentage of the buy price.
pub fn break_even_spread_pct(buy_fee_rate: Decimal, sell_fee_rate: Decimal) -> Decimal {
    // (1 + b)/(1 - s) - 1, with rates as fractions
    let b = buy_fee_rate / Decimal::ONE_HUNDRED;
    let s = sell_fee_rate / Decimal::ONE_HUNDRED;
    if s >= Decimal::ONE {
        return Decimal::MAX;
    }
    ((Decimal::ONE + b) / (Decimal::ONE - s) - Decimal::ONE) * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Exchange;
    use rust_decimal_macros::dec;

    fn exchanges() -> Vec<Exchange> {
        vec![
            Exchange::new("Binance", dec!(0.1), dec!(0)).unwrap(),
            Exchange::new("Coinbase", dec!(0.5), dec!(0)).unwrap(),
            Exchange::new("Kraken", dec!(0.26), dec!(0)).unwrap(),
        ]
    }

    fn quotes<'a>(exchanges: &'a [Exchange], prices: &[Decimal]) -> Vec<Quote<'a>> {
        exchanges
            .iter()
            .zip(prices)
            .map(|(exchange, &price)| Quote { exchange, price })
            .collect()
    }

    #[test]
    fn buy_is_min_and_sell_is_max() {
        let ex = exchanges();
        let q = quotes(&ex, &[dec!(101), dec!(99), dec!(104)]);

        let opp = calculate_opportunity("SOL", &q).unwrap();

        assert_eq!(opp.buy_exchange, "Coinbase");
        assert_eq!(opp.sell_exchange, "Kraken");
        assert_eq!(opp.buy_price, dec!(99));
        assert_eq!(opp.sell_price, dec!(104));
        assert!(q.iter().all(|quote| opp.buy_price <= quote.price));
        assert!(q.iter().all(|quote| opp.sell_price >= quote.price));
    }

    #[test]
    fn fees_adjust_profit_percentage() {
        let ex = exchanges();
        // buy on Binance at 100 (fee 0.1), sell on Coinbase at 110 (fee 0.55)
        let q = quotes(&ex, &[dec!(100), dec!(110), dec!(105)]);

        let opp = calculate_opportunity("SOL", &q).unwrap();

        assert_eq!(opp.buy_fee, dec!(0.1));
        assert_eq!(opp.sell_fee, dec!(0.55));
        assert_eq!(opp.net_buy_price, dec!(100.1));
        assert_eq!(opp.net_sell_price, dec!(109.45));
        assert_eq!(opp.profit_per_unit(), dec!(9.35));
        assert_eq!(opp.profit_pct, dec!(9.35) / dec!(100.1) * dec!(100));
        assert_eq!(opp.spread(), dec!(10));
    }

    #[test]
    fn ties_go_to_first_exchange() {
        let ex = exchanges();
        let q = quotes(&ex, &[dec!(100), dec!(100), dec!(100)]);

        let opp = calculate_opportunity("ADA", &q).unwrap();

        assert_eq!(opp.buy_exchange, "Binance");
        assert_eq!(opp.sell_exchange, "Binance");
        assert!(opp.is_same_exchange());
        assert!(opp.profit_pct < Decimal::ZERO);
    }

    #[test]
    fn empty_quotes_yield_nothing() {
        assert!(calculate_opportunity("BTC", &[]).is_none());
    }

    #[test]
    fn break_even_spread_for_zero_fees_is_zero() {
        assert_eq!(break_even_spread_pct(dec!(0), dec!(0)), dec!(0));
        assert!(break_even_spread_pct(dec!(0.1), dec!(0.5)) > dec!(0.6));
    }
}
