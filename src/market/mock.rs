//! Fixed quote source for deterministic tests.
//!
//! Prices are pinned per (exchange, asset) pair; anything unpinned quotes
//! the asset's base price.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::quotes::QuoteSource;
use super::types::{Asset, Exchange};

/// Quote source returning pinned prices.
#[derive(Debug, Clone, Default)]
pub struct FixedQuotes {
    prices: HashMap<(String, String), Decimal>,
    /// Number of quotes served.
    calls: usize,
}

impl FixedQuotes {
    /// Create an empty table (every quote equals the base price).
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the price `exchange` quotes for `symbol`.
    pub fn set(&mut self, exchange: &str, symbol: &str, price: Decimal) {
        self.prices
            .insert((exchange.to_string(), symbol.to_string()), price);
    }

    /// Builder-style variant of [`FixedQuotes::set`].
    pub fn with(mut self, exchange: &str, symbol: &str, price: Decimal) -> Self {
        self.set(exchange, symbol, price);
        self
    }

    /// Remove every pinned price.
    pub fn clear(&mut self) {
        self.prices.clear();
    }

    /// Number of quotes served so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl QuoteSource for FixedQuotes {
    fn quote(&mut self, exchange: &Exchange, asset: &Asset) -> Decimal {
        self.calls += 1;
        self.prices
            .get(&(exchange.name().to_string(), asset.symbol.clone()))
            .copied()
            .unwrap_or(asset.base_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pinned_prices_override_base() {
        let a = Exchange::new("A", dec!(0), dec!(0)).unwrap();
        let b = Exchange::new("B", dec!(0), dec!(0)).unwrap();
        let sol = Asset::new("SOL", dec!(100)).unwrap();

        let mut quotes = FixedQuotes::new().with("B", "SOL", dec!(110));

        assert_eq!(quotes.quote(&a, &sol), dec!(100));
        assert_eq!(quotes.quote(&b, &sol), dec!(110));
        assert_eq!(quotes.calls(), 2);

        quotes.clear();
        assert_eq!(quotes.quote(&b, &sol), dec!(100));
    }
}
