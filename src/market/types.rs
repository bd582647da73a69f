//! Simulated market entities: assets, exchanges, quotes.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ConfigError;

/// A tradable asset with its canonical simulated price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    /// Ticker symbol (e.g., "BTC").
    pub symbol: String,
    /// Current base price, independent of any exchange.
    pub base_price: Decimal,
}

impl Asset {
    /// Create an asset, rejecting empty symbols and non-positive prices.
    pub fn new(symbol: impl Into<String>, base_price: Decimal) -> Result<Self, ConfigError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ConfigError::EmptyName("asset"));
        }
        if base_price <= Decimal::ZERO {
            return Err(ConfigError::NonPositivePrice {
                symbol,
                price: base_price,
            });
        }
        Ok(Self { symbol, base_price })
    }
}

/// Parses `SYMBOL:PRICE`, e.g. `BTC:45000`.
impl FromStr for Asset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason: &str| ConfigError::Parse {
            kind: "asset",
            entry: s.to_string(),
            reason: reason.to_string(),
        };

        let (symbol, price) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| parse_err("expected SYMBOL:PRICE"))?;
        let price = Decimal::from_str(price.trim()).map_err(|e| parse_err(&e.to_string()))?;

        Asset::new(symbol.trim(), price)
    }
}

/// A simulated exchange with its fee schedule and quoting noise.
///
/// Immutable once constructed; the only constructor validates its inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    name: String,
    fee_rate: Decimal,
    price_variation: Decimal,
}

impl Exchange {
    /// Create an exchange.
    ///
    /// `fee_rate` is a percentage (0.1 means 0.1%). `price_variation` is a
    /// fraction (0.015 means quotes stray up to ±1.5% from the base price).
    pub fn new(
        name: impl Into<String>,
        fee_rate: Decimal,
        price_variation: Decimal,
    ) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName("exchange"));
        }
        if fee_rate < Decimal::ZERO {
            return Err(ConfigError::NegativeFeeRate {
                exchange: name,
                fee_rate,
            });
        }
        if price_variation < Decimal::ZERO {
            return Err(ConfigError::NegativeVariation {
                exchange: name,
                variation: price_variation,
            });
        }
        if price_variation >= Decimal::ONE {
            return Err(ConfigError::VariationTooLarge {
                exchange: name,
                variation: price_variation,
            });
        }

        Ok(Self {
            name,
            fee_rate,
            price_variation,
        })
    }

    /// Exchange name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fee rate as a percentage.
    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    /// Maximum relative deviation of a quote from the base price.
    pub fn price_variation(&self) -> Decimal {
        self.price_variation
    }

    /// Trading fee charged on `amount`.
    pub fn fee(&self, amount: Decimal) -> Decimal {
        amount * (self.fee_rate / Decimal::ONE_HUNDRED)
    }
}

/// Parses `NAME:FEE_PCT:VARIATION`, e.g. `Binance:0.1:0.015`.
impl FromStr for Exchange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason: String| ConfigError::Parse {
            kind: "exchange",
            entry: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        let [name, fee, variation] = parts.as_slice() else {
            return Err(parse_err("expected NAME:FEE_PCT:VARIATION".to_string()));
        };

        let fee = Decimal::from_str(fee).map_err(|e| parse_err(e.to_string()))?;
        let variation = Decimal::from_str(variation).map_err(|e| parse_err(e.to_string()))?;

        Exchange::new(*name, fee, variation)
    }
}

/// One exchange's price for one asset in one iteration.
#[derive(Debug, Clone)]
pub struct Quote<'a> {
    /// Quoting exchange.
    pub exchange: &'a Exchange,
    /// Quoted price.
    pub price: Decimal,
}
