//! Unified error types for the arbitrage simulator.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the simulator.
#[derive(Error, Debug)]
pub enum SimError {
    /// Environment loading error.
    #[error("environment error: {0}")]
    Env(#[from] envy::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration validation errors.
///
/// Raised at construction time; values are never clamped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Fee rate below zero.
    #[error("exchange {exchange}: fee rate must be >= 0, got {fee_rate}")]
    NegativeFeeRate {
        /// Exchange name.
        exchange: String,
        /// Offending fee rate.
        fee_rate: Decimal,
    },

    /// Price variation below zero.
    #[error("exchange {exchange}: price variation must be >= 0, got {variation}")]
    NegativeVariation {
        /// Exchange name.
        exchange: String,
        /// Offending variation.
        variation: Decimal,
    },

    /// Price variation large enough to quote non-positive prices.
    #[error("exchange {exchange}: price variation must be < 1, got {variation}")]
    VariationTooLarge {
        /// Exchange name.
        exchange: String,
        /// Offending variation.
        variation: Decimal,
    },

    /// Initial capital is zero or negative.
    #[error("initial capital must be > 0, got {0}")]
    NonPositiveCapital(Decimal),

    /// Asset base price is zero or negative.
    #[error("asset {symbol}: base price must be > 0, got {price}")]
    NonPositivePrice {
        /// Asset symbol.
        symbol: String,
        /// Offending price.
        price: Decimal,
    },

    /// No exchanges configured.
    #[error("at least one exchange is required")]
    NoExchanges,

    /// No assets configured.
    #[error("at least one asset is required")]
    NoAssets,

    /// Iteration count is zero.
    #[error("iteration count must be > 0")]
    ZeroIterations,

    /// Risk fraction outside (0, 1].
    #[error("risk fraction must be in (0, 1], got {0}")]
    InvalidRiskFraction(Decimal),

    /// Random-walk step outside [0, 1).
    #[error("price step must be in [0, 1), got {0}")]
    InvalidPriceStep(Decimal),

    /// Name or symbol is empty.
    #[error("empty {0} name")]
    EmptyName(&'static str),

    /// Name or symbol used twice.
    #[error("duplicate {kind} {name}")]
    Duplicate {
        /// "exchange" or "asset".
        kind: &'static str,
        /// Repeated name.
        name: String,
    },

    /// Unparsable list entry.
    #[error("cannot parse {kind} entry {entry:?}: {reason}")]
    Parse {
        /// "exchange", "asset" or "drawdown policy".
        kind: &'static str,
        /// Raw entry text.
        entry: String,
        /// Reason for failure.
        reason: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, SimError>;
