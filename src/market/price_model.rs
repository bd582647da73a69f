//! Base price random walk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::trace;

use super::quotes::uniform_offset;
use super::types::Asset;
use crate::error::ConfigError;

/// Default per-iteration move bound (±0.5%).
pub const DEFAULT_PRICE_STEP: Decimal = dec!(0.005);

/// Tracks every asset's base price and nudges it once per iteration.
#[derive(Debug, Clone)]
pub struct PriceModel<R = StdRng> {
    assets: Vec<Asset>,
    step: Decimal,
    rng: R,
}

impl PriceModel<StdRng> {
    /// Model with the default step and an entropy-seeded source.
    pub fn from_entropy(assets: Vec<Asset>) -> Result<Self, ConfigError> {
        Self::new(assets, DEFAULT_PRICE_STEP, StdRng::from_entropy())
    }

    /// Model with the default step and a reproducible source.
    pub fn seeded(assets: Vec<Asset>, seed: u64) -> Result<Self, ConfigError> {
        Self::new(assets, DEFAULT_PRICE_STEP, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PriceModel<R> {
    /// Create a model over `assets` moving at most `step` per iteration.
    pub fn new(assets: Vec<Asset>, step: Decimal, rng: R) -> Result<Self, ConfigError> {
        if assets.is_empty() {
            return Err(ConfigError::NoAssets);
        }
        if step < Decimal::ZERO || step >= Decimal::ONE {
            return Err(ConfigError::InvalidPriceStep(step));
        }
        Ok(Self { assets, step, rng })
    }

    /// Apply one random-walk step to every asset, in configured order.
    pub fn advance(&mut self) {
        for asset in &mut self.assets {
            let u = uniform_offset(&mut self.rng, self.step);
            asset.base_price *= Decimal::ONE + u;
            trace!(symbol = %asset.symbol, price = %asset.base_price, "Base price moved");
        }
    }

    /// Assets in configured order.
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Current base price of `symbol`.
    pub fn price_of(&self, symbol: &str) -> Option<Decimal> {
        self.assets
            .iter()
            .find(|a| a.symbol == symbol)
            .map(|a| a.base_price)
    }

    /// Per-iteration move bound.
    pub fn step(&self) -> Decimal {
        self.step
    }
}
