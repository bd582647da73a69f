//! Exchange quote generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::types::{Asset, Exchange};

/// Decimal places kept from a uniform draw before it scales a price.
pub const DRAW_DP: u32 = 10;

/// Source of per-exchange prices for an asset.
pub trait QuoteSource {
    /// Price `exchange` quotes for `asset` right now.
    fn quote(&mut self, exchange: &Exchange, asset: &Asset) -> Decimal;
}

/// Draw `u ~ Uniform[-bound, +bound]` as a decimal.
///
/// A zero bound returns exactly zero without consuming randomness.
pub fn uniform_offset<R: Rng + ?Sized>(rng: &mut R, bound: Decimal) -> Decimal {
    if bound.is_zero() {
        return Decimal::ZERO;
    }
    let unit: f64 = rng.gen_range(-1.0..=1.0);
    let unit = Decimal::from_f64(unit).unwrap_or_default().round_dp(DRAW_DP);
    unit * bound
}

/// Quotes `base_price * (1 + u)` with `u` bounded by each exchange's
/// configured price variation.
#[derive(Debug, Clone)]
pub struct RandomQuotes<R = StdRng> {
    rng: R,
}

impl RandomQuotes<StdRng> {
    /// Entropy-seeded quotes.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible quotes.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomQuotes<R> {
    /// Wrap an existing random source.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Quote an explicit base price on `exchange`.
    pub fn quote_price(&mut self, exchange: &Exchange, base_price: Decimal) -> Decimal {
        let u = uniform_offset(&mut self.rng, exchange.price_variation());
        base_price * (Decimal::ONE + u)
    }
}

impl<R: Rng> QuoteSource for RandomQuotes<R> {
    fn quote(&mut self, exchange: &Exchange, asset: &Asset) -> Decimal {
        self.quote_price(exchange, asset.base_price)
    }
}
