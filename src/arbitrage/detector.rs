//! Arbitrage opportunity detection across assets and exchanges.

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::calculator::{calculate_opportunity, Opportunity};
use crate::error::ConfigError;
use crate::market::{Asset, Exchange, Quote, QuoteSource};

/// Scans every (asset, exchange) pair for the best fee-adjusted spread.
#[derive(Debug, Clone)]
pub struct OpportunityScanner<Q> {
    exchanges: Vec<Exchange>,
    quotes: Q,
    min_profit_pct: Decimal,
}

impl<Q: QuoteSource> OpportunityScanner<Q> {
    /// Create a scanner. Fails when no exchange is configured.
    pub fn new(
        exchanges: Vec<Exchange>,
        quotes: Q,
        min_profit_pct: Decimal,
    ) -> Result<Self, ConfigError> {
        if exchanges.is_empty() {
            return Err(ConfigError::NoExchanges);
        }
        Ok(Self {
            exchanges,
            quotes,
            min_profit_pct,
        })
    }

    /// Exchanges in configured order.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Minimum profit percentage an opportunity must reach.
    pub fn min_profit_pct(&self) -> Decimal {
        self.min_profit_pct
    }

    /// Best opportunity across `assets`, if any clears the threshold.
    pub fn find_best(&mut self, assets: &[Asset]) -> Option<Opportunity> {
        self.scan(assets).best
    }

    /// Quote every exchange for every asset and keep all candidates.
    #[instrument(skip_all, fields(assets = assets.len(), exchanges = self.exchanges.len()))]
    pub fn scan(&mut self, assets: &[Asset]) -> ScanReport {
        let mut candidates = Vec::with_capacity(assets.len());

        for asset in assets {
            let quotes: Vec<Quote<'_>> = self
                .exchanges
                .iter()
                .map(|exchange| Quote {
                    exchange,
                    price: self.quotes.quote(exchange, asset),
                })
                .collect();

            match calculate_opportunity(&asset.symbol, &quotes) {
                Some(candidate) => {
                    debug!(
                        asset = %candidate.asset,
                        buy = %candidate.buy_exchange,
                        sell = %candidate.sell_exchange,
                        profit_pct = %candidate.profit_pct,
                        "Candidate"
                    );
                    candidates.push(candidate);
                }
                None => debug!(asset = %asset.symbol, "No usable quotes"),
            }
        }

        let best = select_best(&candidates, self.min_profit_pct).cloned();

        if let Some(ref opp) = best {
            info!(
                asset = %opp.asset,
                buy = %opp.buy_exchange,
                sell = %opp.sell_exchange,
                profit_pct = %opp.profit_pct.round_dp(4),
                "Arbitrage opportunity detected"
            );
        }

        ScanReport {
            candidates,
            best,
            min_profit_pct: self.min_profit_pct,
        }
    }
}

/// Highest-profit candidate at or above `min_profit_pct`.
///
/// Only candidates with a strictly positive profit qualify, so a negative
/// threshold never selects a loss. Candidates are compared with strict `>`,
/// so the earliest wins ties.
pub fn select_best(candidates: &[Opportunity], min_profit_pct: Decimal) -> Option<&Opportunity> {
    let mut best: Option<&Opportunity> = None;

    for candidate in candidates {
        if candidate.profit_pct <= Decimal::ZERO || !candidate.meets_threshold(min_profit_pct) {
            continue;
        }
        match best {
            Some(current) if candidate.profit_pct <= current.profit_pct => {}
            _ => best = Some(candidate),
        }
    }

    best
}

/// Everything one scan saw.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Per-asset candidates in scan order, profitable or not.
    pub candidates: Vec<Opportunity>,
    /// Selected opportunity.
    pub best: Option<Opportunity>,
    /// Threshold used.
    pub min_profit_pct: Decimal,
}

impl ScanReport {
    /// Explain a scan that found nothing.
    pub fn diagnose(&self) -> NoOpportunityDiagnosis {
        let closest = self
            .candidates
            .iter()
            .fold(None::<&Opportunity>, |acc, c| match acc {
                Some(a) if c.profit_pct <= a.profit_pct => Some(a),
                _ => Some(c),
            });

        NoOpportunityDiagnosis {
            assets_scanned: self.candidates.len(),
            closest_asset: closest.map(|c| c.asset.clone()),
            closest_buy_exchange: closest.map(|c| c.buy_exchange.clone()),
            closest_sell_exchange: closest.map(|c| c.sell_exchange.clone()),
            closest_profit_pct: closest.map(|c| c.profit_pct),
            threshold: self.min_profit_pct,
        }
    }
}

/// Diagnostic information for a miss.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NoOpportunityDiagnosis {
    /// Assets that produced a candidate.
    pub assets_scanned: usize,
    /// Asset with the highest profit percentage.
    pub closest_asset: Option<String>,
    /// Buy exchange of the closest candidate.
    pub closest_buy_exchange: Option<String>,
    /// Sell exchange of the closest candidate.
    pub closest_sell_exchange: Option<String>,
    /// Profit percentage of the closest candidate.
    pub closest_profit_pct: Option<Decimal>,
    /// Profit threshold.
    pub threshold: Decimal,
}

impl std::fmt::Display for NoOpportunityDiagnosis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            &self.closest_asset,
            &self.closest_buy_exchange,
            &self.closest_sell_exchange,
            self.closest_profit_pct,
        ) {
            (Some(asset), Some(buy), Some(sell), Some(pct)) => write!(
                f,
                "best {} {}->{} at {:.4}% (threshold {}%, {} assets)",
                asset, buy, sell, pct, self.threshold, self.assets_scanned
            ),
            _ => write!(
                f,
                "no candidates (threshold {}%, {} assets)",
                self.threshold, self.assets_scanned
            ),
        }
    }
}
