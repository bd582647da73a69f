//! Iteration loop tying prices, scanner and ledger together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument, warn};

use super::report::{IterationOutcome, Reporter, RunStart, RunSummary};
use crate::arbitrage::OpportunityScanner;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::market::{PriceModel, QuoteSource, RandomQuotes};
use crate::metrics;
use crate::trading::{PortfolioState, TradeLedger, TradeRecord};

/// Sequential arbitrage simulation.
#[derive(Debug)]
pub struct Simulation<Q, R = StdRng> {
    prices: PriceModel<R>,
    scanner: OpportunityScanner<Q>,
    ledger: TradeLedger,
    iterations: u64,
    completed: u64,
    pace: Duration,
    stop: Arc<AtomicBool>,
}

impl Simulation<RandomQuotes<StdRng>, StdRng> {
    /// Build a randomized simulation from validated configuration.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let (price_rng, quote_rng) = match config.seed {
            Some(seed) => (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (StdRng::from_entropy(), StdRng::from_entropy()),
        };

        let prices = PriceModel::new(config.assets()?, config.price_step, price_rng)?;
        let scanner = OpportunityScanner::new(
            config.exchanges()?,
            RandomQuotes::new(quote_rng),
            config.min_profit_pct,
        )?;
        let ledger = TradeLedger::with_options(
            config.initial_capital,
            config.risk_fraction,
            config.drawdown_policy()?,
        )?;

        Ok(Self::new(prices, scanner, ledger, config.iterations)?
            .with_pace(Duration::from_millis(config.pace_ms)))
    }
}

impl<Q: QuoteSource, R: Rng> Simulation<Q, R> {
    /// Assemble a simulation from its parts.
    pub fn new(
        prices: PriceModel<R>,
        scanner: OpportunityScanner<Q>,
        ledger: TradeLedger,
        iterations: u64,
    ) -> std::result::Result<Self, ConfigError> {
        if iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(Self {
            prices,
            scanner,
            ledger,
            iterations,
            completed: 0,
            pace: Duration::ZERO,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Delay between iterations.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Flag that stops the run before the next iteration once set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Parameters of this run.
    pub fn run_start(&self) -> RunStart {
        RunStart {
            initial_capital: self.ledger.state().initial_capital,
            risk_fraction: self.ledger.risk_fraction(),
            drawdown_policy: self.ledger.policy(),
            min_profit_pct: self.scanner.min_profit_pct(),
            iterations: self.iterations,
            assets: self
                .prices
                .assets()
                .iter()
                .map(|a| a.symbol.clone())
                .collect(),
            exchanges: self
                .scanner
                .exchanges()
                .iter()
                .map(|e| e.name().to_string())
                .collect(),
        }
    }

    /// Run one iteration: move prices, scan, execute.
    ///
    /// Returns `None` without touching any state once every planned
    /// iteration has run.
    #[instrument(skip(self), fields(iteration = self.completed + 1))]
    pub fn step(&mut self) -> Option<IterationOutcome> {
        if self.is_finished() {
            return None;
        }

        self.prices.advance();

        let report = {
            let _timer = metrics::timer_scan();
            self.scanner.scan(self.prices.assets())
        };

        let trade = self.ledger.execute(report.best.as_ref());
        let diagnosis = match trade {
            Some(_) => None,
            None => Some(report.diagnose()),
        };

        self.completed += 1;
        record_metrics(trade.as_ref(), self.ledger.state());

        Some(IterationOutcome {
            iteration: self.completed,
            total: self.iterations,
            trade,
            diagnosis,
        })
    }

    /// Run every remaining iteration, feeding `reporter`.
    ///
    /// The stop flag is checked between iterations; the pacing delay is
    /// skipped after the last one.
    pub async fn run<P: Reporter + ?Sized>(&mut self, reporter: &mut P) -> Result<RunSummary> {
        reporter.on_start(&self.run_start())?;
        info!(
            iterations = self.iterations,
            pace_ms = self.pace.as_millis() as u64,
            "Starting arbitrage simulation"
        );

        let mut stopped_early = false;
        while !self.is_finished() {
            if self.stop.load(Ordering::SeqCst) {
                warn!(completed = self.completed, "Stop requested, ending run early");
                stopped_early = true;
                break;
            }

            let Some(outcome) = self.step() else {
                break;
            };
            reporter.on_iteration(&outcome)?;

            if !self.pace.is_zero() && !self.is_finished() {
                tokio::time::sleep(self.pace).await;
            }
        }

        let summary = self.summary(stopped_early);
        reporter.on_finish(&summary)?;
        Ok(summary)
    }

    /// Whether every planned iteration has run.
    pub fn is_finished(&self) -> bool {
        self.completed >= self.iterations
    }

    /// Iterations run so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Aggregate results so far.
    pub fn summary(&self, stopped_early: bool) -> RunSummary {
        RunSummary::from_state(self.ledger.state(), stopped_early)
    }

    /// Portfolio so far.
    pub fn state(&self) -> &PortfolioState {
        self.ledger.state()
    }

    /// Trade history so far.
    pub fn trades(&self) -> &[TradeRecord] {
        self.ledger.trades()
    }
}

fn record_metrics(trade: Option<&TradeRecord>, state: &PortfolioState) {
    metrics::inc_iterations();
    match trade {
        Some(trade) => {
            metrics::inc_trades_executed();
            metrics::record_net_profit(trade.net_profit);
        }
        None => metrics::inc_opportunities_missed(),
    }
    metrics::set_capital(state.capital);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{Asset, Exchange, FixedQuotes};
    use crate::simulation::MemoryReporter;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn fixed_sim(sell_quote: Decimal, min_profit: Decimal, iterations: u64) -> Simulation<FixedQuotes> {
        let assets = vec![Asset::new("SOL", dec!(100)).unwrap()];
        let prices = PriceModel::new(assets, dec!(0), StdRng::seed_from_u64(0)).unwrap();
        let exchanges = vec![
            Exchange::new("A", dec!(0), dec!(0)).unwrap(),
            Exchange::new("B", dec!(0), dec!(0)).unwrap(),
        ];
        let quotes = FixedQuotes::new().with("B", "SOL", sell_quote);
        let scanner = OpportunityScanner::new(exchanges, quotes, min_profit).unwrap();
        let ledger = TradeLedger::new(dec!(10000)).unwrap();
        Simulation::new(prices, scanner, ledger, iterations).unwrap()
    }

    #[test]
    fn step_executes_and_counts() {
        let mut sim = fixed_sim(dec!(110), dec!(1), 3);

        let outcome = sim.step().unwrap();

        assert_eq!(outcome.iteration, 1);
        assert_eq!(outcome.total, 3);
        assert!(outcome.diagnosis.is_none());
        let trade = outcome.trade.unwrap();
        assert_eq!(trade.net_profit, dec!(100));
        assert_eq!(sim.state().capital, dec!(10100));
        assert_eq!(sim.completed(), 1);
        assert!(!sim.is_finished());
    }

    #[test]
    fn miss_carries_diagnosis() {
        let mut sim = fixed_sim(dec!(110), dec!(15), 1);

        let outcome = sim.step().unwrap();

        assert!(outcome.trade.is_none());
        let diagnosis = outcome.diagnosis.unwrap();
        assert_eq!(diagnosis.closest_profit_pct, Some(dec!(10)));
        assert_eq!(sim.state().missed_iterations, 1);
        assert!(sim.is_finished());
    }

    #[test]
    fn step_after_last_iteration_does_nothing() {
        let mut sim = fixed_sim(dec!(110), dec!(1), 2);
        assert_eq!(sim.step().unwrap().iteration, 1);
        assert_eq!(sim.step().unwrap().iteration, 2);
        let before = sim.state().clone();

        assert!(sim.step().is_none());
        assert!(sim.step().is_none());

        assert_eq!(sim.completed(), 2);
        assert_eq!(sim.state(), &before);
        assert_eq!(sim.trades().len(), 2);
    }

    #[test]
    fn run_start_carries_ledger_settings() {
        let sim = fixed_sim(dec!(110), dec!(1), 2);

        let start = sim.run_start();

        assert_eq!(start.initial_capital, dec!(10000));
        assert_eq!(start.risk_fraction, crate::trading::DEFAULT_RISK_FRACTION);
        assert_eq!(start.drawdown_policy, crate::trading::DrawdownPolicy::Unbounded);
        assert_eq!(start.assets, vec!["SOL"]);
        assert_eq!(start.exchanges, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn stop_flag_ends_run_before_next_iteration() {
        let mut sim = fixed_sim(dec!(110), dec!(1), 10);
        sim.stop_handle().store(true, Ordering::SeqCst);
        let mut reporter = MemoryReporter::default();

        let summary = sim.run(&mut reporter).await.unwrap();

        assert!(summary.stopped_early);
        assert_eq!(summary.iterations, 0);
        assert!(reporter.outcomes.is_empty());
        assert!(reporter.start.is_some());
        assert_eq!(reporter.summary, Some(summary));
    }

    #[test]
    fn run_completes_every_iteration() {
        let mut sim = fixed_sim(dec!(110), dec!(1), 4);
        let mut reporter = MemoryReporter::default();

        let summary = tokio_test::block_on(sim.run(&mut reporter)).unwrap();

        assert!(!summary.stopped_early);
        assert_eq!(summary.iterations, 4);
        assert_eq!(summary.successful_trades, 4);
        assert_eq!(reporter.outcomes.len(), 4);
        assert_eq!(reporter.outcomes[3].iteration, 4);
        assert!(sim.is_finished());
    }

    #[test]
    fn rejects_zero_iterations() {
        let assets = vec![Asset::new("SOL", dec!(100)).unwrap()];
        let prices = PriceModel::seeded(assets, 1).unwrap();
        let exchanges = vec![Exchange::new("A", dec!(0), dec!(0)).unwrap()];
        let scanner = OpportunityScanner::new(exchanges, FixedQuotes::new(), dec!(1)).unwrap();
        let ledger = TradeLedger::new(dec!(1)).unwrap();

        assert_eq!(
            Simulation::new(prices, scanner, ledger, 0).unwrap_err(),
            ConfigError::ZeroIterations
        );
    }

    #[test]
    fn from_config_with_seed_is_reproducible() {
        let config = Config {
            seed: Some(2024),
            iterations: 15,
            pace_ms: 0,
            ..Config::default()
        };

        let mut a = Simulation::from_config(&config).unwrap();
        let mut b = Simulation::from_config(&config).unwrap();
        for _ in 0..15 {
            let left = a.step().unwrap().trade.map(|t| t.net_profit);
            let right = b.step().unwrap().trade.map(|t| t.net_profit);
            assert_eq!(left, right);
        }
        assert_eq!(a.state(), b.state());
    }
}
