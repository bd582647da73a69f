//! End-to-end tests for the arbitrage simulator.
//!
//! Quotes are forced with `FixedQuotes` where exact figures matter, and
//! seeded RNGs are used everywhere else so runs are reproducible.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use xarb_sim::arbitrage::{calculate_opportunity, OpportunityScanner};
use xarb_sim::config::Config;
use xarb_sim::market::{Asset, Exchange, FixedQuotes, PriceModel, Quote, RandomQuotes};
use xarb_sim::simulation::{JsonReporter, MemoryReporter, Simulation};
use xarb_sim::trading::{DrawdownPolicy, TradeLedger};
use xarb_sim::ConfigError;

/// SOL at 100 on two fee-free, zero-variation exchanges, with B quoting `b_quote`.
fn sol_simulation(b_quote: Decimal, min_profit: Decimal, iterations: u64) -> Simulation<FixedQuotes> {
    let assets = vec![Asset::new("SOL", dec!(100)).unwrap()];
    let prices = PriceModel::new(assets, dec!(0), StdRng::seed_from_u64(1)).unwrap();
    let exchanges = vec![
        Exchange::new("A", dec!(0), dec!(0)).unwrap(),
        Exchange::new("B", dec!(0), dec!(0)).unwrap(),
    ];
    let quotes = FixedQuotes::new().with("B", "SOL", b_quote);
    let scanner = OpportunityScanner::new(exchanges, quotes, min_profit).unwrap();
    let ledger = TradeLedger::new(dec!(10000)).unwrap();

    Simulation::new(prices, scanner, ledger, iterations).unwrap()
}

#[test]
fn ten_percent_spread_is_traded() {
    let mut sim = sol_simulation(dec!(110), dec!(1), 1);

    let outcome = sim.step().expect("one iteration planned");

    let trade = outcome.trade.expect("spread clears the threshold");
    assert_eq!(trade.asset, "SOL");
    assert_eq!(trade.buy_exchange, "A");
    assert_eq!(trade.sell_exchange, "B");
    assert_eq!(trade.quantity, dec!(10));
    assert_eq!(trade.net_profit, dec!(100));
    assert_eq!(trade.profit_pct, dec!(10));
    assert_eq!(trade.capital_after, dec!(10100));

    let state = sim.state();
    assert_eq!(state.capital, dec!(10100));
    assert_eq!(state.total_profit, dec!(100));
    assert_eq!(state.successful_trades, 1);
    assert_eq!(state.missed_iterations, 0);
}

#[test]
fn spread_below_threshold_is_missed() {
    let mut sim = sol_simulation(dec!(110), dec!(15), 1);

    let outcome = sim.step().expect("one iteration planned");

    assert!(outcome.trade.is_none());
    let diagnosis = outcome.diagnosis.expect("miss carries a diagnosis");
    assert_eq!(diagnosis.closest_asset.as_deref(), Some("SOL"));
    assert_eq!(diagnosis.threshold, dec!(15));

    let state = sim.state();
    assert_eq!(state.capital, dec!(10000));
    assert_eq!(state.total_profit, dec!(0));
    assert_eq!(state.successful_trades, 0);
    assert_eq!(state.missed_iterations, 1);
    assert!(sim.trades().is_empty());
}

#[test]
fn single_exchange_never_trades() {
    for threshold in [dec!(-100), dec!(-1), dec!(0), dec!(1)] {
        let assets = vec![
            Asset::new("BTC", dec!(45000)).unwrap(),
            Asset::new("DOGE", dec!(0.08)).unwrap(),
        ];
        let prices = PriceModel::seeded(assets, 11).unwrap();
        let exchanges = vec![Exchange::new("Solo", dec!(0.1), dec!(0.02)).unwrap()];
        let scanner =
            OpportunityScanner::new(exchanges, RandomQuotes::seeded(12), threshold).unwrap();
        let ledger = TradeLedger::new(dec!(10000)).unwrap();
        let mut sim = Simulation::new(prices, scanner, ledger, 50).unwrap();

        while let Some(outcome) = sim.step() {
            assert!(outcome.trade.is_none(), "threshold {threshold}");
        }

        assert_eq!(sim.state().successful_trades, 0);
        assert_eq!(sim.state().missed_iterations, 50);
        assert_eq!(sim.state().capital, dec!(10000));
    }
}

#[test]
fn summary_without_trades_has_no_average() {
    let mut sim = sol_simulation(dec!(100), dec!(1), 3);
    while sim.step().is_some() {}

    let summary = sim.summary(false);

    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.successful_trades, 0);
    assert_eq!(summary.missed_iterations, 3);
    assert_eq!(summary.avg_profit_per_trade, None);
    assert_eq!(summary.success_rate, Some(dec!(0)));
    assert_eq!(summary.final_capital, dec!(10000));
}

#[tokio::test]
async fn compounding_run_reports_every_iteration() {
    let mut sim = sol_simulation(dec!(110), dec!(1), 3);
    let mut reporter = MemoryReporter::default();

    let summary = sim.run(&mut reporter).await.unwrap();

    assert_eq!(reporter.outcomes.len(), 3);
    let profits: Vec<Decimal> = reporter.trades().map(|t| t.net_profit).collect();
    // 10% of 10000, then of 10100, then of 10201
    assert_eq!(profits, vec![dec!(100), dec!(101), dec!(102.01)]);
    assert_eq!(summary.final_capital, dec!(10303.01));
    assert_eq!(summary.total_profit, dec!(303.01));
    assert_eq!(summary.avg_profit_per_trade, Some(dec!(303.01) / dec!(3)));
    assert!(!summary.stopped_early);
    assert_eq!(reporter.summary, Some(summary));
}

#[tokio::test]
async fn seeded_default_config_runs_to_completion() {
    let config = Config {
        seed: Some(42),
        iterations: 25,
        pace_ms: 0,
        ..Config::default()
    };
    let mut sim = Simulation::from_config(&config).unwrap();
    let mut reporter = MemoryReporter::default();

    let summary = sim.run(&mut reporter).await.unwrap();

    assert_eq!(summary.iterations, 25);
    assert_eq!(
        summary.successful_trades + summary.missed_iterations,
        summary.iterations
    );
    assert_eq!(
        summary.final_capital,
        summary.initial_capital + summary.total_profit
    );

    let start = reporter.start.expect("start recorded");
    assert_eq!(start.exchanges, vec!["Binance", "Coinbase", "Kraken", "Bybit"]);
    assert_eq!(start.assets.len(), 8);

    for outcome in &reporter.outcomes {
        match &outcome.trade {
            Some(trade) => {
                assert!(outcome.diagnosis.is_none());
                assert!(trade.profit_pct >= dec!(1));
                assert_ne!(trade.buy_exchange, trade.sell_exchange);
            }
            None => assert!(outcome.diagnosis.is_some()),
        }
    }
}

#[test]
fn floor_policy_from_environment_clamps_capital() {
    let vars = [
        ("DRAWDOWN_POLICY", "floor_at_zero"),
        ("INITIAL_CAPITAL", "100"),
        ("RISK_FRACTION", "1"),
        ("SEED", "3"),
    ]
    .map(|(k, v)| (k.to_string(), v.to_string()));
    let config: Config = envy::from_iter(vars).unwrap();

    let sim = Simulation::from_config(&config).unwrap();
    let start = sim.run_start();
    assert_eq!(start.drawdown_policy, DrawdownPolicy::FloorAtZero);
    assert_eq!(start.risk_fraction, dec!(1));

    // fees of 90% on both legs turn any spread into a heavy loss
    let gouger = Exchange::new("Gouger", dec!(90), dec!(0)).unwrap();
    let quotes = [Quote {
        exchange: &gouger,
        price: dec!(100),
    }];
    let loss = calculate_opportunity("SOL", &quotes).unwrap();

    let mut ledger = TradeLedger::with_options(
        config.initial_capital,
        config.risk_fraction,
        config.drawdown_policy().unwrap(),
    )
    .unwrap();
    let record = ledger.execute(Some(&loss)).unwrap();

    // buy 1 @ 100 + 90 fee, sell 1 @ 100 - 90 fee
    assert_eq!(record.net_profit, dec!(-180));
    assert_eq!(record.capital_after, dec!(0));
    assert_eq!(ledger.state().capital, dec!(0));
    assert_eq!(ledger.state().total_profit, dec!(-180));
}

#[tokio::test]
async fn same_seed_gives_same_run() {
    let config = Config {
        seed: Some(7),
        iterations: 30,
        pace_ms: 0,
        ..Config::default()
    };

    let mut first = Simulation::from_config(&config).unwrap();
    let mut second = Simulation::from_config(&config).unwrap();
    let left = first.run(&mut MemoryReporter::default()).await.unwrap();
    let right = second.run(&mut MemoryReporter::default()).await.unwrap();

    assert_eq!(left, right);
}

#[tokio::test]
async fn json_reporter_emits_one_line_per_event() {
    let mut sim = sol_simulation(dec!(110), dec!(1), 2);
    let mut reporter = JsonReporter::new(Vec::new());

    sim.run(&mut reporter).await.unwrap();

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    let events: Vec<serde_json::Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    // start, two iterations, summary
    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["event"], "start");
    assert_eq!(events[1]["event"], "iteration");
    assert_eq!(events[3]["event"], "summary");
}

#[test]
fn invalid_configuration_fails_fast() {
    let config = Config {
        sim_exchanges: "Binance:-0.1:0.01".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        Simulation::from_config(&config),
        Err(ConfigError::NegativeFeeRate { .. })
    ));

    let config = Config {
        initial_capital: dec!(0),
        ..Config::default()
    };
    assert!(matches!(
        Simulation::from_config(&config),
        Err(ConfigError::NonPositiveCapital(_))
    ));

    let config = Config {
        sim_assets: String::new(),
        ..Config::default()
    };
    assert!(Simulation::from_config(&config).is_err());
}
