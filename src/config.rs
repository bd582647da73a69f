//! Application configuration loaded from environment variables.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::market::{Asset, Exchange};
use crate::trading::DrawdownPolicy;

/// Filter directive used for verbose logging.
pub const VERBOSE_LOG_DIRECTIVE: &str = "xarb_sim=debug,info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Portfolio ===
    /// Starting capital.
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,

    /// Share of current capital committed per trade (0.1 = 10%).
    #[serde(default = "default_risk_fraction")]
    pub risk_fraction: Decimal,

    /// Drawdown policy: "unbounded" or "floor_at_zero".
    #[serde(default = "default_drawdown_policy")]
    pub drawdown_policy: String,

    // === Run ===
    /// Number of iterations to simulate.
    #[serde(default = "default_iterations")]
    pub iterations: u64,

    /// Minimum profit percentage to trade (1.0 = 1%).
    #[serde(default = "default_min_profit_pct")]
    pub min_profit_pct: Decimal,

    /// Delay between iterations in milliseconds.
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,

    /// RNG seed; unset draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    // === Market ===
    /// Exchanges as `NAME:FEE_PCT:VARIATION`, comma separated.
    #[serde(default = "default_exchanges")]
    pub sim_exchanges: String,

    /// Assets as `SYMBOL:PRICE`, comma separated.
    #[serde(default = "default_assets")]
    pub sim_assets: String,

    /// Maximum base price move per iteration (0.005 = ±0.5%).
    #[serde(default = "default_price_step")]
    pub price_step: Decimal,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_initial_capital() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_risk_fraction() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

fn default_drawdown_policy() -> String {
    DrawdownPolicy::default().to_string()
}

fn default_iterations() -> u64 {
    20
}

fn default_min_profit_pct() -> Decimal {
    Decimal::ONE
}

fn default_pace_ms() -> u64 {
    1000
}

fn default_exchanges() -> String {
    "Binance:0.1:0.015,Coinbase:0.5:0.02,Kraken:0.26:0.018,Bybit:0.1:0.012".to_string()
}

fn default_assets() -> String {
    "BTC:45000,ETH:2500,BNB:320,SOL:100,ADA:0.50,XRP:0.60,DOGE:0.08,MATIC:0.85".to_string()
}

fn default_price_step() -> Decimal {
    Decimal::new(5, 3) // 0.005
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            risk_fraction: default_risk_fraction(),
            drawdown_policy: default_drawdown_policy(),
            iterations: default_iterations(),
            min_profit_pct: default_min_profit_pct(),
            pace_ms: default_pace_ms(),
            seed: None,
            sim_exchanges: default_exchanges(),
            sim_assets: default_assets(),
            price_step: default_price_step(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

/// Split a comma-separated list, skipping blank entries.
fn parse_list<T: FromStr<Err = ConfigError>>(raw: &str) -> Result<Vec<T>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(T::from_str)
        .collect()
}

fn ensure_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Configured exchanges in order.
    pub fn exchanges(&self) -> Result<Vec<Exchange>, ConfigError> {
        let exchanges: Vec<Exchange> = parse_list(&self.sim_exchanges)?;
        if exchanges.is_empty() {
            return Err(ConfigError::NoExchanges);
        }
        ensure_unique("exchange", exchanges.iter().map(Exchange::name))?;
        Ok(exchanges)
    }

    /// Configured assets in order.
    pub fn assets(&self) -> Result<Vec<Asset>, ConfigError> {
        let assets: Vec<Asset> = parse_list(&self.sim_assets)?;
        if assets.is_empty() {
            return Err(ConfigError::NoAssets);
        }
        ensure_unique("asset", assets.iter().map(|a| a.symbol.as_str()))?;
        Ok(assets)
    }

    /// Tracing filter directive: `VERBOSE_LOG_DIRECTIVE` when verbose logging
    /// is requested here or on the command line, `rust_log` otherwise.
    pub fn log_directive(&self, verbose_flag: bool) -> &str {
        if verbose_flag || self.verbose {
            VERBOSE_LOG_DIRECTIVE
        } else {
            &self.rust_log
        }
    }

    /// Parsed drawdown policy.
    pub fn drawdown_policy(&self) -> Result<DrawdownPolicy, ConfigError> {
        DrawdownPolicy::from_str(self.drawdown_policy.trim()).map_err(|e| ConfigError::Parse {
            kind: "drawdown policy",
            entry: self.drawdown_policy.clone(),
            reason: e.to_string(),
        })
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }

        if self.risk_fraction <= Decimal::ZERO || self.risk_fraction > Decimal::ONE {
            return Err(ConfigError::InvalidRiskFraction(self.risk_fraction));
        }

        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        if self.price_step < Decimal::ZERO || self.price_step >= Decimal::ONE {
            return Err(ConfigError::InvalidPriceStep(self.price_step));
        }

        self.exchanges()?;
        self.assets()?;
        self.drawdown_policy()?;

        Ok(())
    }
}
