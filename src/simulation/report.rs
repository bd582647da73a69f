//! Structured run output and the reporters that consume it.
//!
//! The driver only emits [`RunStart`], [`IterationOutcome`] and
//! [`RunSummary`] values; everything human-facing lives in a [`Reporter`].

use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::arbitrage::NoOpportunityDiagnosis;
use crate::error::Result;
use crate::trading::{DrawdownPolicy, PortfolioState, TradeRecord};

/// Parameters of a run, emitted once before the first iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStart {
    /// Starting capital.
    pub initial_capital: Decimal,
    /// Share of capital committed per trade.
    pub risk_fraction: Decimal,
    /// What happens when capital would go negative.
    pub drawdown_policy: DrawdownPolicy,
    /// Minimum profit percentage.
    pub min_profit_pct: Decimal,
    /// Planned iteration count.
    pub iterations: u64,
    /// Asset symbols in scan order.
    pub assets: Vec<String>,
    /// Exchange names in quote order.
    pub exchanges: Vec<String>,
}

/// Result of one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationOutcome {
    /// 1-based iteration number.
    pub iteration: u64,
    /// Planned iteration count.
    pub total: u64,
    /// Executed trade, if any.
    pub trade: Option<TradeRecord>,
    /// Why nothing traded, when nothing did.
    pub diagnosis: Option<NoOpportunityDiagnosis>,
}

/// Aggregate results of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Iterations actually run.
    pub iterations: u64,
    /// Iterations that traded.
    pub successful_trades: u64,
    /// Iterations without a qualifying opportunity.
    pub missed_iterations: u64,
    /// successful / iterations; absent when no iteration ran.
    pub success_rate: Option<Decimal>,
    /// Sum of net profit.
    pub total_profit: Decimal,
    /// Starting capital.
    pub initial_capital: Decimal,
    /// Ending capital.
    pub final_capital: Decimal,
    /// Total profit over starting capital, in percent.
    pub roi_pct: Option<Decimal>,
    /// Mean net profit per trade; absent without trades.
    pub avg_profit_per_trade: Option<Decimal>,
    /// Whether the stop signal cut the run short.
    pub stopped_early: bool,
}

impl RunSummary {
    /// Summarize a portfolio.
    pub fn from_state(state: &PortfolioState, stopped_early: bool) -> Self {
        Self {
            iterations: state.iterations(),
            successful_trades: state.successful_trades,
            missed_iterations: state.missed_iterations,
            success_rate: state.success_rate(),
            total_profit: state.total_profit,
            initial_capital: state.initial_capital,
            final_capital: state.capital,
            roi_pct: state.roi_pct(),
            avg_profit_per_trade: state.avg_profit_per_trade(),
            stopped_early,
        }
    }
}

/// Consumer of simulation output.
pub trait Reporter {
    /// Called once before the first iteration.
    fn on_start(&mut self, _start: &RunStart) -> Result<()> {
        Ok(())
    }

    /// Called after every iteration.
    fn on_iteration(&mut self, outcome: &IterationOutcome) -> Result<()>;

    /// Called once after the last iteration.
    fn on_finish(&mut self, summary: &RunSummary) -> Result<()>;
}

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Human-readable report written to any `Write` (stdout in the binary).
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    out: W,
}

impl ConsoleReporter<std::io::Stdout> {
    /// Report to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Report to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_trade(&mut self, trade: &TradeRecord) -> std::io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "ARBITRAGE TRADE EXECUTED - #{} at {}", trade.seq, trade.timestamp)?;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "Asset:              {}", trade.asset)?;
        writeln!(out, "Quantity:           {:.6}", trade.quantity)?;
        writeln!(out)?;
        writeln!(out, "BUY ORDER:")?;
        writeln!(out, "  Exchange:         {}", trade.buy_exchange)?;
        writeln!(out, "  Price:            ${:.2}", trade.buy_price)?;
        writeln!(out, "  Notional:         ${:.2}", trade.notional())?;
        writeln!(out, "  Fee:              ${:.2}", trade.buy_fee)?;
        writeln!(out, "  Total Cost:       ${:.2}", trade.total_cost)?;
        writeln!(out)?;
        writeln!(out, "SELL ORDER:")?;
        writeln!(out, "  Exchange:         {}", trade.sell_exchange)?;
        writeln!(out, "  Price:            ${:.2}", trade.sell_price)?;
        writeln!(out, "  Fee:              ${:.2}", trade.sell_fee)?;
        writeln!(out, "  Total Revenue:    ${:.2}", trade.total_revenue)?;
        writeln!(out)?;
        writeln!(out, "RESULTS:")?;
        writeln!(out, "  Total Fees:       ${:.2}", trade.total_fees)?;
        writeln!(
            out,
            "  Net Profit/Loss:  ${:.2} ({:+.2}%)",
            trade.net_profit, trade.profit_pct
        )?;
        writeln!(out, "  Capital After:    ${:.2}", trade.capital_after)?;
        writeln!(out, "{}", RULE)?;
        writeln!(out)
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_start(&mut self, start: &RunStart) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "CROSS-EXCHANGE ARBITRAGE SIMULATOR")?;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "Initial Capital:    ${:.2}", start.initial_capital)?;
        writeln!(
            out,
            "Trade Size:         {}% of capital",
            start.risk_fraction * Decimal::ONE_HUNDRED
        )?;
        writeln!(out, "Drawdown Policy:    {}", start.drawdown_policy)?;
        writeln!(out, "Min Profit:         {}%", start.min_profit_pct)?;
        writeln!(out, "Iterations:         {}", start.iterations)?;
        writeln!(out, "Assets Monitored:   {}", start.assets.join(", "))?;
        writeln!(out, "Exchanges:          {}", start.exchanges.join(", "))?;
        writeln!(out, "{}", RULE)?;
        writeln!(out)?;
        Ok(())
    }

    fn on_iteration(&mut self, outcome: &IterationOutcome) -> Result<()> {
        writeln!(self.out, "{}", THIN_RULE)?;
        writeln!(self.out, "Iteration {}/{}", outcome.iteration, outcome.total)?;
        writeln!(self.out, "{}", THIN_RULE)?;

        match (&outcome.trade, &outcome.diagnosis) {
            (Some(trade), _) => self.write_trade(trade)?,
            (None, Some(diagnosis)) => {
                writeln!(self.out, "No profitable opportunity: {}", diagnosis)?;
                writeln!(self.out)?;
            }
            (None, None) => {
                writeln!(self.out, "No profitable opportunity found (below threshold).")?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<()> {
        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "OVERALL TRADING SUMMARY")?;
        writeln!(out, "{}", RULE)?;
        if summary.stopped_early {
            writeln!(out, "(stopped early)")?;
        }
        writeln!(out, "Total Iterations:     {}", summary.iterations)?;
        writeln!(out, "Successful Trades:    {}", summary.successful_trades)?;
        writeln!(out, "Missed Opportunities: {}", summary.missed_iterations)?;
        if let Some(rate) = summary.success_rate {
            writeln!(out, "Success Rate:         {:.1}%", rate * Decimal::ONE_HUNDRED)?;
        }
        writeln!(out)?;
        writeln!(out, "Total Profit/Loss:    ${:.2}", summary.total_profit)?;
        writeln!(out, "Final Capital:        ${:.2}", summary.final_capital)?;
        if let Some(roi) = summary.roi_pct {
            writeln!(out, "ROI:                  {:+.2}%", roi)?;
        }
        if let Some(avg) = summary.avg_profit_per_trade {
            writeln!(out, "Avg Profit/Trade:     ${:.2}", avg)?;
        }
        writeln!(out, "{}", RULE)?;
        out.flush()?;
        Ok(())
    }
}

/// One JSON object per line: `{"event": "...", ...}`.
#[derive(Debug)]
pub struct JsonReporter<W> {
    out: W,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Start(&'a RunStart),
    Iteration(&'a IterationOutcome),
    Summary(&'a RunSummary),
}

impl<W: Write> JsonReporter<W> {
    /// Report to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: JsonEvent<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, &event)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_start(&mut self, start: &RunStart) -> Result<()> {
        self.emit(JsonEvent::Start(start))
    }

    fn on_iteration(&mut self, outcome: &IterationOutcome) -> Result<()> {
        self.emit(JsonEvent::Iteration(outcome))
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<()> {
        self.emit(JsonEvent::Summary(summary))?;
        self.out.flush()?;
        Ok(())
    }
}

/// Reports through `tracing` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn on_start(&mut self, start: &RunStart) -> Result<()> {
        info!(
            capital = %start.initial_capital,
            min_profit_pct = %start.min_profit_pct,
            iterations = start.iterations,
            policy = %start.drawdown_policy,
            "Monitoring {} across {}",
            start.assets.join(", "),
            start.exchanges.join(", ")
        );
        Ok(())
    }

    fn on_iteration(&mut self, outcome: &IterationOutcome) -> Result<()> {
        match (&outcome.trade, &outcome.diagnosis) {
            (Some(trade), _) => info!(
                "[Iteration {}/{}] {} {}->{} net ${:.2}, capital ${:.2}",
                outcome.iteration,
                outcome.total,
                trade.asset,
                trade.buy_exchange,
                trade.sell_exchange,
                trade.net_profit,
                trade.capital_after
            ),
            (None, Some(diagnosis)) => info!(
                "[Iteration {}/{}] No arbitrage: {}",
                outcome.iteration, outcome.total, diagnosis
            ),
            (None, None) => info!("[Iteration {}/{}] No arbitrage", outcome.iteration, outcome.total),
        }
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<()> {
        info!("========================================");
        info!("SIMULATION COMPLETE");
        info!("========================================");
        info!("Iterations:        {}", summary.iterations);
        info!("Successful trades: {}", summary.successful_trades);
        info!("Missed:            {}", summary.missed_iterations);
        info!("Total profit:      ${:.2}", summary.total_profit);
        info!("Final capital:     ${:.2}", summary.final_capital);
        info!("========================================");
        Ok(())
    }
}

/// Keeps everything it is given; used by tests and embedders.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    /// Start record, once received.
    pub start: Option<RunStart>,
    /// Every iteration outcome, in order.
    pub outcomes: Vec<IterationOutcome>,
    /// Summary, once received.
    pub summary: Option<RunSummary>,
}

impl MemoryReporter {
    /// Executed trades, in order.
    pub fn trades(&self) -> impl Iterator<Item = &TradeRecord> {
        self.outcomes.iter().filter_map(|o| o.trade.as_ref())
    }
}

impl Reporter for MemoryReporter {
    fn on_start(&mut self, start: &RunStart) -> Result<()> {
        self.start = Some(start.clone());
        Ok(())
    }

    fn on_iteration(&mut self, outcome: &IterationOutcome) -> Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}
