//! Cross-exchange arbitrage simulator entry point.

use std::io::Write;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xarb_sim::arbitrage::break_even_spread_pct;
use xarb_sim::config::{Config, VERBOSE_LOG_DIRECTIVE};
use xarb_sim::metrics;
use xarb_sim::simulation::{ConsoleReporter, JsonReporter, LogReporter, Reporter, Simulation};
use xarb_sim::utils::stop_on_shutdown;

/// Cross-exchange arbitrage simulator.
#[derive(Parser, Debug)]
#[command(name = "xarb-sim")]
#[command(about = "Simulated cross-exchange crypto arbitrage with synthetic prices")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

/// Overrides accepted before or after the subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
struct RunArgs {
    /// Number of iterations.
    #[arg(short = 'n', long, global = true)]
    iterations: Option<u64>,

    /// Minimum profit percentage to trade.
    #[arg(long, global = true)]
    min_profit: Option<Decimal>,

    /// Starting capital.
    #[arg(long, global = true)]
    capital: Option<Decimal>,

    /// RNG seed for a reproducible run.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Delay between iterations in milliseconds.
    #[arg(long, global = true)]
    pace_ms: Option<u64>,

    /// Emit JSON lines instead of the console report.
    #[arg(long, global = true, conflicts_with = "log")]
    json: bool,

    /// Report through the log instead of the console.
    #[arg(long, global = true)]
    log: bool,

    /// Print a Prometheus metrics snapshot at exit.
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation (default).
    Run,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration first, it carries the log settings
    let config = load_config(&args.run);

    // Initialize logging (stderr, so JSON output on stdout stays clean)
    let directive = match &config {
        Ok(config) => config.log_directive(args.verbose),
        Err(_) if args.verbose => VERBOSE_LOG_DIRECTIVE,
        Err(_) => "info",
    };
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = &config {
        error!("Failed to load configuration: {}", e);
    }

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::Run) | None => cmd_run(config?, &args.run).await,
    }
}

/// Load configuration and apply CLI overrides.
fn load_config(overrides: &RunArgs) -> anyhow::Result<Config> {
    let mut config = Config::load()?;

    if let Some(iterations) = overrides.iterations {
        config.iterations = iterations;
    }
    if let Some(min_profit) = overrides.min_profit {
        config.min_profit_pct = min_profit;
    }
    if let Some(capital) = overrides.capital {
        config.initial_capital = capital;
    }
    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }
    if let Some(pace_ms) = overrides.pace_ms {
        config.pace_ms = pace_ms;
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config(loaded: anyhow::Result<Config>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ARBITRAGE SIMULATOR - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match loaded {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    let exchanges = config.exchanges()?;
    let assets = config.assets()?;

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Initial Capital: ${}", config.initial_capital);
    println!("  Risk Fraction: {}", config.risk_fraction);
    println!("  Drawdown Policy: {}", config.drawdown_policy()?);
    println!("  Iterations: {}", config.iterations);
    println!("  Min Profit: {}%", config.min_profit_pct);
    println!("  Pace: {}ms", config.pace_ms);
    match config.seed {
        Some(seed) => println!("  Seed: {}", seed),
        None => println!("  Seed: (entropy)"),
    }
    println!("  Exchanges:");
    for ex in &exchanges {
        println!(
            "    - {} (fee {}%, variation ±{}%)",
            ex.name(),
            ex.fee_rate(),
            ex.price_variation() * Decimal::ONE_HUNDRED
        );
    }
    println!("  Assets:");
    for asset in &assets {
        println!("    - {} @ ${}", asset.symbol, asset.base_price);
    }

    println!("  Break-even spreads (buy -> sell):");
    for buy in &exchanges {
        for sell in exchanges.iter().filter(|s| s.name() != buy.name()) {
            println!(
                "    {} -> {}: {:.4}%",
                buy.name(),
                sell.name(),
                break_even_spread_pct(buy.fee_rate(), sell.fee_rate())
            );
        }
    }

    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the simulation.
async fn cmd_run(config: Config, run: &RunArgs) -> anyhow::Result<()> {
    let prometheus = if run.metrics {
        Some(metrics::install_prometheus()?)
    } else {
        None
    };

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!(
        iterations = config.iterations,
        min_profit_pct = %config.min_profit_pct,
        capital = %config.initial_capital,
        seed = ?config.seed,
        "Starting simulation"
    );

    let mut simulation = Simulation::from_config(&config)?;
    let watcher = stop_on_shutdown(simulation.stop_handle());

    let mut reporter: Box<dyn Reporter> = if run.json {
        Box::new(JsonReporter::new(std::io::stdout()))
    } else if run.log {
        Box::new(LogReporter)
    } else {
        Box::new(ConsoleReporter::stdout())
    };

    let summary = simulation.run(reporter.as_mut()).await?;
    watcher.abort();

    info!(
        trades = summary.successful_trades,
        missed = summary.missed_iterations,
        total_profit = %summary.total_profit,
        "Simulation finished"
    );

    if let Some(handle) = prometheus {
        write_metrics_snapshot(
            &handle.render(),
            run.json,
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )?;
    }

    Ok(())
}

/// Print the metrics snapshot, on stderr when stdout carries JSON lines.
fn write_metrics_snapshot(
    rendered: &str,
    json: bool,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> std::io::Result<()> {
    if json {
        write!(stderr, "{}", rendered)
    } else {
        writeln!(stdout)?;
        write!(stdout, "{}", rendered)
    }
}
