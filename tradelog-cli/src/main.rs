//! Tradelog CLI: journal statistics from a JSON or CSV trade file.
//!
//! Commands:
//! - `stats`: full dashboard for one filtered view
//! - `monthly`: per-month buckets, profit and projected balance for a year
//! - `streaks`: current and maximum win/loss streaks
//!
//! Results go to stdout as JSON; logs go to stderr (`RUST_LOG`, default `info`).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tradelog_core::stats::{
    monthly, monthly_profit, scope_to_year, streaks, total_year_profit, updated_balance,
    AggregateOptions, StreakOptions,
};
use tradelog_core::{
    compute_dashboard, load_trades, ExecutionFilter, StatsConfig, Trade, TradeFilter,
    YearBreakdown,
};

#[derive(Parser)]
#[command(
    name = "tradelog",
    about = "Tradelog CLI: trading journal performance statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every dashboard aggregate for one view.
    Stats {
        /// Trade file (.json array or .csv with header row).
        #[arg(long)]
        trades: PathBuf,

        /// Current account balance; the starting balance is derived from it.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        balance: f64,

        /// Restrict the view to one calendar year.
        #[arg(long, conflicts_with_all = ["from", "to"])]
        year: Option<i32>,

        /// Range start (YYYY-MM-DD), inclusive.
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Range end (YYYY-MM-DD), inclusive.
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Only trades on this market (case-insensitive).
        #[arg(long)]
        market: Option<String>,

        /// Which trades take part with respect to execution.
        #[arg(long, value_enum, default_value_t = Execution::Executed)]
        execution: Execution,

        /// Only trades on this account.
        #[arg(long)]
        account: Option<String>,

        /// Path to a TOML statistics config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Monthly win rates and profit for one year.
    Monthly {
        /// Trade file (.json array or .csv with header row).
        #[arg(long)]
        trades: PathBuf,

        /// Calendar year to report.
        #[arg(long)]
        year: i32,

        /// Balance at the start of the year.
        #[arg(long, allow_negative_numbers = true)]
        balance: Option<f64>,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Current and maximum win/loss streaks over executed trades.
    Streaks {
        /// Trade file (.json array or .csv with header row).
        #[arg(long)]
        trades: PathBuf,

        /// Treat break-even trades as neither win nor loss.
        #[arg(long, default_value_t = false)]
        exclude_be: bool,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Execution {
    /// Executed trades only.
    Executed,
    /// Executed and non-executed trades.
    All,
    /// Non-executed trades only.
    NonExecuted,
}

impl From<Execution> for ExecutionFilter {
    fn from(value: Execution) -> Self {
        match value {
            Execution::Executed => ExecutionFilter::ExecutedOnly,
            Execution::All => ExecutionFilter::IncludeNonExecuted,
            Execution::NonExecuted => ExecutionFilter::NonExecutedOnly,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats {
            trades,
            balance,
            year,
            from,
            to,
            market,
            execution,
            account,
            config,
            pretty,
        } => run_stats(
            &trades,
            balance,
            build_filter(year, from.as_deref(), to.as_deref(), market, execution, account)?,
            config.as_deref(),
            pretty,
        ),
        Commands::Monthly {
            trades,
            year,
            balance,
            pretty,
        } => run_monthly(&trades, year, balance, pretty),
        Commands::Streaks {
            trades,
            exclude_be,
            pretty,
        } => run_streaks(&trades, exclude_be, pretty),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_filter(
    year: Option<i32>,
    from: Option<&str>,
    to: Option<&str>,
    market: Option<String>,
    execution: Execution,
    account: Option<String>,
) -> Result<TradeFilter> {
    let mut filter = match (year, from, to) {
        (Some(y), _, _) => TradeFilter::year(y),
        (None, Some(from), Some(to)) => {
            let start = parse_date(from)?;
            let end = parse_date(to)?;
            if start > end {
                bail!("--from {start} is after --to {end}");
            }
            TradeFilter::range(start, end)
        }
        _ => TradeFilter::default(),
    };
    filter = filter.with_execution(execution.into());
    if let Some(m) = market {
        filter = filter.with_market(m);
    }
    if let Some(a) = account {
        filter = filter.with_account(a);
    }
    Ok(filter)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
}

fn read_trades(path: &Path) -> Result<Vec<Trade>> {
    let trades = load_trades(path).with_context(|| format!("loading {}", path.display()))?;
    tracing::info!(count = trades.len(), path = %path.display(), "trades loaded");
    Ok(trades)
}

fn run_stats(
    trades_path: &Path,
    balance: f64,
    filter: TradeFilter,
    config_path: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    if !balance.is_finite() {
        bail!("--balance must be a finite number");
    }
    let config = match config_path {
        Some(path) => StatsConfig::from_file(path)?,
        None => StatsConfig::default(),
    };
    let trades = read_trades(trades_path)?;

    let stats = compute_dashboard(&trades, &filter, balance, &config);
    tracing::info!(
        view = %stats.view_key,
        trades = stats.trade_count,
        "dashboard ready"
    );
    print_json(&stats, pretty)
}

fn run_monthly(trades_path: &Path, year: i32, balance: Option<f64>, pretty: bool) -> Result<()> {
    let trades = scope_to_year(&read_trades(trades_path)?, year);
    let executed: Vec<Trade> = trades.into_iter().filter(|t| t.executed).collect();

    let profit = monthly_profit(&executed, false);
    let total = total_year_profit(&profit);
    let report = YearBreakdown {
        year,
        months: monthly(&executed, AggregateOptions::default()),
        total_year_profit: total,
        updated_balance: updated_balance(balance, total),
        profit,
    };
    print_json(&report, pretty)
}

fn run_streaks(trades_path: &Path, exclude_be: bool, pretty: bool) -> Result<()> {
    let trades = read_trades(trades_path)?;
    let summary = streaks(
        &trades,
        StreakOptions {
            exclude_break_even: exclude_be,
            ..StreakOptions::default()
        },
    );
    print_json(&summary, pretty)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
