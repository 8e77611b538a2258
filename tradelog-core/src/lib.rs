//! Tradelog Core: performance statistics for a trading journal.
//!
//! This crate turns a materialized list of journal trades into dashboard
//! aggregates:
//! - Outcome classification (win / loss / break-even / non-executed)
//! - Per-category, per-month and per-flag win-rate buckets
//! - Chronological streaks
//! - Equity replay with max and average drawdown
//! - Consistency, Sharpe-like ratio, profit factor and R-multiple scores
//! - A reconciler that scopes all of the above to one filtered view
//!
//! All statistics are pure functions of their input; the only I/O lives in
//! [`load`] and [`config`].

pub mod config;
pub mod dashboard;
pub mod domain;
pub mod filter;
pub mod load;
pub mod stats;

pub use config::{ConfigError, StatsConfig};
pub use dashboard::{compute_dashboard, DashboardStats, ViewKey, YearBreakdown};
pub use domain::{Direction, Outcome, Trade, TradeOutcome};
pub use filter::{ExecutionFilter, TradeFilter, ViewScope};
pub use load::{load_trades, trades_from_csv_reader, trades_from_json_str, LoadError};
pub use stats::{
    CategoryKey, DrawdownStats, EquityPoint, FlagStats, MacroStats, MonthOfYear, MonthlyProfit,
    StatBucket, Streaks, TotalMode,
};
