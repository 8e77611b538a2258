//! Statistics engine: pure functions from a trade list to aggregates.
//!
//! Every function takes the already scoped trade slice plus explicit options
//! and holds no state between calls. Leaves first:
//! - `bucket`: win/loss/BE counts and rates
//! - `category`: per-key breakdowns
//! - `streak`: chronological streak walk
//! - `equity`: running-balance replay and drawdown
//! - `monthly`: per-month counts and profit
//! - `flags`: partials / re-entry / break-even buckets
//! - `macro_stats`: consistency, Sharpe-like ratio, profit factor, R scores

pub mod bucket;
pub mod category;
pub mod equity;
pub mod flags;
pub mod macro_stats;
pub mod monthly;
pub mod streak;

pub use bucket::{percentage, StatBucket, TotalMode};
pub use category::{aggregate, all_breakdowns, breakdown, overall, AggregateOptions, CategoryKey};
pub use equity::{derive_starting_balance, drawdown, equity_curve, DrawdownStats, EquityPoint};
pub use flags::{flag_stats, FlagStats};
pub use macro_stats::{compose, MacroOptions, MacroStats};
pub use monthly::{
    monthly, monthly_profit, scope_to_year, total_year_profit, updated_balance, MonthOfYear,
    MonthlyProfit,
};
pub use streak::{streaks, StreakOptions, Streaks};

use crate::domain::Trade;

/// Dated trades in ascending date order; ties keep input order.
pub(crate) fn chronological(trades: &[Trade]) -> Vec<&Trade> {
    let mut dated: Vec<&Trade> = trades.iter().filter(|t| t.trade_date.is_some()).collect();
    if dated.len() < trades.len() {
        tracing::debug!(
            skipped = trades.len() - dated.len(),
            "undated trades left out of chronological walk"
        );
    }
    dated.sort_by_key(|t| t.trade_date);
    dated
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
