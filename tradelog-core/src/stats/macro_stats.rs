//! Macro stats: headline scores composed from the lower-level aggregates.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::equity::EquityPoint;
use super::monthly::MonthlyProfit;
use super::{mean_f64, std_dev};
use crate::domain::{Outcome, Trade};

/// Default profit factor reported when there are wins but no losses.
pub const DEFAULT_PROFIT_FACTOR_CAP: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroOptions {
    pub include_non_executed: bool,
    pub profit_factor_cap: f64,
    pub sqn_sample_cap: usize,
}

impl Default for MacroOptions {
    fn default() -> Self {
        Self {
            include_non_executed: false,
            profit_factor_cap: DEFAULT_PROFIT_FACTOR_CAP,
            sqn_sample_cap: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroStats {
    /// Percent of active months that closed with positive profit.
    pub consistency_score: f64,
    pub profitable_months: usize,
    pub active_months: usize,
    /// Mean / std-dev of per-trade percentage returns (not annualized).
    pub sharpe_ratio: f64,
    pub profit_factor: f64,
    pub trade_quality_index: f64,
    pub average_r_multiple: f64,
    /// Net profit of the dated trades in view, matching the equity replay.
    pub total_profit: f64,
    pub average_win: f64,
    pub average_loss: f64,
    /// Mean profit per counted trade.
    pub expectancy: f64,
    pub scored_trades: usize,
}

/// Compose every headline score for one trade population.
///
/// `curve` must be the equity replay of the same `trades`. Profit figures
/// cover the same dated trades the replay walks; undated trades only count
/// toward `scored_trades` and the R-based scores.
pub fn compose(trades: &[Trade], curve: &[EquityPoint], opts: MacroOptions) -> MacroStats {
    let scored_trades = trades
        .iter()
        .filter(|t| Outcome::classify(t, opts.include_non_executed).is_scored())
        .count();

    let months = calendar_month_profits(trades, opts.include_non_executed);
    let (profitable_months, active_months) = month_counts(months.values());

    let profits: Vec<f64> = trades
        .iter()
        .filter(|t| t.trade_date.is_some() && (t.executed || opts.include_non_executed))
        .map(|t| t.profit_contribution(opts.include_non_executed))
        .collect();
    let wins: Vec<f64> = profits.iter().copied().filter(|p| *p > 0.0).collect();
    let losses: Vec<f64> = profits.iter().copied().filter(|p| *p < 0.0).map(f64::abs).collect();

    let mut stats = MacroStats {
        consistency_score: consistency_score(months.values()),
        profitable_months,
        active_months,
        sharpe_ratio: sharpe_ratio(curve),
        profit_factor: gross_ratio(&profits, opts.profit_factor_cap),
        total_profit: profits.iter().sum(),
        average_win: mean_f64(&wins),
        average_loss: mean_f64(&losses),
        expectancy: mean_f64(&profits),
        scored_trades,
        ..MacroStats::default()
    };

    // R-based scores only mean something for the scored population in view.
    if scored_trades > 0 {
        let r = r_multiples(trades, opts.include_non_executed);
        stats.average_r_multiple = mean_f64(&r);
        stats.trade_quality_index = trade_quality_index(&r, opts.sqn_sample_cap);
    }
    stats
}

/// Net profit per (year, month) for trades that count toward profit.
pub fn calendar_month_profits(trades: &[Trade], include_non_executed: bool) -> BTreeMap<(i32, u32), MonthlyProfit> {
    let mut months: BTreeMap<(i32, u32), MonthlyProfit> = BTreeMap::new();
    for trade in trades {
        if !trade.executed && !include_non_executed {
            continue;
        }
        let Some(date) = trade.trade_date else {
            continue;
        };
        let entry = months.entry((date.year(), date.month())).or_default();
        entry.profit += trade.profit_contribution(include_non_executed);
        entry.trade_count += 1;
    }
    months
}

fn month_counts<'a>(months: impl IntoIterator<Item = &'a MonthlyProfit>) -> (usize, usize) {
    months
        .into_iter()
        .filter(|m| m.trade_count > 0)
        .fold((0, 0), |(profitable, active), m| {
            (profitable + usize::from(m.profit > 0.0), active + 1)
        })
}

/// Percent of months with trades whose profit is positive.
///
/// Months without trades are left out of the denominator.
pub fn consistency_score<'a>(months: impl IntoIterator<Item = &'a MonthlyProfit>) -> f64 {
    let (profitable, active) = month_counts(months);
    if active == 0 {
        return 0.0;
    }
    profitable as f64 / active as f64 * 100.0
}

/// Gross profit / gross loss.
///
/// Returns `cap` when there are wins but no losses, and 0.0 when there are no
/// wins at all. The ratio itself is also clamped to `cap`.
pub fn profit_factor(trades: &[Trade], include_non_executed: bool, cap: f64) -> f64 {
    let profits: Vec<f64> = trades
        .iter()
        .map(|t| t.profit_contribution(include_non_executed))
        .collect();
    gross_ratio(&profits, cap)
}

fn gross_ratio(profits: &[f64], cap: f64) -> f64 {
    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;
    for &p in profits {
        if p > 0.0 {
            gross_profit += p;
        } else if p < 0.0 {
            gross_loss += p.abs();
        }
    }
    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { cap } else { 0.0 };
    }
    (gross_profit / gross_loss).min(cap)
}

/// Sharpe-like ratio over per-trade percentage returns along the equity curve.
///
/// Returns 0.0 with fewer than two returns or zero deviation.
pub fn sharpe_ratio(curve: &[EquityPoint]) -> f64 {
    let returns: Vec<f64> = curve
        .iter()
        .filter(|p| p.balance_before > 0.0)
        .map(|p| p.profit / p.balance_before * 100.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / std
}

/// Realized R per scored trade: a win earns its risk/reward ratio, a loss costs 1R.
///
/// Break-even trades and wins without a usable ratio are left out.
pub fn r_multiples(trades: &[Trade], include_non_executed: bool) -> Vec<f64> {
    trades
        .iter()
        .filter_map(|t| match Outcome::classify(t, include_non_executed) {
            Outcome::Win => t.risk_reward_ratio.filter(|r| r.is_finite() && *r > 0.0),
            Outcome::Lose => Some(-1.0),
            _ => None,
        })
        .collect()
}

/// System-quality style score: `mean(R) / std(R) * sqrt(min(n, cap))`.
pub fn trade_quality_index(r_multiples: &[f64], sample_cap: usize) -> f64 {
    if r_multiples.len() < 2 {
        return 0.0;
    }
    let std = std_dev(r_multiples);
    if std < 1e-15 {
        return 0.0;
    }
    let n = r_multiples.len().min(sample_cap) as f64;
    mean_f64(r_multiples) / std * n.sqrt()
}
