//! Equity replay and drawdown.
//!
//! Trades are replayed in date order against a starting balance. The starting
//! balance is backed out of the latest known balance, so two views over the
//! same trade population always replay from the same point.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::chronological;
use crate::domain::Trade;

/// Drawdown samples at or below this percentage are treated as float noise.
pub const DEFAULT_DRAWDOWN_EPSILON_PCT: f64 = 0.0001;

/// One step of the running-balance replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub trade_date: NaiveDate,
    pub profit: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub peak_at_point: f64,
    /// Decline from the running peak, in percent. Zero while at a new high.
    pub drawdown_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownStats {
    pub max_drawdown_pct: f64,
    pub average_drawdown_pct: f64,
}

/// Net profit of the trades the equity replay walks (dated trades only).
pub fn replay_profit(trades: &[Trade], include_non_executed: bool) -> f64 {
    chronological(trades)
        .into_iter()
        .map(|t| t.profit_contribution(include_non_executed))
        .sum()
}

/// `max(0, current_balance - net profit of the period)`.
pub fn derive_starting_balance(current_balance: f64, trades: &[Trade], include_non_executed: bool) -> f64 {
    let current = if current_balance.is_finite() { current_balance } else { 0.0 };
    (current - replay_profit(trades, include_non_executed)).max(0.0)
}

/// Replay `trades` chronologically from `starting_balance`.
pub fn equity_curve(trades: &[Trade], starting_balance: f64, include_non_executed: bool) -> Vec<EquityPoint> {
    let mut balance = starting_balance;
    let mut peak = starting_balance;

    chronological(trades)
        .into_iter()
        .filter_map(|trade| {
            let date = trade.trade_date?;
            let profit = trade.profit_contribution(include_non_executed);
            let before = balance;
            balance += profit;
            if balance > peak {
                peak = balance;
            }
            let drawdown_pct = if peak > 0.0 {
                ((peak - balance) / peak * 100.0).max(0.0)
            } else {
                0.0
            };
            Some(EquityPoint {
                trade_date: date,
                profit,
                balance_before: before,
                balance_after: balance,
                peak_at_point: peak,
                drawdown_pct,
            })
        })
        .collect()
}

/// Max and average drawdown over an already replayed curve.
///
/// The average is taken over samples above `epsilon_pct`; when there are none
/// but the maximum is positive, the maximum stands in for the average.
pub fn drawdown_from_curve(curve: &[EquityPoint], epsilon_pct: f64) -> DrawdownStats {
    let mut max_dd = 0.0_f64;
    let mut sum = 0.0;
    let mut samples = 0usize;

    for point in curve {
        if point.drawdown_pct > epsilon_pct {
            sum += point.drawdown_pct;
            samples += 1;
        }
        max_dd = max_dd.max(point.drawdown_pct);
    }

    let average = if samples > 0 {
        sum / samples as f64
    } else if max_dd > 0.0 {
        max_dd
    } else {
        0.0
    };

    DrawdownStats {
        max_drawdown_pct: max_dd,
        average_drawdown_pct: average,
    }
}

/// Replay `trades` and summarize drawdown.
pub fn drawdown(trades: &[Trade], starting_balance: f64, include_non_executed: bool) -> DrawdownStats {
    let curve = equity_curve(trades, starting_balance, include_non_executed);
    drawdown_from_curve(&curve, DEFAULT_DRAWDOWN_EPSILON_PCT)
}
