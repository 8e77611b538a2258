//! Streaks: consecutive same-sign outcomes in chronological order.

use serde::{Deserialize, Serialize};

use super::chronological;
use crate::domain::{Outcome, Trade};

/// Streak walk policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakOptions {
    /// Break-even trades behave like unscored trades.
    pub exclude_break_even: bool,
    /// Unscored trades reset the running streak instead of being skipped.
    pub unscored_breaks: bool,
    /// Score non-executed trades by their recorded outcome.
    pub include_non_executed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Streaks {
    /// Signed length of the trailing run: positive = winning, negative = losing.
    pub current_streak: i64,
    pub max_winning_streak: usize,
    pub max_losing_streak: usize,
    pub avg_winning_streak: f64,
    pub avg_losing_streak: f64,
}

/// Walk `trades` by date and derive current and maximum streaks.
///
/// Undated trades are skipped; ties on date keep input order.
pub fn streaks(trades: &[Trade], opts: StreakOptions) -> Streaks {
    let mut run: i64 = 0;
    let mut max_win = 0usize;
    let mut max_loss = 0usize;
    let mut win_runs: Vec<usize> = Vec::new();
    let mut loss_runs: Vec<usize> = Vec::new();

    let mut close_run = |run: i64| {
        if run > 0 {
            win_runs.push(run as usize);
        } else if run < 0 {
            loss_runs.push(run.unsigned_abs() as usize);
        }
    };

    for trade in chronological(trades) {
        let outcome = Outcome::classify(trade, opts.include_non_executed);
        let sign = if opts.exclude_break_even && outcome.is_break_even() {
            0
        } else {
            outcome.sign()
        };

        if sign == 0 {
            if opts.unscored_breaks {
                close_run(run);
                run = 0;
            }
            continue;
        }

        if sign > 0 {
            if run > 0 {
                run += 1;
            } else {
                close_run(run);
                run = 1;
            }
            max_win = max_win.max(run as usize);
        } else {
            if run < 0 {
                run -= 1;
            } else {
                close_run(run);
                run = -1;
            }
            max_loss = max_loss.max(run.unsigned_abs() as usize);
        }
    }
    close_run(run);

    Streaks {
        current_streak: run,
        max_winning_streak: max_win,
        max_losing_streak: max_loss,
        avg_winning_streak: mean_len(&win_runs),
        avg_losing_streak: mean_len(&loss_runs),
    }
}

fn mean_len(runs: &[usize]) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().sum::<usize>() as f64 / runs.len() as f64
}
