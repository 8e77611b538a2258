//! Stat bucket: win/loss/break-even counts with derived win rates.

use serde::{Deserialize, Serialize};

use crate::domain::Outcome;

/// Which trades count toward a bucket's `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalMode {
    /// Non-executed trades are not routed into any bucket, so they never
    /// dilute `win_rate_with_be`.
    #[default]
    ExecutedOnly,
    /// Every trade lands in a bucket, so totals reconcile with the input length.
    AllTrades,
}

/// Counts and win rates for one group of trades.
///
/// `win_rate` excludes break-even trades from both sides; `win_rate_with_be`
/// counts break-even wins as wins over the bucket total. Both are percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBucket {
    pub wins: usize,
    pub losses: usize,
    pub be_wins: usize,
    pub be_losses: usize,
    pub total: usize,
    pub win_rate: f64,
    pub win_rate_with_be: f64,
}

impl StatBucket {
    /// Build a bucket from an iterator of classified outcomes.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut bucket = Self::default();
        for outcome in outcomes {
            bucket.record(outcome);
        }
        bucket.finish()
    }

    /// Count one outcome. Call [`StatBucket::finish`] once all are recorded.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Lose => self.losses += 1,
            Outcome::BeWin => self.be_wins += 1,
            Outcome::BeLose => self.be_losses += 1,
            Outcome::NonExecuted | Outcome::Unscored => {}
        }
        self.total += 1;
    }

    /// Recompute the derived rates from the counts.
    pub fn finish(mut self) -> Self {
        self.win_rate = percentage(self.wins, self.wins + self.losses);
        self.win_rate_with_be = percentage(self.wins + self.be_wins, self.total);
        self
    }

    /// Single break-even count for views that do not split BE by outcome.
    pub fn break_even(&self) -> usize {
        self.be_wins + self.be_losses
    }

    /// Trades with a Win or Lose outcome, break-even included.
    pub fn scored(&self) -> usize {
        self.wins + self.losses + self.be_wins + self.be_losses
    }
}

/// `part / whole * 100`, with an empty whole reading as zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bucket_has_zero_rates() {
        let bucket = StatBucket::from_outcomes([]);
        assert_eq!(bucket.total, 0);
        assert_eq!(bucket.win_rate, 0.0);
        assert_eq!(bucket.win_rate_with_be, 0.0);
    }

    #[test]
    fn rates_follow_the_two_denominators() {
        let bucket = StatBucket::from_outcomes([Outcome::Win, Outcome::Lose, Outcome::BeWin]);
        assert_eq!(bucket.wins, 1);
        assert_eq!(bucket.losses, 1);
        assert_eq!(bucket.be_wins, 1);
        assert_eq!(bucket.total, 3);
        assert!((bucket.win_rate - 50.0).abs() < 1e-10);
        assert!((bucket.win_rate_with_be - 200.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn only_break_even_trades_have_zero_plain_win_rate() {
        let bucket = StatBucket::from_outcomes([Outcome::BeWin, Outcome::BeLose]);
        assert_eq!(bucket.win_rate, 0.0);
        assert!((bucket.win_rate_with_be - 50.0).abs() < 1e-10);
        assert_eq!(bucket.break_even(), 2);
    }

    #[test]
    fn unscored_and_skipped_count_toward_total_only() {
        let bucket = StatBucket::from_outcomes([
            Outcome::Win,
            Outcome::Unscored,
            Outcome::NonExecuted,
        ]);
        assert_eq!(bucket.total, 3);
        assert_eq!(bucket.scored(), 1);
        assert!((bucket.win_rate - 100.0).abs() < 1e-10);
        assert!((bucket.win_rate_with_be - 100.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn percentage_of_empty_whole_is_zero() {
        assert_eq!(percentage(3, 0), 0.0);
        assert!((percentage(1, 4) - 25.0).abs() < 1e-10);
    }
}
