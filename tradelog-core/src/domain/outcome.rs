//! Outcome classification: the leaf every aggregator builds on.

use serde::{Deserialize, Serialize};

use super::trade::{Trade, TradeOutcome};

/// Classified outcome of a single trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Win,
    Lose,
    BeWin,
    BeLose,
    NonExecuted,
    /// Executed, but the recorded outcome is neither Win nor Lose.
    Unscored,
}

impl Outcome {
    /// Classify a trade.
    ///
    /// With `include_non_executed` the caller has opted skipped trades into the
    /// population, so they are scored by their recorded outcome like any other.
    pub fn classify(trade: &Trade, include_non_executed: bool) -> Self {
        if !trade.executed && !include_non_executed {
            return Self::NonExecuted;
        }
        match (trade.trade_outcome, trade.break_even) {
            (Some(TradeOutcome::Win), true) => Self::BeWin,
            (Some(TradeOutcome::Lose), true) => Self::BeLose,
            (Some(TradeOutcome::Win), false) => Self::Win,
            (Some(TradeOutcome::Lose), false) => Self::Lose,
            (None, _) => Self::Unscored,
        }
    }

    /// Strict classification: non-executed trades never score.
    pub fn of(trade: &Trade) -> Self {
        Self::classify(trade, false)
    }

    pub fn is_break_even(self) -> bool {
        matches!(self, Self::BeWin | Self::BeLose)
    }

    /// True for any Win/Lose outcome, break-even or not.
    pub fn is_scored(self) -> bool {
        matches!(self, Self::Win | Self::Lose | Self::BeWin | Self::BeLose)
    }

    /// +1 for wins, -1 for losses, 0 for everything that cannot score.
    pub fn sign(self) -> i8 {
        match self {
            Self::Win | Self::BeWin => 1,
            Self::Lose | Self::BeLose => -1,
            Self::NonExecuted | Self::Unscored => 0,
        }
    }
}
