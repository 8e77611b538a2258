//! Partial, re-entry and break-even breakdowns.
//!
//! Each bucket is built from its own pre-filtered subset, so a trade with
//! several flags is counted in every bucket it qualifies for.

use serde::{Deserialize, Serialize};

use super::bucket::StatBucket;
use super::category::{aggregate, AggregateOptions};
use crate::domain::Trade;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagStats {
    pub partials: StatBucket,
    pub reentry: StatBucket,
    pub break_even: StatBucket,
}

/// Outcome bucket over the trades matching `flag`.
pub fn flagged_bucket(trades: &[Trade], flag: impl Fn(&Trade) -> bool, opts: AggregateOptions) -> StatBucket {
    aggregate(trades.iter().filter(|&t| flag(t)), |_| (), opts)
        .remove(&())
        .unwrap_or_default()
}

pub fn flag_stats(trades: &[Trade], opts: AggregateOptions) -> FlagStats {
    FlagStats {
        partials: flagged_bucket(trades, |t| t.partials_taken, opts),
        reentry: flagged_bucket(trades, |t| t.reentry, opts),
        break_even: flagged_bucket(trades, |t| t.break_even, opts),
    }
}
