//! View filters: time window, market, execution and account selection.
//!
//! The execution filter is the one place that decides whether non-executed
//! trades take part in a view. Everything downstream reads
//! [`ExecutionFilter::include_non_executed`] instead of re-deciding per call.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Which trades take part with respect to the `executed` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionFilter {
    /// Only executed trades.
    #[default]
    ExecutedOnly,
    /// Executed and non-executed trades, both scored and counted toward profit.
    IncludeNonExecuted,
    /// Only planned-but-skipped trades, scored by their recorded outcome.
    NonExecutedOnly,
}

impl ExecutionFilter {
    /// Whether non-executed trades are scored and contribute profit.
    pub fn include_non_executed(self) -> bool {
        !matches!(self, Self::ExecutedOnly)
    }

    pub fn admits(self, trade: &Trade) -> bool {
        match self {
            Self::ExecutedOnly => trade.executed,
            Self::IncludeNonExecuted => true,
            Self::NonExecutedOnly => !trade.executed,
        }
    }
}

/// Time window of a view. Dates are compared at day granularity, inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewScope {
    /// No time restriction; undated trades are kept.
    #[default]
    All,
    Year { year: i32 },
    Range { start: NaiveDate, end: NaiveDate },
}

impl ViewScope {
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match (self, date) {
            (Self::All, _) => true,
            (_, None) => false,
            (Self::Year { year }, Some(d)) => d.year() == *year,
            (Self::Range { start, end }, Some(d)) => *start <= d && d <= *end,
        }
    }
}

/// Complete selection for one dashboard view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeFilter {
    #[serde(default)]
    pub scope: ViewScope,
    /// `None` selects every market.
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub execution: ExecutionFilter,
    /// `None` selects every account.
    #[serde(default)]
    pub account_id: Option<String>,
}

impl TradeFilter {
    pub fn year(year: i32) -> Self {
        Self {
            scope: ViewScope::Year { year },
            ..Self::default()
        }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            scope: ViewScope::Range { start, end },
            ..Self::default()
        }
    }

    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    pub fn with_execution(mut self, execution: ExecutionFilter) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn matches(&self, trade: &Trade) -> bool {
        self.scope.contains(trade.trade_date)
            && self.execution.admits(trade)
            && self
                .market
                .as_deref()
                .map_or(true, |m| trade.market.trim().eq_ignore_ascii_case(m.trim()))
            && self
                .account_id
                .as_deref()
                .map_or(true, |a| trade.account_id.as_deref() == Some(a))
    }

    /// The exact trade population of this view.
    pub fn apply(&self, trades: &[Trade]) -> Vec<Trade> {
        trades.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
