//! Monthly aggregation for a single calendar year.
//!
//! Months are keyed by month-of-year only; callers scope the input to one
//! year first (see [`scope_to_year`]).

use chrono::Datelike;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::bucket::StatBucket;
use super::category::{aggregate, AggregateOptions};
use crate::domain::{Outcome, Trade};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar month, 1 = January. Serialized as its short English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthOfYear(u32);

impl MonthOfYear {
    pub fn new(month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(month))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.0 - 1) as usize]
    }

    fn parse(raw: &str) -> Option<Self> {
        MONTH_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(raw.trim()))
            .map(|i| Self(i as u32 + 1))
            .or_else(|| raw.trim().parse().ok().and_then(Self::new))
    }
}

impl fmt::Display for MonthOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for MonthOfYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for MonthOfYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid month '{raw}'")))
    }
}

/// Net profit and trade count for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProfit {
    pub profit: f64,
    pub trade_count: usize,
}

/// Trades dated within `year`.
pub fn scope_to_year(trades: &[Trade], year: i32) -> Vec<Trade> {
    trades
        .iter()
        .filter(|t| t.trade_date.is_some_and(|d| d.year() == year))
        .cloned()
        .collect()
}

fn month_of(trade: &Trade) -> Option<MonthOfYear> {
    trade.trade_date.and_then(|d| MonthOfYear::new(d.month()))
}

/// Win/loss/BE counts per month. Undated trades are left out.
pub fn monthly(trades: &[Trade], opts: AggregateOptions) -> BTreeMap<MonthOfYear, StatBucket> {
    aggregate(trades, month_of, opts)
        .into_iter()
        .filter_map(|(month, bucket)| month.map(|m| (m, bucket)))
        .collect()
}

/// Net profit per month, over trades that count toward profit.
pub fn monthly_profit(trades: &[Trade], include_non_executed: bool) -> BTreeMap<MonthOfYear, MonthlyProfit> {
    let mut months: BTreeMap<MonthOfYear, MonthlyProfit> = BTreeMap::new();
    for trade in trades {
        if Outcome::classify(trade, include_non_executed) == Outcome::NonExecuted {
            continue;
        }
        let Some(month) = month_of(trade) else {
            continue;
        };
        let entry = months.entry(month).or_default();
        entry.profit += trade.profit_contribution(include_non_executed);
        entry.trade_count += 1;
    }
    months
}

/// Sum of the monthly profit map.
pub fn total_year_profit(monthly: &BTreeMap<MonthOfYear, MonthlyProfit>) -> f64 {
    monthly.values().map(|m| m.profit).sum()
}

/// Project a balance forward by a year's profit, floored at zero.
pub fn updated_balance(base_balance: Option<f64>, total_year_profit: f64) -> f64 {
    let base = base_balance.filter(|b| b.is_finite()).unwrap_or(0.0);
    let profit = if total_year_profit.is_finite() { total_year_profit } else { 0.0 };
    (base + profit).max(0.0)
}
