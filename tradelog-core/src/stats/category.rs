//! Category aggregation: win/loss/BE counts per categorical key.
//!
//! The generic [`aggregate`] routes every trade to the bucket named by a key
//! function. [`CategoryKey`] provides the dashboard's standard keys (market,
//! setup, day of week, risk bucket, ...). Missing attributes map to
//! [`UNKNOWN_LABEL`] so bucket totals always reconcile with the input.

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bucket::{StatBucket, TotalMode};
use crate::config::StatsConfig;
use crate::domain::{Outcome, Trade};

/// Label for trades whose category attribute is missing or empty.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// How trades are classified and counted during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    pub total_mode: TotalMode,
    /// Score non-executed trades by their recorded outcome.
    pub include_non_executed: bool,
}

/// Group trades by `key_of` and count outcomes per group.
///
/// In [`TotalMode::ExecutedOnly`], trades that classify as non-executed are
/// not routed anywhere; otherwise every trade lands in exactly one bucket.
pub fn aggregate<'a, K, F>(
    trades: impl IntoIterator<Item = &'a Trade>,
    key_of: F,
    opts: AggregateOptions,
) -> BTreeMap<K, StatBucket>
where
    K: Ord,
    F: Fn(&Trade) -> K,
{
    let mut buckets: BTreeMap<K, StatBucket> = BTreeMap::new();
    for trade in trades {
        let outcome = Outcome::classify(trade, opts.include_non_executed);
        if outcome == Outcome::NonExecuted && opts.total_mode == TotalMode::ExecutedOnly {
            continue;
        }
        buckets.entry(key_of(trade)).or_default().record(outcome);
    }
    buckets.into_iter().map(|(k, b)| (k, b.finish())).collect()
}

/// Summary bucket over the whole population.
pub fn overall(trades: &[Trade], opts: AggregateOptions) -> StatBucket {
    aggregate(trades, |_| (), opts)
        .remove(&())
        .unwrap_or_default()
}

/// Standard categorical keys shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    Market,
    Direction,
    Setup,
    Liquidity,
    LocalHighLow,
    StopLossSize,
    Mss,
    News,
    DayOfWeek,
    TimeInterval,
    Evaluation,
    RiskPercent,
}

impl CategoryKey {
    pub const ALL: [CategoryKey; 12] = [
        Self::Market,
        Self::Direction,
        Self::Setup,
        Self::Liquidity,
        Self::LocalHighLow,
        Self::StopLossSize,
        Self::Mss,
        Self::News,
        Self::DayOfWeek,
        Self::TimeInterval,
        Self::Evaluation,
        Self::RiskPercent,
    ];

    /// Bucket label for `trade` under this key.
    pub fn label(&self, trade: &Trade, config: &StatsConfig) -> String {
        let label = match self {
            Self::Market => non_empty(Some(trade.market.as_str())),
            Self::Direction => trade.direction.map(|d| d.label().to_string()),
            Self::Setup => non_empty(trade.setup_type.as_deref()),
            Self::Liquidity => non_empty(trade.liquidity.as_deref()),
            Self::LocalHighLow => non_empty(trade.local_high_low.as_deref()),
            Self::StopLossSize => trade.sl_size.map(format_size),
            Self::Mss => non_empty(trade.mss.as_deref()),
            Self::News => Some(news_label(trade)),
            Self::DayOfWeek => trade.trade_date.map(|d| weekday_name(d.weekday()).to_string()),
            Self::TimeInterval => trade
                .trade_time
                .map(|t| interval_label(t.hour(), config.time_interval_hours)),
            Self::Evaluation => non_empty(trade.evaluation.as_deref()),
            Self::RiskPercent => trade
                .risk_per_trade
                .map(|r| risk_bucket_label(r, &config.risk_bucket_edges)),
        };
        label.unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }
}

/// Breakdown of `trades` by one standard key.
pub fn breakdown(
    trades: &[Trade],
    key: CategoryKey,
    config: &StatsConfig,
    opts: AggregateOptions,
) -> BTreeMap<String, StatBucket> {
    aggregate(trades, |t| key.label(t, config), opts)
}

/// Breakdowns for every standard key.
pub fn all_breakdowns(
    trades: &[Trade],
    config: &StatsConfig,
    opts: AggregateOptions,
) -> BTreeMap<CategoryKey, BTreeMap<String, StatBucket>> {
    CategoryKey::ALL
        .iter()
        .map(|&key| (key, breakdown(trades, key, config, opts)))
        .collect()
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn news_label(trade: &Trade) -> String {
    if !trade.news_related {
        return "No News".to_string();
    }
    non_empty(trade.news_name.as_deref()).unwrap_or_else(|| "News".to_string())
}

fn format_size(size: f64) -> String {
    let rounded = (size * 100.0).round() / 100.0;
    format!("{rounded}")
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// `"08:00-12:00"` style label for the interval containing `hour`.
pub fn interval_label(hour: u32, width_hours: u32) -> String {
    let width = width_hours.clamp(1, 24);
    let start = (hour / width) * width;
    let end = (start + width).min(24);
    format!("{start:02}:00-{end:02}:00")
}

/// Label for the risk bucket containing `risk_pct`, given ascending upper edges.
pub fn risk_bucket_label(risk_pct: f64, edges: &[f64]) -> String {
    let mut lower = 0.0;
    for &edge in edges {
        if risk_pct <= edge {
            return format!("{lower}-{edge}%");
        }
        lower = edge;
    }
    match edges.last() {
        Some(last) => format!(">{last}%"),
        None => format!("{}%", format_size(risk_pct)),
    }
}
