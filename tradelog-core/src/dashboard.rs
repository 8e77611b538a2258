//! Filtered-view reconciler: every dashboard figure from one trade population.
//!
//! [`compute_dashboard`] applies the view filter once and derives all
//! aggregates (category, streak, equity, monthly, flags, macro) from that
//! single scoped list. Nothing is carried over from a previous view, so a win
//! rate and a drawdown shown side by side always describe the same trades.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::StatsConfig;
use crate::domain::Trade;
use crate::filter::{TradeFilter, ViewScope};
use crate::stats::category::{all_breakdowns, overall, AggregateOptions, CategoryKey};
use crate::stats::equity::{derive_starting_balance, drawdown_from_curve, equity_curve};
use crate::stats::flags::flag_stats;
use crate::stats::macro_stats::{compose, MacroOptions};
use crate::stats::monthly::{monthly, monthly_profit, total_year_profit, updated_balance};
use crate::stats::streak::{streaks, StreakOptions};
use crate::stats::{
    DrawdownStats, EquityPoint, FlagStats, MacroStats, MonthOfYear, MonthlyProfit, StatBucket,
    Streaks,
};

/// Content hash of a view: filter, balance, config and the scoped population.
///
/// Two results with the same key were computed from the same inputs. A
/// presentation layer keeps only the result whose key matches its current
/// selection, which gives last-write-wins without merging partial results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewKey(pub String);

impl ViewKey {
    pub fn compute(filter: &TradeFilter, scoped: &[Trade], current_balance: f64, config: &StatsConfig) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(format!("{filter:?}").as_bytes());
        hasher.update(format!("{config:?}").as_bytes());
        hasher.update(&current_balance.to_le_bytes());
        for trade in scoped {
            hasher.update(trade.id.as_deref().unwrap_or("").as_bytes());
            hasher.update(&[0]);
            if let Some(date) = trade.trade_date {
                hasher.update(&date.num_days_from_ce().to_le_bytes());
            }
            hasher.update(&trade.profit().to_le_bytes());
            hasher.update(&[
                u8::from(trade.executed),
                u8::from(trade.break_even),
                trade.trade_outcome.map_or(0, |o| o as u8 + 1),
            ]);
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-month figures for a view that sits inside one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearBreakdown {
    pub year: i32,
    pub months: BTreeMap<MonthOfYear, StatBucket>,
    pub profit: BTreeMap<MonthOfYear, MonthlyProfit>,
    pub total_year_profit: f64,
    /// Starting balance projected forward by the year's profit.
    pub updated_balance: f64,
}

/// Every aggregate shown for one dashboard view.
///
/// Profit figures in `macro_stats` cover the dated trades the equity replay
/// walks, so `starting_balance + macro_stats.total_profit == current_balance`
/// unless the starting balance was floored at 0. Undated trades still count
/// in the outcome buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub view_key: ViewKey,
    pub filter: TradeFilter,
    pub trade_count: usize,

    // ── Outcome counts ──
    pub overall: StatBucket,
    pub categories: BTreeMap<CategoryKey, BTreeMap<String, StatBucket>>,
    pub flags: FlagStats,
    pub streaks: Streaks,

    // ── Balance ──
    pub current_balance: f64,
    pub starting_balance: f64,
    pub drawdown: DrawdownStats,
    pub equity_curve: Vec<EquityPoint>,

    // ── Calendar ──
    pub year: Option<YearBreakdown>,

    // ── Headline ──
    pub macro_stats: MacroStats,
}

/// Filter `trades` for the view and compute every aggregate from the result.
pub fn compute_dashboard(
    trades: &[Trade],
    filter: &TradeFilter,
    current_balance: f64,
    config: &StatsConfig,
) -> DashboardStats {
    let scoped = filter.apply(trades);
    tracing::debug!(
        input = trades.len(),
        scoped = scoped.len(),
        execution = ?filter.execution,
        "scoped trades for view"
    );
    DashboardStats::from_scoped(&scoped, filter, current_balance, config)
}

impl DashboardStats {
    /// Compute every aggregate from an already scoped population.
    ///
    /// `filter` must be the filter that produced `scoped`; its execution mode
    /// decides how non-executed trades are scored and whether they count
    /// toward profit.
    pub fn from_scoped(
        scoped: &[Trade],
        filter: &TradeFilter,
        current_balance: f64,
        config: &StatsConfig,
    ) -> Self {
        let include_non_executed = filter.execution.include_non_executed();
        let agg = AggregateOptions {
            total_mode: config.category_total_mode,
            include_non_executed,
        };

        let non_finite = scoped
            .iter()
            .filter(|t| t.calculated_profit.is_some_and(|p| !p.is_finite()))
            .count();
        if non_finite > 0 {
            tracing::warn!(count = non_finite, "non-finite profit values read as zero");
        }

        let starting_balance = derive_starting_balance(current_balance, scoped, include_non_executed);
        let curve = equity_curve(scoped, starting_balance, include_non_executed);
        let drawdown = drawdown_from_curve(&curve, config.drawdown_epsilon_pct);

        let streaks = streaks(
            scoped,
            StreakOptions {
                exclude_break_even: config.streak_exclude_break_even,
                unscored_breaks: config.streak_unscored_breaks,
                include_non_executed,
            },
        );

        let year = single_year(&filter.scope).map(|year| {
            let profit = monthly_profit(scoped, include_non_executed);
            let total = total_year_profit(&profit);
            YearBreakdown {
                year,
                months: monthly(scoped, agg),
                total_year_profit: total,
                updated_balance: updated_balance(Some(starting_balance), total),
                profit,
            }
        });

        let macro_stats = compose(
            scoped,
            &curve,
            MacroOptions {
                include_non_executed,
                profit_factor_cap: config.profit_factor_cap,
                sqn_sample_cap: config.sqn_sample_cap,
            },
        );

        let stats = Self {
            view_key: ViewKey::compute(filter, scoped, current_balance, config),
            filter: filter.clone(),
            trade_count: scoped.len(),
            overall: overall(scoped, agg),
            categories: all_breakdowns(scoped, config, agg),
            flags: flag_stats(scoped, agg),
            streaks,
            current_balance,
            starting_balance,
            drawdown,
            equity_curve: curve,
            year,
            macro_stats,
        };
        tracing::debug!(
            view = %stats.view_key,
            win_rate = stats.overall.win_rate,
            max_drawdown_pct = stats.drawdown.max_drawdown_pct,
            "dashboard computed"
        );
        stats
    }
}

/// The calendar year a scope sits in, if it sits in exactly one.
fn single_year(scope: &ViewScope) -> Option<i32> {
    match scope {
        ViewScope::Year { year } => Some(*year),
        ViewScope::Range { start, end } if start.year() == end.year() => Some(start.year()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TradeOutcome;
    use crate::filter::ExecutionFilter;
    use chrono::NaiveDate;

    fn make_trade(id: &str, m: u32, d: u32, outcome: TradeOutcome, profit: f64) -> Trade {
        Trade {
            id: Some(id.into()),
            trade_date: NaiveDate::from_ymd_opt(2024, m, d),
            market: "ES".into(),
            trade_outcome: Some(outcome),
            calculated_profit: Some(profit),
            ..Trade::default()
        }
    }

    fn sample() -> Vec<Trade> {
        let mut be = make_trade("c", 1, 15, TradeOutcome::Win, 30.0);
        be.break_even = true;
        vec![
            make_trade("a", 1, 5, TradeOutcome::Win, 100.0),
            make_trade("b", 1, 10, TradeOutcome::Lose, -50.0),
            be,
        ]
    }

    #[test]
    fn reference_scenario() {
        let stats = compute_dashboard(&sample(), &TradeFilter::year(2024), 1080.0, &StatsConfig::default());

        assert_eq!(stats.trade_count, 3);
        assert_eq!((stats.overall.wins, stats.overall.be_wins, stats.overall.losses), (1, 1, 1));
        assert!((stats.overall.win_rate - 50.0).abs() < 1e-10);
        assert!((stats.overall.win_rate_with_be - 200.0 / 3.0).abs() < 1e-10);

        assert!((stats.starting_balance - 1000.0).abs() < 1e-10);
        let balances: Vec<f64> = stats.equity_curve.iter().map(|p| p.balance_after).collect();
        assert_eq!(balances, vec![1100.0, 1050.0, 1080.0]);
        assert!((stats.drawdown.max_drawdown_pct - 50.0 / 1100.0 * 100.0).abs() < 1e-10);

        assert_eq!(stats.streaks.current_streak, 1);

        let year = stats.year.as_ref().unwrap();
        assert_eq!(year.year, 2024);
        assert!((year.total_year_profit - 80.0).abs() < 1e-10);
        assert!((year.updated_balance - 1080.0).abs() < 1e-10);
    }

    #[test]
    fn exclude_break_even_streak_policy_flows_through_config() {
        let config = StatsConfig {
            streak_exclude_break_even: true,
            ..StatsConfig::default()
        };
        let stats = compute_dashboard(&sample(), &TradeFilter::year(2024), 1080.0, &config);
        assert_eq!(stats.streaks.current_streak, -1);
    }

    #[test]
    fn empty_view_is_all_defaults() {
        let stats = compute_dashboard(&[], &TradeFilter::default(), 5000.0, &StatsConfig::default());
        assert_eq!(stats.trade_count, 0);
        assert_eq!(stats.overall, StatBucket::default());
        assert_eq!(stats.streaks, Streaks::default());
        assert_eq!(stats.drawdown, DrawdownStats::default());
        assert_eq!(stats.macro_stats, MacroStats::default());
        assert!(stats.equity_curve.is_empty());
        assert!(stats.year.is_none());
        assert_eq!(stats.starting_balance, 5000.0);
        assert!(stats.categories.values().all(|b| b.is_empty()));
    }

    #[test]
    fn market_filter_rescopes_every_figure() {
        let mut trades = sample();
        let mut other = make_trade("d", 1, 12, TradeOutcome::Lose, -400.0);
        other.market = "NQ".into();
        trades.push(other);

        let es = compute_dashboard(
            &trades,
            &TradeFilter::year(2024).with_market("ES"),
            1000.0,
            &StatsConfig::default(),
        );
        assert_eq!(es.trade_count, 3);
        assert_eq!(es.overall.losses, 1);
        assert!((es.macro_stats.total_profit - 80.0).abs() < 1e-10);
        assert!((es.starting_balance - 920.0).abs() < 1e-10);
        assert!(es.categories[&CategoryKey::Market].get("NQ").is_none());
        assert_eq!(es.streaks.max_losing_streak, 1);
    }

    #[test]
    fn non_executed_view_scores_skipped_trades() {
        let mut trades = sample();
        for t in &mut trades {
            t.executed = false;
        }
        let filter = TradeFilter::year(2024).with_execution(ExecutionFilter::NonExecutedOnly);
        let stats = compute_dashboard(&trades, &filter, 1080.0, &StatsConfig::default());
        assert_eq!(stats.trade_count, 3);
        assert!((stats.overall.win_rate - 50.0).abs() < 1e-10);
        assert!((stats.macro_stats.total_profit - 80.0).abs() < 1e-10);

        let executed = compute_dashboard(&trades, &TradeFilter::year(2024), 1080.0, &StatsConfig::default());
        assert_eq!(executed.trade_count, 0);
    }

    #[test]
    fn view_key_tracks_inputs() {
        let config = StatsConfig::default();
        let a = compute_dashboard(&sample(), &TradeFilter::year(2024), 1080.0, &config);
        let b = compute_dashboard(&sample(), &TradeFilter::year(2024), 1080.0, &config);
        assert_eq!(a.view_key, b.view_key);

        let other_balance = compute_dashboard(&sample(), &TradeFilter::year(2024), 2000.0, &config);
        assert_ne!(a.view_key, other_balance.view_key);

        let mut changed = sample();
        changed[0].calculated_profit = Some(101.0);
        let other_trades = compute_dashboard(&changed, &TradeFilter::year(2024), 1080.0, &config);
        assert_ne!(a.view_key, other_trades.view_key);
    }

    #[test]
    fn view_key_tracks_config() {
        let base = StatsConfig::default();
        let a = compute_dashboard(&sample(), &TradeFilter::year(2024), 1080.0, &base);

        let capped = StatsConfig {
            profit_factor_cap: 50.0,
            ..StatsConfig::default()
        };
        let b = compute_dashboard(&sample(), &TradeFilter::year(2024), 1080.0, &capped);
        assert_ne!(a.view_key, b.view_key);

        let by_market = compute_dashboard(
            &sample(),
            &TradeFilter::year(2024).with_market("es"),
            1080.0,
            &base,
        );
        assert_ne!(a.view_key, by_market.view_key);
    }

    #[test]
    fn undated_trades_stay_out_of_profit_figures() {
        let mut trades = sample();
        trades.push(Trade {
            id: Some("undated".into()),
            market: "ES".into(),
            trade_outcome: Some(TradeOutcome::Win),
            calculated_profit: Some(500.0),
            ..Trade::default()
        });
        let stats = compute_dashboard(&trades, &TradeFilter::default(), 1080.0, &StatsConfig::default());

        assert_eq!(stats.trade_count, 4);
        assert_eq!(stats.overall.wins, 2);
        assert_eq!(stats.equity_curve.len(), 3);
        assert!((stats.macro_stats.total_profit - 80.0).abs() < 1e-10);
        assert!((stats.starting_balance - 1000.0).abs() < 1e-10);
        assert!(
            (stats.starting_balance + stats.macro_stats.total_profit - stats.current_balance).abs()
                < 1e-10
        );
    }

    #[test]
    fn range_within_one_year_gets_year_breakdown() {
        let filter = TradeFilter::range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let stats = compute_dashboard(&sample(), &filter, 1080.0, &StatsConfig::default());
        assert_eq!(stats.year.map(|y| y.year), Some(2024));

        let spanning = TradeFilter::range(
            NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let stats = compute_dashboard(&sample(), &spanning, 1080.0, &StatsConfig::default());
        assert!(stats.year.is_none());
    }

    #[test]
    fn serializes_to_json() {
        let stats = compute_dashboard(&sample(), &TradeFilter::year(2024), 1080.0, &StatsConfig::default());
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["categories"]["market"]["ES"]["total"].as_u64() == Some(3));
        assert!(json["year"]["months"]["Jan"].is_object());
    }
}
