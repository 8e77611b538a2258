//! End-to-end dashboard scenarios: trade file in, reconciled view out.

use chrono::NaiveDate;
use std::io::Write;
use tradelog_core::stats::category::UNKNOWN_LABEL;
use tradelog_core::{
    compute_dashboard, load_trades, trades_from_json_str, CategoryKey, ExecutionFilter,
    MonthOfYear, StatsConfig, TradeFilter,
};

// ── Helpers ──────────────────────────────────────────────────────────

const JOURNAL: &str = r#"[
    {"id": "t1", "tradeDate": "2024-01-05", "tradeTime": "09:35", "market": "ES",
     "direction": "Long", "tradeOutcome": "Win", "calculatedProfit": 100,
     "riskRewardRatio": 2, "riskPerTrade": 0.5, "setupType": "Breakout"},
    {"id": "t2", "tradeDate": "2024-01-10", "tradeTime": "14:10", "market": "ES",
     "direction": "Short", "tradeOutcome": "Lose", "calculatedProfit": -50,
     "riskPerTrade": 0.5, "setupType": "Reversal"},
    {"id": "t3", "tradeDate": "2024-01-15", "market": "ES", "tradeOutcome": "Win",
     "breakEven": true, "calculatedProfit": 30, "partialsTaken": true},
    {"id": "t4", "tradeDate": "2024-02-02", "market": "NQ", "tradeOutcome": "Lose",
     "calculatedProfit": -200, "executed": false},
    {"id": "t5", "tradeDate": "2023-12-28", "market": "ES", "tradeOutcome": "Win",
     "calculatedProfit": 75},
    {"id": "t6", "market": "ES", "tradeOutcome": "Lose", "calculatedProfit": -10}
]"#;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Reconciliation ───────────────────────────────────────────────────

#[test]
fn yearly_view_reconciles_every_figure() {
    let trades = trades_from_json_str(JOURNAL).unwrap();
    let stats = compute_dashboard(&trades, &TradeFilter::year(2024), 1080.0, &StatsConfig::default());

    // t4 is not executed, t5 is last year, t6 has no date.
    assert_eq!(stats.trade_count, 3);
    assert_eq!(stats.overall.wins, 1);
    assert_eq!(stats.overall.be_wins, 1);
    assert_eq!(stats.overall.losses, 1);
    assert!(close(stats.overall.win_rate, 50.0));
    assert!(close(stats.overall.win_rate_with_be, 200.0 / 3.0));

    assert!(close(stats.starting_balance, 1000.0));
    let peaks: Vec<f64> = stats.equity_curve.iter().map(|p| p.peak_at_point).collect();
    assert_eq!(peaks, vec![1100.0, 1100.0, 1100.0]);
    assert!(close(stats.drawdown.max_drawdown_pct, 50.0 / 1100.0 * 100.0));
    assert!(stats.drawdown.average_drawdown_pct <= stats.drawdown.max_drawdown_pct);

    assert_eq!(stats.streaks.current_streak, 1);
    assert_eq!(stats.flags.partials.total, 1);
    assert_eq!(stats.flags.break_even.be_wins, 1);

    let year = stats.year.as_ref().unwrap();
    let jan = MonthOfYear::new(1).unwrap();
    assert_eq!(year.months[&jan].total, 3);
    assert!(close(year.profit[&jan].profit, 80.0));
    assert!(!year.months.contains_key(&MonthOfYear::new(2).unwrap()));

    let setups = &stats.categories[&CategoryKey::Setup];
    assert_eq!(setups["Breakout"].wins, 1);
    assert_eq!(setups["Reversal"].losses, 1);
    assert_eq!(setups[UNKNOWN_LABEL].total, 1);
    let intervals = &stats.categories[&CategoryKey::TimeInterval];
    assert_eq!(intervals["08:00-12:00"].total, 1);
    assert_eq!(intervals["12:00-16:00"].total, 1);

    assert!(close(stats.macro_stats.total_profit, 80.0));
    assert!(close(stats.macro_stats.profit_factor, 130.0 / 50.0));
    assert!(close(stats.macro_stats.consistency_score, 100.0));
    assert!(close(stats.macro_stats.average_r_multiple, 0.5));
}

#[test]
fn unfiltered_view_counts_undated_trades_in_categories_only() {
    let trades = trades_from_json_str(JOURNAL).unwrap();
    let stats = compute_dashboard(&trades, &TradeFilter::default(), 0.0, &StatsConfig::default());

    assert_eq!(stats.trade_count, 5);
    let markets = &stats.categories[&CategoryKey::Market];
    assert_eq!(markets["ES"].total, 5);
    // The undated trade never reaches the equity replay.
    assert_eq!(stats.equity_curve.len(), 4);
    // Nor its profit: t6's -10 stays out of the headline figures.
    assert!(close(stats.macro_stats.total_profit, 155.0));
    assert!(stats.year.is_none());
    assert_eq!(stats.macro_stats.active_months, 2);
}

#[test]
fn including_non_executed_changes_profit_and_population() {
    let trades = trades_from_json_str(JOURNAL).unwrap();
    let config = StatsConfig::default();
    let base = TradeFilter::year(2024);

    let executed = compute_dashboard(&trades, &base, 1000.0, &config);
    let all = compute_dashboard(
        &trades,
        &base.clone().with_execution(ExecutionFilter::IncludeNonExecuted),
        1000.0,
        &config,
    );
    let skipped = compute_dashboard(
        &trades,
        &base.with_execution(ExecutionFilter::NonExecutedOnly),
        1000.0,
        &config,
    );

    assert_eq!(all.trade_count, executed.trade_count + 1);
    assert!(close(all.macro_stats.total_profit, executed.macro_stats.total_profit - 200.0));
    assert_eq!(skipped.trade_count, 1);
    assert_eq!(skipped.overall.losses, 1);
    assert_eq!(skipped.streaks.current_streak, -1);
    assert_ne!(executed.view_key, all.view_key);
}

#[test]
fn market_views_split_the_population() {
    let trades = trades_from_json_str(JOURNAL).unwrap();
    let config = StatsConfig::default();
    let filter = TradeFilter::default().with_execution(ExecutionFilter::IncludeNonExecuted);

    let all = compute_dashboard(&trades, &filter, 0.0, &config);
    let es = compute_dashboard(&trades, &filter.clone().with_market("es"), 0.0, &config);
    let nq = compute_dashboard(&trades, &filter.with_market("NQ"), 0.0, &config);

    assert_eq!(es.trade_count + nq.trade_count, all.trade_count);
    assert_eq!(es.overall.total + nq.overall.total, all.overall.total);
    assert!(close(
        es.macro_stats.total_profit + nq.macro_stats.total_profit,
        all.macro_stats.total_profit
    ));
}

#[test]
fn range_view_matches_year_view() {
    let trades = trades_from_json_str(JOURNAL).unwrap();
    let config = StatsConfig::default();
    let yearly = compute_dashboard(&trades, &TradeFilter::year(2024), 1080.0, &config);
    let ranged = compute_dashboard(
        &trades,
        &TradeFilter::range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        ),
        1080.0,
        &config,
    );
    assert_eq!(yearly.drawdown, ranged.drawdown);
    assert_eq!(yearly.starting_balance, ranged.starting_balance);
    assert_eq!(yearly.macro_stats, ranged.macro_stats);
    assert_ne!(yearly.view_key, ranged.view_key);
}

// ── Edge Cases ───────────────────────────────────────────────────────

#[test]
fn empty_journal_yields_zero_defaults() {
    let trades = trades_from_json_str("[]").unwrap();
    let stats = compute_dashboard(&trades, &TradeFilter::year(2024), 0.0, &StatsConfig::default());
    assert_eq!(stats.trade_count, 0);
    assert_eq!(stats.overall.win_rate, 0.0);
    assert_eq!(stats.drawdown.max_drawdown_pct, 0.0);
    assert_eq!(stats.streaks.current_streak, 0);
    assert_eq!(stats.macro_stats.profit_factor, 0.0);
    let year = stats.year.unwrap();
    assert!(year.months.is_empty());
    assert_eq!(year.total_year_profit, 0.0);
}

#[test]
fn wins_without_losses_report_the_profit_factor_cap() {
    let raw = r#"[
        {"trade_date": "2024-03-01", "trade_outcome": "Win", "calculated_profit": 40},
        {"trade_date": "2024-03-02", "trade_outcome": "Win", "calculated_profit": 60}
    ]"#;
    let trades = trades_from_json_str(raw).unwrap();
    let config = StatsConfig::from_toml_str("profit_factor_cap = 999.0").unwrap();
    let stats = compute_dashboard(&trades, &TradeFilter::default(), 500.0, &config);
    assert_eq!(stats.macro_stats.profit_factor, 999.0);
    assert_eq!(stats.drawdown.max_drawdown_pct, 0.0);
}

#[test]
fn loads_from_files_and_config() {
    let dir = tempfile::tempdir().unwrap();

    let trades_path = dir.path().join("journal.json");
    std::fs::write(&trades_path, JOURNAL).unwrap();

    let config_path = dir.path().join("stats.toml");
    let mut f = std::fs::File::create(&config_path).unwrap();
    writeln!(f, "streak_exclude_break_even = true").unwrap();
    writeln!(f, "category_total_mode = \"executed_only\"").unwrap();
    drop(f);

    let trades = load_trades(&trades_path).unwrap();
    let config = StatsConfig::from_file(&config_path).unwrap();
    let filter = TradeFilter::year(2024).with_execution(ExecutionFilter::IncludeNonExecuted);
    let stats = compute_dashboard(&trades, &filter, 880.0, &config);

    // The BE win no longer extends the streak; the skipped NQ loss is last.
    assert_eq!(stats.streaks.current_streak, -2);
    assert_eq!(stats.trade_count, 4);
}
