//! Statistics configuration, loadable from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! standard dashboard behaviour.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::stats::bucket::TotalMode;

/// Errors from loading or validating a [`StatsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the statistics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Treat break-even trades as unscored when walking streaks.
    pub streak_exclude_break_even: bool,
    /// An unscored trade resets the running streak instead of being skipped.
    pub streak_unscored_breaks: bool,
    /// Whether category bucket totals count non-executed trades. Executed
    /// trades only unless set to `all_trades`.
    pub category_total_mode: TotalMode,
    /// Drawdown samples at or below this percentage are ignored for the average.
    pub drawdown_epsilon_pct: f64,
    /// Reported profit factor when there are wins but no losses.
    pub profit_factor_cap: f64,
    /// Ascending upper edges (percent of account) for risk-per-trade buckets.
    pub risk_bucket_edges: Vec<f64>,
    /// Width of a time-of-day bucket in hours.
    pub time_interval_hours: u32,
    /// Sample-size cap for the trade-quality index.
    pub sqn_sample_cap: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            streak_exclude_break_even: false,
            streak_unscored_breaks: false,
            category_total_mode: TotalMode::ExecutedOnly,
            drawdown_epsilon_pct: 0.0001,
            profit_factor_cap: 100.0,
            risk_bucket_edges: vec![0.25, 0.5, 0.75, 1.0, 1.5, 2.0],
            time_interval_hours: 4,
            sqn_sample_cap: 100,
        }
    }
}

impl StatsConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.profit_factor_cap.is_finite() && self.profit_factor_cap > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "profit_factor_cap must be a positive number, got {}",
                self.profit_factor_cap
            )));
        }
        if !(self.drawdown_epsilon_pct.is_finite() && self.drawdown_epsilon_pct >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "drawdown_epsilon_pct must be >= 0, got {}",
                self.drawdown_epsilon_pct
            )));
        }
        if !(1..=24).contains(&self.time_interval_hours) {
            return Err(ConfigError::Invalid(format!(
                "time_interval_hours must be in 1..=24, got {}",
                self.time_interval_hours
            )));
        }
        if self.sqn_sample_cap < 2 {
            return Err(ConfigError::Invalid(
                "sqn_sample_cap must be at least 2".into(),
            ));
        }
        let ascending = self.risk_bucket_edges.windows(2).all(|w| w[0] < w[1]);
        let finite = self.risk_bucket_edges.iter().all(|e| e.is_finite() && *e > 0.0);
        if !ascending || !finite {
            return Err(ConfigError::Invalid(
                "risk_bucket_edges must be positive and strictly ascending".into(),
            ));
        }
        Ok(())
    }
}
