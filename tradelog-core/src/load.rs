//! Trade-file loading: JSON arrays or CSV with a header row.
//!
//! Record-level problems never fail a load: field parsing on [`Trade`] is
//! lenient, and degraded records are reported through `tracing::warn!`.
//! Only unreadable files and structurally broken documents are errors.

use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::domain::Trade;

/// Errors from reading a trade file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid trade JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid trade CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported trade file '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

/// Load trades from `path`, picking the format from the file extension.
pub fn load_trades(path: &Path) -> Result<Vec<Trade>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let io_err = |source| LoadError::Io {
        path: path.display().to_string(),
        source,
    };

    let trades = match ext.as_deref() {
        Some("json") => trades_from_json_str(&std::fs::read_to_string(path).map_err(io_err)?)?,
        Some("csv") => trades_from_csv_reader(std::fs::File::open(path).map_err(io_err)?)?,
        _ => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
    };
    tracing::debug!(path = %path.display(), count = trades.len(), "loaded trades");
    Ok(trades)
}

/// Parse a JSON array of trade records.
pub fn trades_from_json_str(raw: &str) -> Result<Vec<Trade>, LoadError> {
    let trades: Vec<Trade> = serde_json::from_str(raw)?;
    report_degraded(&trades);
    Ok(trades)
}

/// Parse CSV with a header row naming the trade fields.
///
/// Cells are handed to the record parser as text, so identifiers such as a
/// zero-padded account keep their exact spelling. Empty cells are treated as
/// absent.
pub fn trades_from_csv_reader<R: Read>(reader: R) -> Result<Vec<Trade>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut trades = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(name, cell)| (name.to_string(), Value::String(cell.to_string())))
            .collect();
        trades.push(serde_json::from_value(Value::Object(row))?);
    }
    report_degraded(&trades);
    Ok(trades)
}

fn report_degraded(trades: &[Trade]) {
    let undated = trades.iter().filter(|t| t.trade_date.is_none()).count();
    if undated > 0 {
        tracing::warn!(
            count = undated,
            "trades without a valid date are left out of streaks, equity and monthly views"
        );
    }
    let unscored = trades.iter().filter(|t| t.trade_outcome.is_none()).count();
    if unscored > 0 {
        tracing::warn!(count = unscored, "trades without a recognised outcome are unscored");
    }
}
