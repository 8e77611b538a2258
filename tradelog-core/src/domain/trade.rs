//! Trade: a single journal entry as recorded by the user.
//!
//! Trades arrive already materialized from the store or a file export. Field
//! parsing is deliberately lenient: a malformed value degrades to `None` (or
//! the field default) instead of rejecting the whole record, so one bad row
//! never takes down a dashboard.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Recorded outcome of a trade. Break-even is an orthogonal flag on [`Trade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeOutcome {
    Win,
    Lose,
}

impl TradeOutcome {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "win" | "won" => Some(Self::Win),
            "lose" | "loss" | "lost" => Some(Self::Lose),
            _ => None,
        }
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Some(Self::Long),
            "short" | "sell" => Some(Self::Short),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Long => "Long",
            Self::Short => "Short",
        }
    }
}

/// A journal trade record. Immutable input to the statistics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    #[serde(default, deserialize_with = "de_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_text", alias = "accountId")]
    pub account_id: Option<String>,

    // ── Timing ──
    #[serde(default, deserialize_with = "de_date", alias = "tradeDate")]
    pub trade_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de_time", alias = "tradeTime")]
    pub trade_time: Option<NaiveTime>,

    // ── Instrument ──
    #[serde(default, deserialize_with = "de_label")]
    pub market: String,
    #[serde(default, deserialize_with = "de_direction")]
    pub direction: Option<Direction>,

    // ── Outcome ──
    #[serde(default, deserialize_with = "de_outcome", alias = "tradeOutcome")]
    pub trade_outcome: Option<TradeOutcome>,
    #[serde(default, deserialize_with = "de_flag", alias = "breakEven")]
    pub break_even: bool,
    #[serde(default = "default_true", deserialize_with = "de_flag_default_true")]
    pub executed: bool,
    #[serde(default, deserialize_with = "de_number", alias = "calculatedProfit")]
    pub calculated_profit: Option<f64>,

    // ── Trade-type flags ──
    #[serde(default, deserialize_with = "de_flag", alias = "partialsTaken")]
    pub partials_taken: bool,
    #[serde(default, deserialize_with = "de_flag")]
    pub reentry: bool,

    // ── Category attributes ──
    #[serde(default, deserialize_with = "de_text", alias = "setupType")]
    pub setup_type: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub liquidity: Option<String>,
    #[serde(default, deserialize_with = "de_text", alias = "localHighLow")]
    pub local_high_low: Option<String>,
    #[serde(default, deserialize_with = "de_number", alias = "slSize")]
    pub sl_size: Option<f64>,
    #[serde(default, deserialize_with = "de_text")]
    pub mss: Option<String>,
    #[serde(default, deserialize_with = "de_flag", alias = "newsRelated")]
    pub news_related: bool,
    #[serde(default, deserialize_with = "de_text", alias = "newsName")]
    pub news_name: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub evaluation: Option<String>,
    /// Risk taken on the trade, in percent of the account.
    #[serde(default, deserialize_with = "de_number", alias = "riskPerTrade")]
    pub risk_per_trade: Option<f64>,
    #[serde(default, deserialize_with = "de_number", alias = "riskRewardRatio")]
    pub risk_reward_ratio: Option<f64>,
}

impl Default for Trade {
    fn default() -> Self {
        Self {
            id: None,
            account_id: None,
            trade_date: None,
            trade_time: None,
            market: String::new(),
            direction: None,
            trade_outcome: None,
            break_even: false,
            executed: true,
            calculated_profit: None,
            partials_taken: false,
            reentry: false,
            setup_type: None,
            liquidity: None,
            local_high_low: None,
            sl_size: None,
            mss: None,
            news_related: false,
            news_name: None,
            evaluation: None,
            risk_per_trade: None,
            risk_reward_ratio: None,
        }
    }
}

impl Trade {
    /// Recorded P&L, with missing or non-finite values read as zero.
    pub fn profit(&self) -> f64 {
        match self.calculated_profit {
            Some(p) if p.is_finite() => p,
            _ => 0.0,
        }
    }

    /// Profit this trade contributes to balances and totals.
    ///
    /// Non-executed trades contribute nothing unless the caller opted them in.
    pub fn profit_contribution(&self, include_non_executed: bool) -> f64 {
        if !self.executed && !include_non_executed {
            return 0.0;
        }
        self.profit()
    }

    pub fn is_win(&self) -> bool {
        self.trade_outcome == Some(TradeOutcome::Win)
    }

    pub fn is_loss(&self) -> bool {
        self.trade_outcome == Some(TradeOutcome::Lose)
    }
}

fn default_true() -> bool {
    true
}

// ─── Lenient field parsing ──────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawScalar {
    fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(n) => Some(*n != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(true),
                "false" | "no" | "n" | "0" => Some(false),
                _ => None,
            },
        }
    }

    fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Bool(_) => return None,
            Self::Int(n) => *n as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    fn into_text(self) -> Option<String> {
        let s = match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s,
        };
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RawScalar>, D::Error> {
    // Anything that is not a scalar degrades to None rather than failing the record.
    Ok(Option::<RawScalar>::deserialize(d).unwrap_or(None))
}

fn de_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(raw(d)?.and_then(|r| r.as_flag()).unwrap_or(false))
}

fn de_flag_default_true<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(raw(d)?.and_then(|r| r.as_flag()).unwrap_or(true))
}

fn de_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(raw(d)?.and_then(|r| r.as_number()))
}

fn de_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(raw(d)?.and_then(RawScalar::into_text))
}

fn de_label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(de_text(d)?.unwrap_or_default())
}

fn de_outcome<'de, D: Deserializer<'de>>(d: D) -> Result<Option<TradeOutcome>, D::Error> {
    Ok(de_text(d)?.as_deref().and_then(TradeOutcome::parse))
}

fn de_direction<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Direction>, D::Error> {
    Ok(de_text(d)?.as_deref().and_then(Direction::parse))
}

fn de_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(de_text(d)?.as_deref().and_then(parse_trade_date))
}

fn de_time<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
    Ok(de_text(d)?.as_deref().and_then(parse_trade_time))
}

/// Parse a date-only or date-time string down to day granularity.
pub fn parse_trade_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_trade_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
