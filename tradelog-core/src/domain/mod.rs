//! Domain types for the trading journal.

pub mod outcome;
pub mod trade;

pub use outcome::Outcome;
pub use trade::{parse_trade_date, parse_trade_time, Direction, Trade, TradeOutcome};
