//! Common gateway types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily price bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
}

/// History bar interval. Every window in the scan is measured in daily bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Daily,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
        }
    }
}

/// Current quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    /// Last trade price; absent outside trading or for illiquid symbols
    pub last: Option<f64>,
}

/// Option right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// Single option contract from a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub symbol: String,
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    pub option_type: OptionType,
    pub expiration_date: NaiveDate,
}
