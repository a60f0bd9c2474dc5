//! Volatility Service
//!
//! Volatility circuit breaker. Compares the latest volatility index close to
//! its moving average and classifies the market regime. Runs first in every
//! scan and can stop it outright.

use crate::config::Thresholds;
use crate::error::{Result, ScanError};
use crate::gateway::types::Interval;
use crate::gateway::QuoteGateway;
use crate::services::round2;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Market regime derived from the volatility ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolatilityRegime {
    /// No further processing
    Halt,
    /// ITM candidates only
    Caution,
    Normal,
}

impl VolatilityRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityRegime::Halt => "HALT",
            VolatilityRegime::Caution => "CAUTION",
            VolatilityRegime::Normal => "NORMAL",
        }
    }

    pub fn allows_otm(&self) -> bool {
        matches!(self, VolatilityRegime::Normal)
    }
}

/// Latest close against its moving average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReading {
    pub last_close: f64,
    pub sma: f64,
    /// last_close / sma * 100, rounded to 2 decimals
    pub ratio: f64,
    pub regime: VolatilityRegime,
}

impl VolatilityReading {
    /// Operator-facing status line
    pub fn status_message(&self) -> String {
        match self.regime {
            VolatilityRegime::Halt => format!(
                "VIX ratio {:.2}% (HALT): volatility spike, no new covered calls today",
                self.ratio
            ),
            VolatilityRegime::Caution => format!(
                "VIX ratio {:.2}% (CAUTION): elevated volatility, ITM calls only",
                self.ratio
            ),
            VolatilityRegime::Normal => format!("VIX ratio {:.2}% (NORMAL): full scan", self.ratio),
        }
    }
}

/// Volatility service for business logic
pub struct VolatilityService;

impl VolatilityService {
    /// Fetch the volatility index series and compute the reading.
    ///
    /// Any failure here is fatal to the scan.
    pub async fn evaluate(
        gateway: &dyn QuoteGateway,
        symbol: &str,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> Result<VolatilityReading> {
        let start = today - Duration::days(thresholds.volatility_window_days);
        info!("VolatilityService::evaluate - {} {} to {}", symbol, start, today);

        let bars = gateway
            .get_history(symbol, Interval::Daily, start, today)
            .await
            .map_err(|e| ScanError::Gateway(format!("Volatility data unavailable for {}: {}", symbol, e)))?;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let reading = Self::reading_from_closes(symbol, &closes, thresholds)?;

        info!(
            "{} last={:.2} sma{}={:.4} ratio={:.2} regime={}",
            symbol,
            reading.last_close,
            thresholds.volatility_sma_period,
            reading.sma,
            reading.ratio,
            reading.regime.as_str()
        );

        Ok(reading)
    }

    /// Compute the reading from a close series (oldest first)
    pub fn reading_from_closes(
        symbol: &str,
        closes: &[f64],
        thresholds: &Thresholds,
    ) -> Result<VolatilityReading> {
        let period = thresholds.volatility_sma_period;
        if closes.len() < period {
            return Err(ScanError::InsufficientData {
                symbol: symbol.to_string(),
                required: period,
                available: closes.len(),
            });
        }

        let window = &closes[closes.len() - period..];
        let sma = window.iter().sum::<f64>() / period as f64;
        if !sma.is_finite() || sma <= 0.0 {
            return Err(ScanError::NoData(format!(
                "Non-positive moving average for {}",
                symbol
            )));
        }

        let last_close = closes[closes.len() - 1];
        let ratio = round2(last_close / sma * 100.0);

        Ok(VolatilityReading {
            last_close,
            sma,
            ratio,
            regime: Self::classify(ratio, thresholds),
        })
    }

    /// Map a ratio onto a regime; higher thresholds are checked first
    pub fn classify(ratio: f64, thresholds: &Thresholds) -> VolatilityRegime {
        if ratio >= thresholds.halt_ratio {
            VolatilityRegime::Halt
        } else if ratio >= thresholds.caution_ratio {
            VolatilityRegime::Caution
        } else {
            VolatilityRegime::Normal
        }
    }
}
