//! Momentum Service
//!
//! Decides whether recent strength is enough to keep a ticker flagged for
//! rotation in the covered-call universe. Never fails: missing or short data
//! simply means no override.

use crate::config::Thresholds;
use crate::gateway::types::{Bar, Interval};
use crate::gateway::QuoteGateway;
use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

/// Momentum service for business logic
pub struct MomentumService;

impl MomentumService {
    /// Fetch the short momentum window and evaluate the override rule
    pub async fn has_override(
        gateway: &dyn QuoteGateway,
        ticker: &str,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> bool {
        let start = today - Duration::days(thresholds.momentum_lookback_days);

        match gateway.get_history(ticker, Interval::Daily, start, today).await {
            Ok(bars) => Self::override_from_bars(ticker, &bars, thresholds),
            Err(e) => {
                warn!("Momentum data unavailable for {}: {}", ticker, e);
                false
            }
        }
    }

    /// Last close strictly above the mean of the most recent highs
    pub fn override_from_bars(ticker: &str, bars: &[Bar], thresholds: &Thresholds) -> bool {
        let needed = thresholds.momentum_highs;
        let Some(last) = bars.last() else {
            return false;
        };
        if bars.len() < needed {
            debug!("{}: {} highs, need {} for momentum", ticker, bars.len(), needed);
            return false;
        }

        let recent = &bars[bars.len() - needed..];
        let mean_high = recent.iter().map(|b| b.high).sum::<f64>() / needed as f64;
        let strong = last.close > mean_high;

        debug!(
            "{}: last close {:.2} vs mean of last {} highs {:.2} -> override={}",
            ticker, last.close, needed, mean_high, strong
        );

        strong
    }

    /// Whether a rotation-flagged ticker stays eligible
    pub fn retains_rotation(override_active: bool, ratio: f64, thresholds: &Thresholds) -> bool {
        override_active && ratio < thresholds.momentum_max_ratio
    }
}
