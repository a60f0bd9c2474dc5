//! Drawdown Service
//!
//! Classifies each ticker by how far it trades below a smoothed 12-week
//! high-water mark, and builds the set of tickers eligible for covered calls.

use crate::config::Thresholds;
use crate::gateway::types::{Bar, Interval};
use crate::gateway::QuoteGateway;
use crate::services::momentum_service::MomentumService;
use crate::services::round2;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Drawdown classification, least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawdownStatus {
    Otm,
    Hybrid,
    DeepItm,
    EvaluateRotation,
}

impl DrawdownStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DrawdownStatus::Otm => "OTM",
            DrawdownStatus::Hybrid => "Hybrid",
            DrawdownStatus::DeepItm => "Deep ITM",
            DrawdownStatus::EvaluateRotation => "Evaluate Rotation",
        }
    }
}

/// Per-ticker drawdown measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownRow {
    pub ticker: String,
    pub current_price: f64,
    /// Highest close in the lookback
    pub raw_high: f64,
    /// High-water mark from the smoothed highs series
    pub smoothed_high: f64,
    pub drawdown_pct: f64,
    pub status: DrawdownStatus,
}

/// Why a ticker has no drawdown row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FailureReason {
    /// Gateway call failed
    FetchFailed(String),
    /// Gateway returned an empty series
    NoData,
    /// Too few bars to smooth the highs
    InsufficientHistory { available: usize, required: usize },
    /// Smoothed high is zero, negative or not finite
    InvalidHigh(f64),
}

impl FailureReason {
    /// Status cell shown in place of a drawdown status
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::FetchFailed(_) => "Fetch Failed",
            FailureReason::NoData
            | FailureReason::InsufficientHistory { .. }
            | FailureReason::InvalidHigh(_) => "Error",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            FailureReason::FetchFailed(msg) => msg.clone(),
            FailureReason::NoData => "no price history returned".to_string(),
            FailureReason::InsufficientHistory { available, required } => {
                format!("{} bars, need at least {}", available, required)
            }
            FailureReason::InvalidHigh(high) => format!("unusable smoothed high {}", high),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerFailure {
    pub ticker: String,
    pub reason: FailureReason,
}

/// Result of classifying one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawdownOutcome {
    Row(DrawdownRow),
    Failed(TickerFailure),
}

impl DrawdownOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            DrawdownOutcome::Row(row) => &row.ticker,
            DrawdownOutcome::Failed(failure) => &failure.ticker,
        }
    }

    pub fn row(&self) -> Option<&DrawdownRow> {
        match self {
            DrawdownOutcome::Row(row) => Some(row),
            DrawdownOutcome::Failed(_) => None,
        }
    }
}

/// Eligible ticker with the status it was retained under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleTicker {
    pub ticker: String,
    pub status: DrawdownStatus,
}

/// Tickers cleared for option scoring, in scan order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySet {
    entries: Vec<EligibleTicker>,
}

impl EligibilitySet {
    pub fn push(&mut self, ticker: &str, status: DrawdownStatus) {
        if !self.contains(ticker) {
            self.entries.push(EligibleTicker {
                ticker: ticker.to_string(),
                status,
            });
        }
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.entries.iter().any(|e| e.ticker == ticker)
    }

    pub fn status(&self, ticker: &str) -> Option<DrawdownStatus> {
        self.entries.iter().find(|e| e.ticker == ticker).map(|e| e.status)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EligibleTicker> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drawdown service for business logic
pub struct DrawdownService;

impl DrawdownService {
    /// Classify every ticker, in order. Failures are recorded, never raised.
    pub async fn evaluate_all(
        gateway: &dyn QuoteGateway,
        tickers: &[String],
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> Vec<DrawdownOutcome> {
        info!("DrawdownService::evaluate_all - {} tickers", tickers.len());

        let mut outcomes = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            outcomes.push(Self::evaluate(gateway, ticker, today, thresholds).await);
        }
        outcomes
    }

    /// Fetch the lookback window for one ticker and classify it
    pub async fn evaluate(
        gateway: &dyn QuoteGateway,
        ticker: &str,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> DrawdownOutcome {
        let start = today - Duration::days(thresholds.drawdown_lookback_days);

        let result = match gateway.get_history(ticker, Interval::Daily, start, today).await {
            Ok(bars) => Self::compute_row(ticker, &bars, thresholds),
            Err(e) => Err(FailureReason::FetchFailed(e.to_string())),
        };

        match result {
            Ok(row) => {
                info!(
                    "{}: price={:.2} high={:.2} smoothed={:.2} drawdown={:.2}% status={}",
                    row.ticker,
                    row.current_price,
                    row.raw_high,
                    row.smoothed_high,
                    row.drawdown_pct,
                    row.status.label()
                );
                DrawdownOutcome::Row(row)
            }
            Err(reason) => {
                warn!("{}: drawdown unavailable ({})", ticker, reason.detail());
                DrawdownOutcome::Failed(TickerFailure {
                    ticker: ticker.to_string(),
                    reason,
                })
            }
        }
    }

    /// Compute the drawdown row from a bar series (oldest first)
    pub fn compute_row(
        ticker: &str,
        bars: &[Bar],
        thresholds: &Thresholds,
    ) -> std::result::Result<DrawdownRow, FailureReason> {
        let Some(last) = bars.last() else {
            return Err(FailureReason::NoData);
        };

        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let smoothed_high = Self::smoothed_high(&highs, thresholds.smoothing_window, thresholds.smoothing_cap)
            .ok_or(FailureReason::InsufficientHistory {
                available: bars.len(),
                required: thresholds.smoothing_window,
            })?;
        if !smoothed_high.is_finite() || smoothed_high <= 0.0 {
            return Err(FailureReason::InvalidHigh(smoothed_high));
        }

        let raw_high = bars.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
        let current_price = last.close;
        let drawdown_pct = round2((smoothed_high - current_price) / smoothed_high * 100.0);

        Ok(DrawdownRow {
            ticker: ticker.to_string(),
            current_price,
            raw_high,
            smoothed_high,
            drawdown_pct,
            status: Self::classify(drawdown_pct, thresholds),
        })
    }

    /// Maximum of the trailing moving average of `highs`, limited to the
    /// most recent `cap` averaged points. `None` until `window` points exist.
    pub fn smoothed_high(highs: &[f64], window: usize, cap: usize) -> Option<f64> {
        if window == 0 || highs.len() < window {
            return None;
        }

        let averaged: Vec<f64> = highs
            .windows(window)
            .map(|w| w.iter().sum::<f64>() / window as f64)
            .collect();

        let recent = if averaged.len() >= cap {
            &averaged[averaged.len() - cap..]
        } else {
            &averaged[..]
        };

        recent.iter().copied().reduce(f64::max)
    }

    /// Status thresholds, checked from most to least severe
    pub fn classify(drawdown_pct: f64, thresholds: &Thresholds) -> DrawdownStatus {
        if drawdown_pct > thresholds.rotation_drawdown {
            DrawdownStatus::EvaluateRotation
        } else if drawdown_pct >= thresholds.deep_itm_drawdown {
            DrawdownStatus::DeepItm
        } else if drawdown_pct >= thresholds.hybrid_drawdown {
            DrawdownStatus::Hybrid
        } else {
            DrawdownStatus::Otm
        }
    }

    /// Build the eligibility set. Rotation-flagged tickers are kept only when
    /// momentum overrides and volatility is below the momentum ceiling.
    pub async fn eligibility(
        gateway: &dyn QuoteGateway,
        outcomes: &[DrawdownOutcome],
        volatility_ratio: f64,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> EligibilitySet {
        let mut eligible = EligibilitySet::default();

        for row in outcomes.iter().filter_map(DrawdownOutcome::row) {
            match row.status {
                DrawdownStatus::EvaluateRotation => {
                    let override_active =
                        MomentumService::has_override(gateway, &row.ticker, today, thresholds).await;

                    if MomentumService::retains_rotation(override_active, volatility_ratio, thresholds) {
                        info!("{}: momentum override, retained despite rotation signal", row.ticker);
                        eligible.push(&row.ticker, row.status);
                    } else {
                        info!(
                            "{}: dropped (override={}, ratio={:.2})",
                            row.ticker, override_active, volatility_ratio
                        );
                    }
                }
                _ => eligible.push(&row.ticker, row.status),
            }
        }

        info!("DrawdownService::eligibility - {} of {} tickers eligible", eligible.len(), outcomes.len());
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{daily_bars, StaticGateway};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        let t = Thresholds::default();
        assert_eq!(DrawdownService::classify(30.01, &t), DrawdownStatus::EvaluateRotation);
        assert_eq!(DrawdownService::classify(30.00, &t), DrawdownStatus::DeepItm);
        assert_eq!(DrawdownService::classify(20.00, &t), DrawdownStatus::DeepItm);
        assert_eq!(DrawdownService::classify(19.99, &t), DrawdownStatus::Hybrid);
        assert_eq!(DrawdownService::classify(10.00, &t), DrawdownStatus::Hybrid);
        assert_eq!(DrawdownService::classify(9.99, &t), DrawdownStatus::Otm);
        assert_eq!(DrawdownService::classify(-3.0, &t), DrawdownStatus::Otm);
    }

    #[test]
    fn test_smoothed_high_damps_single_spike() {
        // One-day spike to 200 among highs of 100
        let mut highs = vec![100.0; 10];
        highs[5] = 200.0;
        let smoothed = DrawdownService::smoothed_high(&highs, 5, 60).unwrap();
        assert!((smoothed - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_smoothed_high_respects_cap() {
        // Early peak falls outside the last 3 averaged points
        let highs = vec![500.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0];
        assert_eq!(DrawdownService::smoothed_high(&highs, 5, 60), Some(180.0));
        assert_eq!(DrawdownService::smoothed_high(&highs, 5, 3), Some(100.0));
    }

    #[test]
    fn test_smoothed_high_needs_full_window() {
        assert_eq!(DrawdownService::smoothed_high(&[1.0, 2.0, 3.0, 4.0], 5, 60), None);
    }

    #[test]
    fn test_compute_row_uses_smoothed_high() {
        let t = Thresholds::default();
        // closes 100 x 9 then 80; highs = close + 0 -> smoothed high 100
        let mut closes = vec![100.0; 9];
        closes.push(80.0);
        let bars = daily_bars(today(), &closes, 0.0);

        let row = DrawdownService::compute_row("TQQQ", &bars, &t).unwrap();
        assert_eq!(row.current_price, 80.0);
        assert_eq!(row.raw_high, 100.0);
        assert_eq!(row.smoothed_high, 100.0);
        assert_eq!(row.drawdown_pct, 20.0);
        assert_eq!(row.status, DrawdownStatus::DeepItm);
    }

    #[test]
    fn test_compute_row_failures() {
        let t = Thresholds::default();
        assert_eq!(DrawdownService::compute_row("SOXL", &[], &t), Err(FailureReason::NoData));

        let bars = daily_bars(today(), &[10.0, 11.0, 12.0], 0.5);
        assert_eq!(
            DrawdownService::compute_row("SOXL", &bars, &t),
            Err(FailureReason::InsufficientHistory { available: 3, required: 5 })
        );
    }

    #[test]
    fn test_compute_row_rejects_zero_high() {
        let t = Thresholds::default();
        let bars = daily_bars(today(), &[0.0; 10], 0.0);
        assert_eq!(
            DrawdownService::compute_row("ZZZ", &bars, &t),
            Err(FailureReason::InvalidHigh(0.0))
        );
    }

    #[tokio::test]
    async fn test_zero_high_is_not_eligible() {
        let t = Thresholds::default();
        let gateway = StaticGateway::new().with_history("ZZZ", daily_bars(today(), &[0.0; 10], 0.0));

        let outcomes = DrawdownService::evaluate_all(&gateway, &["ZZZ".to_string()], today(), &t).await;
        assert!(outcomes[0].row().is_none());

        let eligible = DrawdownService::eligibility(&gateway, &outcomes, 100.0, today(), &t).await;
        assert!(eligible.is_empty());
    }

    #[test]
    fn test_failure_labels() {
        assert_eq!(FailureReason::FetchFailed("timeout".into()).label(), "Fetch Failed");
        assert_eq!(FailureReason::NoData.label(), "Error");
        assert_eq!(FailureReason::InvalidHigh(0.0).label(), "Error");
    }

    #[tokio::test]
    async fn test_evaluate_all_keeps_order_and_records_failures() {
        let t = Thresholds::default();
        let gateway = StaticGateway::new()
            .with_history("TQQQ", daily_bars(today(), &vec![50.0; 20], 0.0))
            .with_failure("SOXL")
            .with_history("UPRO", vec![]);

        let tickers = vec!["TQQQ".to_string(), "SOXL".to_string(), "UPRO".to_string()];
        let outcomes = DrawdownService::evaluate_all(&gateway, &tickers, today(), &t).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].ticker(), "TQQQ");
        assert_eq!(outcomes[0].row().unwrap().status, DrawdownStatus::Otm);
        assert!(matches!(
            &outcomes[1],
            DrawdownOutcome::Failed(TickerFailure { reason: FailureReason::FetchFailed(_), .. })
        ));
        assert!(matches!(
            &outcomes[2],
            DrawdownOutcome::Failed(TickerFailure { reason: FailureReason::NoData, .. })
        ));
    }

    fn rotation_row(ticker: &str) -> DrawdownOutcome {
        DrawdownOutcome::Row(DrawdownRow {
            ticker: ticker.to_string(),
            current_price: 60.0,
            raw_high: 100.0,
            smoothed_high: 100.0,
            drawdown_pct: 40.0,
            status: DrawdownStatus::EvaluateRotation,
        })
    }

    #[tokio::test]
    async fn test_eligibility_rotation_rules() {
        let t = Thresholds::default();
        // Strong finish: last close 70 above mean of highs 62
        let strong = daily_bars(today(), &[60.0, 60.0, 60.0, 60.0, 70.0], 0.0);
        let gateway = StaticGateway::new().with_history("LABU", strong);
        let outcomes = vec![
            DrawdownOutcome::Row(DrawdownRow {
                ticker: "TQQQ".to_string(),
                current_price: 95.0,
                raw_high: 100.0,
                smoothed_high: 100.0,
                drawdown_pct: 5.0,
                status: DrawdownStatus::Otm,
            }),
            rotation_row("LABU"),
            DrawdownOutcome::Failed(TickerFailure {
                ticker: "SOXL".to_string(),
                reason: FailureReason::NoData,
            }),
        ];

        let kept = DrawdownService::eligibility(&gateway, &outcomes, 139.99, today(), &t).await;
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.status("LABU"), Some(DrawdownStatus::EvaluateRotation));
        assert!(!kept.contains("SOXL"));

        let kept = DrawdownService::eligibility(&gateway, &outcomes, 140.0, today(), &t).await;
        assert_eq!(kept.len(), 1);
        assert!(kept.contains("TQQQ"));
        assert!(!kept.contains("LABU"));
    }

    #[tokio::test]
    async fn test_rotation_without_momentum_is_dropped() {
        let t = Thresholds::default();
        let weak = daily_bars(today(), &[70.0, 68.0, 66.0, 64.0, 60.0], 1.0);
        let gateway = StaticGateway::new().with_history("NVDL", weak);
        let kept = DrawdownService::eligibility(&gateway, &[rotation_row("NVDL")], 100.0, today(), &t).await;
        assert!(kept.is_empty());
    }
}
