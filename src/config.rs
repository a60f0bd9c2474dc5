//! Scanner configuration
//!
//! Everything the pipeline needs is passed explicitly through [`ScanConfig`].
//! A JSON file may override any subset of fields; missing fields keep their
//! defaults.

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default leveraged-ETF universe
pub const DEFAULT_TICKERS: &[&str] = &[
    "TQQQ", "SOXL", "UPRO", "TECL", "TNA", "FNGU", "LABU", "NVDL", "TSLL",
];

/// Default volatility index symbol
pub const DEFAULT_VOLATILITY_SYMBOL: &str = "VIX";

/// Default environment variable holding the gateway bearer token
pub const DEFAULT_TOKEN_ENV: &str = "TRADIER_API_TOKEN";

/// Default gateway base URL
pub const DEFAULT_BASE_URL: &str = "https://api.tradier.com";

/// Tunable thresholds for every stage of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Volatility ratio at or above which the scan halts
    pub halt_ratio: f64,
    /// Volatility ratio at or above which OTM candidates are suppressed
    pub caution_ratio: f64,
    /// Momentum override only applies below this volatility ratio
    pub momentum_max_ratio: f64,
    /// Drawdown above this is "Evaluate Rotation"
    pub rotation_drawdown: f64,
    /// Drawdown at or above this is "Deep ITM"
    pub deep_itm_drawdown: f64,
    /// Drawdown at or above this is "Hybrid"
    pub hybrid_drawdown: f64,
    /// Expirations within this many days of today are eligible
    pub expiration_window_days: i64,
    /// Calendar-day lookback for the drawdown series
    pub drawdown_lookback_days: i64,
    /// Calendar-day window for the volatility index series
    pub volatility_window_days: i64,
    /// Number of closes in the volatility moving average
    pub volatility_sma_period: usize,
    /// Trailing window for smoothing daily highs
    pub smoothing_window: usize,
    /// Maximum number of smoothed points considered for the high-water mark
    pub smoothing_cap: usize,
    /// Calendar-day window for the momentum series
    pub momentum_lookback_days: i64,
    /// Number of recent highs averaged by the momentum filter
    pub momentum_highs: usize,
    /// Option candidates kept per side and ticker
    pub option_depth: usize,
    /// Minimum cash yield % for an OTM call to "work"
    pub otm_min_cash_yield: f64,
    /// Minimum assigned gain % for an ITM call to "work"
    pub itm_min_assigned_gain: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            halt_ratio: 150.0,
            caution_ratio: 125.0,
            momentum_max_ratio: 140.0,
            rotation_drawdown: 30.0,
            deep_itm_drawdown: 20.0,
            hybrid_drawdown: 10.0,
            expiration_window_days: 7,
            drawdown_lookback_days: 84,
            volatility_window_days: 40,
            volatility_sma_period: 20,
            smoothing_window: 5,
            smoothing_cap: 60,
            momentum_lookback_days: 10,
            momentum_highs: 5,
            option_depth: 3,
            otm_min_cash_yield: 2.0,
            itm_min_assigned_gain: 1.5,
        }
    }
}

/// Quote gateway connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Name of the environment variable carrying the bearer token
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP trigger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Daily scheduler settings (America/New_York wall clock)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub hour: u32,
    pub minute: u32,
    pub output_dir: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: 9,
            minute: 45,
            output_dir: "reports".to_string(),
        }
    }
}

/// Complete scanner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub tickers: Vec<String>,
    pub volatility_symbol: String,
    pub thresholds: Thresholds,
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
    pub schedule: ScheduleConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            volatility_symbol: DEFAULT_VOLATILITY_SYMBOL.to_string(),
            thresholds: Thresholds::default(),
            gateway: GatewayConfig::default(),
            server: ServerConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    ScanError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                let config: ScanConfig = serde_json::from_str(&raw)?;
                tracing::info!("Loaded configuration from {}", path.display());
                config
            }
            None => ScanConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;

        if self.tickers.is_empty() {
            return Err(ScanError::Config("Ticker list is empty".to_string()));
        }
        if self.tickers.iter().any(|s| s.trim().is_empty()) {
            return Err(ScanError::Config("Ticker symbols must not be blank".to_string()));
        }
        if self.volatility_symbol.trim().is_empty() {
            return Err(ScanError::Config("Volatility symbol must not be blank".to_string()));
        }
        if t.caution_ratio >= t.halt_ratio {
            return Err(ScanError::Config(format!(
                "caution_ratio ({}) must be below halt_ratio ({})",
                t.caution_ratio, t.halt_ratio
            )));
        }
        if !(t.hybrid_drawdown < t.deep_itm_drawdown && t.deep_itm_drawdown <= t.rotation_drawdown) {
            return Err(ScanError::Config(
                "Drawdown thresholds must satisfy hybrid < deep_itm <= rotation".to_string(),
            ));
        }
        if t.volatility_sma_period == 0 || t.smoothing_window == 0 || t.smoothing_cap == 0 {
            return Err(ScanError::Config(
                "Window sizes must be greater than zero".to_string(),
            ));
        }
        if t.momentum_highs == 0 || t.option_depth == 0 {
            return Err(ScanError::Config(
                "momentum_highs and option_depth must be greater than zero".to_string(),
            ));
        }
        if t.expiration_window_days < 0
            || t.drawdown_lookback_days <= 0
            || t.volatility_window_days <= 0
            || t.momentum_lookback_days <= 0
        {
            return Err(ScanError::Config("Day windows must be positive".to_string()));
        }
        if self.schedule.hour > 23 || self.schedule.minute > 59 {
            return Err(ScanError::Config(format!(
                "Invalid schedule time {:02}:{:02}",
                self.schedule.hour, self.schedule.minute
            )));
        }

        Ok(())
    }
}
