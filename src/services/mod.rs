//! Services Layer
//!
//! The scan pipeline. Every trigger (CLI, scheduler, HTTP) calls into
//! `ScanService`, which drives the other services in order.
//!
//! # Architecture
//!
//! ```text
//! CLI / Scheduler / HTTP --> ScanService ──> VolatilityService
//!                                       ├──> DrawdownService ──> MomentumService
//!                                       ├──> OptionsService
//!                                       └──> SummaryService
//!                                                 │
//!                                           QuoteGateway
//! ```
//!
//! # Services
//!
//! - `VolatilityService` - Volatility ratio and regime (HALT / CAUTION / NORMAL)
//! - `DrawdownService` - Smoothed drawdown status and eligibility
//! - `MomentumService` - Momentum override for rotation-flagged tickers
//! - `OptionsService` - Near-the-money call selection and scoring
//! - `SummaryService` - Rank tables and averaged returns
//! - `ScanService` - The full pipeline

pub mod volatility_service;
pub mod drawdown_service;
pub mod momentum_service;
pub mod options_service;
pub mod summary_service;
pub mod scan_service;

pub use volatility_service::{VolatilityService, VolatilityReading, VolatilityRegime};
pub use drawdown_service::{
    DrawdownService, DrawdownOutcome, DrawdownRow, DrawdownStatus, EligibilitySet, FailureReason,
    TickerFailure,
};
pub use momentum_service::MomentumService;
pub use options_service::{OptionsService, CallOption, OptionBuckets, OptionSide};
pub use summary_service::{SummaryService, OptionTable};
pub use scan_service::{ScanService, ScanClock, ScanResult};

/// Round to 2 decimal places, the precision of every reported percentage
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
