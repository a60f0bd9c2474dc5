//! BW Scanner - Covered Call Candidate Scanner
//!
//! Scans a universe of leveraged ETFs for buy-write candidates: a
//! volatility gate, smoothed drawdown classification with a momentum
//! override, and near-the-money call scoring.

pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod report;
pub mod scheduler;
pub mod server;
pub mod services;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. Logs go to stderr so reports can be piped from stdout.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bw_scanner=info,bw_scanner_lib=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
