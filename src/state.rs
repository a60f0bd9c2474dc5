//! Application state management

use crate::config::ScanConfig;
use crate::error::Result;
use crate::gateway::{QuoteGateway, TradierGateway};
use crate::services::{ScanClock, ScanResult, ScanService};
use std::sync::Arc;
use tracing::info;

/// State shared by every trigger
#[derive(Clone)]
pub struct AppState {
    /// Validated scanner configuration
    pub config: Arc<ScanConfig>,

    /// Market data gateway
    pub gateway: Arc<dyn QuoteGateway>,
}

impl AppState {
    /// Create state backed by the Tradier gateway
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let gateway = TradierGateway::from_config(&config.gateway)?;
        info!("Using {} gateway at {}", gateway.id(), config.gateway.base_url);
        Ok(Self::with_gateway(config, Arc::new(gateway)))
    }

    /// Create state around an existing gateway
    pub fn with_gateway(config: ScanConfig, gateway: Arc<dyn QuoteGateway>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
        }
    }

    /// Run one scan against the New York wall clock
    pub async fn scan(&self) -> Result<ScanResult> {
        self.scan_at(&ScanClock::now()).await
    }

    pub async fn scan_at(&self, clock: &ScanClock) -> Result<ScanResult> {
        ScanService::run(self.gateway.as_ref(), &self.config, clock).await
    }
}
