//! Scan Service
//!
//! Runs the full pipeline: volatility gate, drawdown classification,
//! eligibility, option scoring and summaries. Every gateway call completes
//! before the next one starts, so output order always follows the ticker list.

use crate::config::ScanConfig;
use crate::error::Result;
use crate::gateway::QuoteGateway;
use crate::services::drawdown_service::{DrawdownOutcome, DrawdownService, EligibilitySet};
use crate::services::options_service::{OptionBuckets, OptionsService};
use crate::services::summary_service::{OptionTable, SummaryService};
use crate::services::volatility_service::{VolatilityReading, VolatilityRegime, VolatilityService};
use chrono::{NaiveDate, Utc};
use chrono_tz::America::New_York;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Trading-calendar "today" plus the label stamped on the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanClock {
    pub today: NaiveDate,
    pub run_date: String,
}

impl ScanClock {
    /// Wall clock in New York, where the listed ETFs trade
    pub fn now() -> Self {
        let now_et = Utc::now().with_timezone(&New_York);
        Self {
            today: now_et.date_naive(),
            run_date: now_et.format("%Y-%m-%d %H:%M %Z").to_string(),
        }
    }

    pub fn fixed(today: NaiveDate) -> Self {
        Self {
            today,
            run_date: today.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Everything one scan produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub vix_status: String,
    pub halt: bool,
    pub volatility: VolatilityReading,
    pub drawdown: Vec<DrawdownOutcome>,
    pub eligible: EligibilitySet,
    /// OTM #1..#n
    pub otm: Vec<OptionTable>,
    /// ITM #1..#n
    pub itm: Vec<OptionTable>,
    pub run_date: String,
}

impl ScanResult {
    pub fn regime(&self) -> VolatilityRegime {
        self.volatility.regime
    }
}

/// Scan service for business logic
pub struct ScanService;

impl ScanService {
    /// Execute one scan. Only volatility and configuration problems are fatal.
    pub async fn run(
        gateway: &dyn QuoteGateway,
        config: &ScanConfig,
        clock: &ScanClock,
    ) -> Result<ScanResult> {
        config.validate()?;
        let thresholds = &config.thresholds;
        let today = clock.today;

        info!(
            "ScanService::run - {} tickers via {} for {}",
            config.tickers.len(),
            gateway.id(),
            today
        );

        let volatility =
            VolatilityService::evaluate(gateway, &config.volatility_symbol, today, thresholds).await?;
        let vix_status = volatility.status_message();

        if volatility.regime == VolatilityRegime::Halt {
            warn!("{}", vix_status);
            let (otm, itm) = SummaryService::tables(OptionBuckets::new(thresholds.option_depth));
            return Ok(ScanResult {
                vix_status,
                halt: true,
                volatility,
                drawdown: Vec::new(),
                eligible: EligibilitySet::default(),
                otm,
                itm,
                run_date: clock.run_date.clone(),
            });
        }

        let drawdown = DrawdownService::evaluate_all(gateway, &config.tickers, today, thresholds).await;
        let eligible =
            DrawdownService::eligibility(gateway, &drawdown, volatility.ratio, today, thresholds).await;

        let buckets = OptionsService::scan_all(
            gateway,
            &eligible,
            volatility.regime.allows_otm(),
            today,
            thresholds,
        )
        .await;
        let (otm, itm) = SummaryService::tables(buckets);

        info!(
            "Scan complete: {} eligible, {} OTM rows, {} ITM rows",
            eligible.len(),
            otm.iter().map(|t| t.rows.len()).sum::<usize>(),
            itm.iter().map(|t| t.rows.len()).sum::<usize>()
        );

        Ok(ScanResult {
            vix_status,
            halt: false,
            volatility,
            drawdown,
            eligible,
            otm,
            itm,
            run_date: clock.run_date.clone(),
        })
    }
}
