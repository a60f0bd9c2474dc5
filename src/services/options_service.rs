//! Options Service
//!
//! Picks near-the-money calls for eligible tickers and scores them for the
//! covered-call strategy.

use crate::config::Thresholds;
use crate::gateway::types::{OptionContract, OptionType};
use crate::gateway::QuoteGateway;
use crate::services::drawdown_service::EligibilitySet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Which side of spot a strike sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionSide {
    /// strike > spot
    Otm,
    /// strike < spot
    Itm,
}

/// Scored call candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallOption {
    pub expiration: NaiveDate,
    pub ticker: String,
    pub spot: f64,
    pub strike: f64,
    /// Bid/ask midpoint
    pub premium: f64,
    pub pct_moneyness: f64,
    pub breakeven: f64,
    pub cash_yield: f64,
    pub assigned_gain: f64,
    pub works: bool,
}

/// Candidates bucketed by side and rank (index 0 = closest strike)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionBuckets {
    pub otm: Vec<Vec<CallOption>>,
    pub itm: Vec<Vec<CallOption>>,
}

impl OptionBuckets {
    pub fn new(depth: usize) -> Self {
        Self {
            otm: vec![Vec::new(); depth],
            itm: vec![Vec::new(); depth],
        }
    }

    fn insert(&mut self, side: OptionSide, rank: usize, option: CallOption) {
        let buckets = match side {
            OptionSide::Otm => &mut self.otm,
            OptionSide::Itm => &mut self.itm,
        };
        if let Some(bucket) = buckets.get_mut(rank) {
            bucket.push(option);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.otm.iter().chain(self.itm.iter()).all(Vec::is_empty)
    }
}

/// Options service for business logic
pub struct OptionsService;

impl OptionsService {
    /// Score every eligible ticker, in eligibility order
    pub async fn scan_all(
        gateway: &dyn QuoteGateway,
        eligible: &EligibilitySet,
        include_otm: bool,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> OptionBuckets {
        info!(
            "OptionsService::scan_all - {} tickers, otm={}",
            eligible.len(),
            include_otm
        );

        let mut buckets = OptionBuckets::new(thresholds.option_depth);

        for entry in eligible.iter() {
            let Some((expiration, spot, chain)) =
                Self::fetch_chain(gateway, &entry.ticker, today, thresholds).await
            else {
                continue;
            };

            let (otm, itm) = Self::partition_calls(&chain, spot, thresholds.option_depth);

            if include_otm {
                for (rank, contract) in otm.into_iter().enumerate() {
                    if let Some(option) = Self::score(&entry.ticker, spot, expiration, contract, thresholds) {
                        buckets.insert(OptionSide::Otm, rank, option);
                    }
                }
            }

            for (rank, contract) in itm.into_iter().enumerate() {
                if let Some(option) = Self::score(&entry.ticker, spot, expiration, contract, thresholds) {
                    buckets.insert(OptionSide::Itm, rank, option);
                }
            }
        }

        buckets
    }

    /// Spot, nearest expiration and its chain; `None` skips the ticker
    async fn fetch_chain(
        gateway: &dyn QuoteGateway,
        ticker: &str,
        today: NaiveDate,
        thresholds: &Thresholds,
    ) -> Option<(NaiveDate, f64, Vec<OptionContract>)> {
        let spot = match gateway.get_quote(ticker).await {
            Ok(quote) => quote.last.filter(|p| *p > 0.0),
            Err(e) => {
                warn!("{}: quote unavailable: {}", ticker, e);
                None
            }
        };
        let Some(spot) = spot else {
            info!("{}: no spot price, skipping options", ticker);
            return None;
        };

        let expirations = match gateway.get_expirations(ticker).await {
            Ok(dates) => dates,
            Err(e) => {
                warn!("{}: expirations unavailable: {}", ticker, e);
                return None;
            }
        };
        let Some(expiration) =
            Self::select_expiration(&expirations, today, thresholds.expiration_window_days)
        else {
            info!(
                "{}: no expiration within {} days, skipping options",
                ticker, thresholds.expiration_window_days
            );
            return None;
        };

        match gateway.get_chain(ticker, expiration).await {
            Ok(chain) => Some((expiration, spot, chain)),
            Err(e) => {
                warn!("{}: chain for {} unavailable: {}", ticker, expiration, e);
                None
            }
        }
    }

    /// Earliest expiration between today and today + `window_days`, inclusive
    pub fn select_expiration(
        expirations: &[NaiveDate],
        today: NaiveDate,
        window_days: i64,
    ) -> Option<NaiveDate> {
        expirations
            .iter()
            .copied()
            .filter(|d| {
                let days = (*d - today).num_days();
                (0..=window_days).contains(&days)
            })
            .min()
    }

    /// Split calls into OTM (ascending strike) and ITM (nearest to spot
    /// first), each truncated to `depth`. At-the-money strikes are in neither.
    pub fn partition_calls(
        chain: &[OptionContract],
        spot: f64,
        depth: usize,
    ) -> (Vec<&OptionContract>, Vec<&OptionContract>) {
        let calls = chain.iter().filter(|c| c.option_type == OptionType::Call);

        let mut otm: Vec<&OptionContract> = calls.clone().filter(|c| c.strike > spot).collect();
        otm.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        otm.truncate(depth);

        let mut itm: Vec<&OptionContract> = calls.filter(|c| c.strike < spot).collect();
        itm.sort_by(|a, b| (a.strike - spot).abs().total_cmp(&(b.strike - spot).abs()));
        itm.truncate(depth);

        (otm, itm)
    }

    /// Compute yield metrics for one contract; `None` when it has no quote.
    /// Metrics stay unrounded so `works` is decided at full precision.
    pub fn score(
        ticker: &str,
        spot: f64,
        expiration: NaiveDate,
        contract: &OptionContract,
        thresholds: &Thresholds,
    ) -> Option<CallOption> {
        if contract.bid == 0.0 && contract.ask == 0.0 {
            debug!("{}: strike {} has no bid/ask, skipped", ticker, contract.strike);
            return None;
        }

        let strike = contract.strike;
        let premium = (contract.bid + contract.ask) / 2.0;
        let cash_yield = premium * 100.0 / spot;
        let assigned_gain = (strike + premium - spot) * 100.0 / spot;
        let pct_moneyness = (strike - spot) * 100.0 / spot;

        let works = (strike > spot && cash_yield >= thresholds.otm_min_cash_yield)
            || (strike < spot && assigned_gain >= thresholds.itm_min_assigned_gain);

        Some(CallOption {
            expiration,
            ticker: ticker.to_string(),
            spot,
            strike,
            premium,
            pct_moneyness,
            breakeven: spot - premium,
            cash_yield,
            assigned_gain,
            works,
        })
    }
}
