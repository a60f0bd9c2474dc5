//! Summary Service
//!
//! Turns option rank buckets into output tables with an averaged return.

use crate::services::options_service::{CallOption, OptionBuckets, OptionSide};
use crate::services::round2;
use serde::{Deserialize, Serialize};

/// One rank table (e.g. "OTM #1") across all eligible tickers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionTable {
    pub side: OptionSide,
    /// 1-based rank of the strike relative to spot
    pub rank: usize,
    pub rows: Vec<CallOption>,
    /// Mean of every cash yield and assigned gain in `rows`; `None` when empty
    pub average_return: Option<f64>,
}

impl OptionTable {
    pub fn title(&self) -> String {
        let side = match self.side {
            OptionSide::Otm => "OTM",
            OptionSide::Itm => "ITM",
        };
        format!("{} #{}", side, self.rank)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summary service for business logic
pub struct SummaryService;

impl SummaryService {
    /// Build a table for one bucket. Empty buckets carry no summary.
    pub fn summarize(side: OptionSide, rank: usize, rows: Vec<CallOption>) -> OptionTable {
        let average_return = Self::average_return(&rows);
        OptionTable {
            side,
            rank,
            rows,
            average_return,
        }
    }

    /// Mean over cash yields and assigned gains pooled together
    pub fn average_return(rows: &[CallOption]) -> Option<f64> {
        if rows.is_empty() {
            return None;
        }

        let values: Vec<f64> = rows
            .iter()
            .map(|r| r.cash_yield)
            .chain(rows.iter().map(|r| r.assigned_gain))
            .collect();

        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }

    /// All tables for a scan: OTM #1..n followed by ITM #1..n
    pub fn tables(buckets: OptionBuckets) -> (Vec<OptionTable>, Vec<OptionTable>) {
        let otm = buckets
            .otm
            .into_iter()
            .enumerate()
            .map(|(i, rows)| Self::summarize(OptionSide::Otm, i + 1, rows))
            .collect();
        let itm = buckets
            .itm
            .into_iter()
            .enumerate()
            .map(|(i, rows)| Self::summarize(OptionSide::Itm, i + 1, rows))
            .collect();
        (otm, itm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(ticker: &str, cash_yield: f64, assigned_gain: f64) -> CallOption {
        CallOption {
            expiration: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            ticker: ticker.to_string(),
            spot: 100.0,
            strike: 101.0,
            premium: 2.0,
            pct_moneyness: 1.0,
            breakeven: 98.0,
            cash_yield,
            assigned_gain,
            works: true,
        }
    }

    #[test]
    fn test_average_pools_yields_and_gains() {
        let rows = vec![row("TQQQ", 2.0, 1.0), row("SOXL", 3.0, 2.0)];
        assert_eq!(SummaryService::average_return(&rows), Some(2.0));
    }

    #[test]
    fn test_average_is_not_mean_of_means() {
        // pooled: (1 + 5 + 2 + 4) / 4 = 3.0
        let rows = vec![row("TQQQ", 1.0, 5.0), row("SOXL", 2.0, 4.0)];
        assert_eq!(SummaryService::average_return(&rows), Some(3.0));
    }

    #[test]
    fn test_empty_table_has_no_summary() {
        let table = SummaryService::summarize(OptionSide::Itm, 2, vec![]);
        assert!(table.is_empty());
        assert_eq!(table.average_return, None);
        assert_eq!(table.title(), "ITM #2");
    }

    #[test]
    fn test_tables_ranked_from_one() {
        let mut buckets = OptionBuckets::new(3);
        buckets.otm[1].push(row("TQQQ", 2.0, 3.0));
        let (otm, itm) = SummaryService::tables(buckets);
        assert_eq!(otm.len(), 3);
        assert_eq!(itm.len(), 3);
        assert_eq!(otm[1].title(), "OTM #2");
        assert_eq!(otm[1].average_return, Some(2.5));
        assert!(otm[0].average_return.is_none());
    }
}
