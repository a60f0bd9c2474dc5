//! Presentation boundary
//!
//! Typed scan results are flattened into positional string rows here and
//! nowhere else. Column order is part of the contract: the HTML page and
//! JSON consumers index cells by position.

mod html;

pub use html::render_html;

use crate::services::{CallOption, DrawdownOutcome, OptionTable, ScanResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Drawdown table columns
pub const DRAWDOWN_HEADERS: [&str; 6] = [
    "Ticker",
    "Current Price",
    "12W High (Raw)",
    "12W High (Smoothed)",
    "Drawdown %",
    "Status",
];

/// Option table columns
pub const OPTION_HEADERS: [&str; 10] = [
    "Expiration",
    "Ticker",
    "Spot",
    "Strike",
    "Premium",
    "% Moneyness",
    "Breakeven",
    "Cash Yield %",
    "Assigned Gain %",
    "Works",
];

/// Label in the first cell of a summary row
pub const SUMMARY_LABEL: &str = "Average Return";

pub type Row = Vec<String>;

/// Positional drawdown row
pub fn encode_drawdown(outcome: &DrawdownOutcome) -> Row {
    match outcome {
        DrawdownOutcome::Row(row) => vec![
            row.ticker.clone(),
            format!("{:.2}", row.current_price),
            format!("{:.2}", row.raw_high),
            format!("{:.2}", row.smoothed_high),
            format!("{:.2}%", row.drawdown_pct),
            row.status.label().to_string(),
        ],
        DrawdownOutcome::Failed(failure) => {
            let mut cells = vec![failure.ticker.clone()];
            cells.extend(std::iter::repeat("-".to_string()).take(DRAWDOWN_HEADERS.len() - 2));
            cells.push(failure.reason.label().to_string());
            cells
        }
    }
}

/// Positional option row
pub fn encode_option(option: &CallOption) -> Row {
    vec![
        option.expiration.format("%Y-%m-%d").to_string(),
        option.ticker.clone(),
        format!("{:.2}", option.spot),
        format!("{:.2}", option.strike),
        format!("{:.2}", option.premium),
        format!("{:.2}%", option.pct_moneyness),
        format!("{:.2}", option.breakeven),
        format!("{:.2}%", option.cash_yield),
        format!("{:.2}%", option.assigned_gain),
        if option.works { "Yes" } else { "No" }.to_string(),
    ]
}

/// Positional rows for a rank table: data rows, then a blank separator and
/// the summary row when the table is not empty
pub fn encode_table(table: &OptionTable) -> Vec<Row> {
    let mut rows: Vec<Row> = table.rows.iter().map(encode_option).collect();

    if let Some(avg) = table.average_return {
        let width = OPTION_HEADERS.len();
        rows.push(vec![String::new(); width]);

        let mut summary = vec![SUMMARY_LABEL.to_string(), format!("{:.2}%", avg)];
        summary.resize(width, String::new());
        rows.push(summary);
    }

    rows
}

/// Wire document consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDocument {
    pub vix_status: String,
    pub halt: bool,
    pub drawdown_table: Vec<Row>,
    /// `otm1`..`otmN` and `itm1`..`itmN`
    #[serde(flatten)]
    pub option_tables: BTreeMap<String, Vec<Row>>,
    pub headers: Vec<String>,
    pub drawdown_headers: Vec<String>,
    pub run_date: String,
}

impl From<&ScanResult> for ScanDocument {
    fn from(result: &ScanResult) -> Self {
        let mut option_tables = BTreeMap::new();
        for table in result.otm.iter() {
            option_tables.insert(format!("otm{}", table.rank), encode_table(table));
        }
        for table in result.itm.iter() {
            option_tables.insert(format!("itm{}", table.rank), encode_table(table));
        }

        ScanDocument {
            vix_status: result.vix_status.clone(),
            halt: result.halt,
            drawdown_table: result.drawdown.iter().map(encode_drawdown).collect(),
            option_tables,
            headers: OPTION_HEADERS.iter().map(|h| h.to_string()).collect(),
            drawdown_headers: DRAWDOWN_HEADERS.iter().map(|h| h.to_string()).collect(),
            run_date: result.run_date.clone(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{FailureReason, TickerFailure};

    #[test]
    fn test_encode_option_column_order() {
        let row = encode_option(&fixtures::option("TQQQ", 105.0, 2.5, 7.5, true));
        assert_eq!(row.len(), OPTION_HEADERS.len());
        assert_eq!(
            row,
            vec!["2026-10-17", "TQQQ", "100.00", "105.00", "2.50", "5.00%", "97.50", "2.50%", "7.50%", "Yes"]
        );
    }

    #[test]
    fn test_encode_failed_drawdown() {
        let outcome = DrawdownOutcome::Failed(TickerFailure {
            ticker: "LABU".to_string(),
            reason: FailureReason::NoData,
        });
        assert_eq!(encode_drawdown(&outcome), vec!["LABU", "-", "-", "-", "-", "Error"]);
    }

    #[test]
    fn test_encode_table_appends_separator_and_summary() {
        let result = fixtures::result(false);
        let rows = encode_table(&result.otm[0]);

        assert_eq!(rows.len(), 4);
        assert!(rows[2].iter().all(String::is_empty));
        assert_eq!(rows[3][0], SUMMARY_LABEL);
        assert_eq!(rows[3][1], "2.00%");
        assert_eq!(rows[3].len(), OPTION_HEADERS.len());

        assert!(encode_table(&result.otm[1]).is_empty());
    }

    #[test]
    fn test_document_keys() {
        let doc = ScanDocument::from(&fixtures::result(false));
        let json = serde_json::to_value(&doc).unwrap();

        for key in ["vixStatus", "halt", "drawdownTable", "otm1", "otm2", "otm3", "itm1", "itm2", "itm3", "headers", "runDate"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["drawdownTable"][1][5], "Fetch Failed");
        assert_eq!(json["headers"][9], "Works");
    }

    #[test]
    fn test_halt_document_is_empty() {
        let doc = ScanDocument::from(&fixtures::result(true));
        assert!(doc.halt);
        assert!(doc.drawdown_table.is_empty());
        assert!(doc.option_tables.values().all(Vec::is_empty));
    }
}
