//! HTML rendering of a scan

use super::{encode_drawdown, encode_table, Row, DRAWDOWN_HEADERS, OPTION_HEADERS, SUMMARY_LABEL};
use crate::services::{ScanResult, VolatilityRegime};
use std::fmt::Write;

const STYLE: &str = "body{font-family:-apple-system,Segoe UI,Helvetica,Arial,sans-serif;margin:24px;color:#222}\
table{border-collapse:collapse;margin:8px 0 24px;font-size:13px}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:right}\
th{background:#f0f0f0}td:first-child,td:nth-child(2){text-align:left}\
tr.summary td{font-weight:bold;background:#fafafa}\
.banner{padding:8px 12px;border-radius:4px;margin-bottom:16px;font-weight:bold}\
.normal{background:#e6f4ea}.caution{background:#fff4e5}.halt{background:#fdecea}\
.empty{color:#888;font-style:italic}";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_table(out: &mut String, title: &str, headers: &[&str], rows: &[Row]) {
    let _ = write!(out, "<h2>{}</h2>", escape(title));

    if rows.is_empty() {
        out.push_str("<p class=\"empty\">No candidates</p>");
        return;
    }

    out.push_str("<table><thead><tr>");
    for header in headers {
        let _ = write!(out, "<th>{}</th>", escape(header));
    }
    out.push_str("</tr></thead><tbody>");

    for row in rows {
        let class = if row.first().map(String::as_str) == Some(SUMMARY_LABEL) {
            " class=\"summary\""
        } else {
            ""
        };
        let _ = write!(out, "<tr{}>", class);
        for cell in row {
            let _ = write!(out, "<td>{}</td>", escape(cell));
        }
        out.push_str("</tr>");
    }

    out.push_str("</tbody></table>");
}

/// Render a complete, self-contained HTML page
pub fn render_html(result: &ScanResult) -> String {
    let mut out = String::with_capacity(16 * 1024);

    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    out.push_str("<title>BW Covered Call Scan</title>");
    let _ = write!(out, "<style>{}</style></head><body>", STYLE);
    out.push_str("<h1>BW Covered Call Scan</h1>");
    let _ = write!(out, "<p>Run date: {}</p>", escape(&result.run_date));

    let banner = match result.regime() {
        VolatilityRegime::Halt => "halt",
        VolatilityRegime::Caution => "caution",
        VolatilityRegime::Normal => "normal",
    };
    let _ = write!(
        out,
        "<div class=\"banner {}\">{}</div>",
        banner,
        escape(&result.vix_status)
    );

    if !result.halt {
        let drawdown: Vec<Row> = result.drawdown.iter().map(encode_drawdown).collect();
        render_table(&mut out, "12-Week Drawdown", &DRAWDOWN_HEADERS, &drawdown);

        for table in result.otm.iter().chain(result.itm.iter()) {
            render_table(&mut out, &table.title(), &OPTION_HEADERS, &encode_table(table));
        }
    }

    out.push_str("</body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_render_full_scan() {
        let html = render_html(&fixtures::result(false));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("banner normal"));
        assert!(html.contains("<h2>12-Week Drawdown</h2>"));
        assert!(html.contains("<h2>OTM #1</h2>"));
        assert!(html.contains("<h2>ITM #3</h2>"));
        assert!(html.contains("<tr class=\"summary\"><td>Average Return</td><td>2.00%</td>"));
        assert!(html.contains("&lt;SOXL&gt;"));
        assert!(!html.contains("<SOXL>"));
        assert!(html.contains("Fetch Failed"));
    }

    #[test]
    fn test_render_halt_shows_only_banner() {
        let html = render_html(&fixtures::result(true));
        assert!(html.contains("banner halt"));
        assert!(!html.contains("<table>"));
        assert!(!html.contains("OTM #1"));
    }
}
