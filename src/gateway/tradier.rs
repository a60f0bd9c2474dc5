//! Tradier market data adapter

use crate::config::GatewayConfig;
use crate::error::{Result, ScanError};
use crate::gateway::types::*;
use crate::gateway::QuoteGateway;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Tradier brokerage market data implementation
pub struct TradierGateway {
    client: Client,
    base_url: String,
    token: String,
}

impl TradierGateway {
    pub fn new(base_url: &str, token: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Build a gateway from configuration, reading the bearer token from the environment
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ScanError::MissingCredential(config.token_env.clone()))?;

        Self::new(&config.base_url, &token, config.timeout_secs)
    }

    fn get_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        if let Ok(value) = format!("Bearer {}", self.token).parse() {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        headers
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        debug!("GET {}{} {:?}", self.base_url, path, params);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .headers(self.get_headers())
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ScanError::Gateway(format!(
                "{} returned {}: {}",
                path,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl QuoteGateway for TradierGateway {
    fn id(&self) -> &'static str {
        "tradier"
    }

    async fn get_history(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>> {
        let params = [
            ("symbol", symbol.to_string()),
            ("interval", interval.as_str().to_string()),
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
        ];
        let response: HistoryResponse = self.get_json("/v1/markets/history", &params).await?;
        Ok(response.into_bars())
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote> {
        let params = [("symbols", symbol.to_string()), ("greeks", "false".to_string())];
        let response: QuotesResponse = self.get_json("/v1/markets/quotes", &params).await?;
        response
            .into_quote(symbol)
            .ok_or_else(|| ScanError::NoData(format!("quote for {}", symbol)))
    }

    async fn get_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        let params = [
            ("symbol", symbol.to_string()),
            ("includeAllRoots", "true".to_string()),
        ];
        let response: ExpirationsResponse =
            self.get_json("/v1/markets/options/expirations", &params).await?;
        Ok(response.into_dates())
    }

    async fn get_chain(&self, symbol: &str, expiration: NaiveDate) -> Result<Vec<OptionContract>> {
        let params = [
            ("symbol", symbol.to_string()),
            ("expiration", expiration.format("%Y-%m-%d").to_string()),
            ("greeks", "false".to_string()),
        ];
        let response: ChainResponse = self.get_json("/v1/markets/options/chains", &params).await?;
        Ok(response.into_contracts())
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Tradier returns a bare object instead of a one-element array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![t],
        }
    }
}

fn flatten<T>(value: Option<OneOrMany<T>>) -> Vec<T> {
    value.map(OneOrMany::into_vec).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    history: Option<HistoryBody>,
}

#[derive(Debug, Deserialize)]
struct HistoryBody {
    day: Option<OneOrMany<HistoryDay>>,
}

#[derive(Debug, Deserialize)]
struct HistoryDay {
    date: NaiveDate,
    high: f64,
    close: f64,
}

impl HistoryResponse {
    fn into_bars(self) -> Vec<Bar> {
        let mut bars: Vec<Bar> = flatten(self.history.and_then(|h| h.day))
            .into_iter()
            .map(|d| Bar {
                date: d.date,
                close: d.close,
                high: d.high,
            })
            .collect();
        bars.sort_by_key(|b| b.date);
        bars
    }
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    quotes: Option<QuotesBody>,
}

#[derive(Debug, Deserialize)]
struct QuotesBody {
    quote: Option<OneOrMany<QuoteData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    symbol: String,
    last: Option<f64>,
}

impl QuotesResponse {
    fn into_quote(self, symbol: &str) -> Option<Quote> {
        flatten(self.quotes.and_then(|q| q.quote))
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
            .map(|q| Quote {
                symbol: q.symbol,
                last: q.last,
            })
    }
}

#[derive(Debug, Deserialize)]
struct ExpirationsResponse {
    expirations: Option<ExpirationsBody>,
}

#[derive(Debug, Deserialize)]
struct ExpirationsBody {
    date: Option<OneOrMany<NaiveDate>>,
}

impl ExpirationsResponse {
    fn into_dates(self) -> Vec<NaiveDate> {
        let mut dates = flatten(self.expirations.and_then(|e| e.date));
        dates.sort();
        dates
    }
}

#[derive(Debug, Deserialize)]
struct ChainResponse {
    options: Option<ChainBody>,
}

#[derive(Debug, Deserialize)]
struct ChainBody {
    option: Option<OneOrMany<ChainOption>>,
}

#[derive(Debug, Deserialize)]
struct ChainOption {
    symbol: String,
    strike: f64,
    bid: Option<f64>,
    ask: Option<f64>,
    option_type: OptionType,
    expiration_date: NaiveDate,
}

impl ChainResponse {
    fn into_contracts(self) -> Vec<OptionContract> {
        flatten(self.options.and_then(|o| o.option))
            .into_iter()
            .map(|o| OptionContract {
                symbol: o.symbol,
                strike: o.strike,
                bid: o.bid.unwrap_or(0.0),
                ask: o.ask.unwrap_or(0.0),
                option_type: o.option_type,
                expiration_date: o.expiration_date,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_history_array_and_single() {
        let body = r#"{"history":{"day":[
            {"date":"2026-10-15","open":10.0,"high":11.0,"low":9.5,"close":10.5,"volume":100},
            {"date":"2026-10-14","open":9.0,"high":10.2,"low":8.9,"close":10.0,"volume":120}
        ]}}"#;
        let bars = serde_json::from_str::<HistoryResponse>(body).unwrap().into_bars();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, date("2026-10-14"));
        assert_eq!(bars[1].high, 11.0);

        let body = r#"{"history":{"day":{"date":"2026-10-15","open":10.0,"high":11.0,"low":9.5,"close":10.5,"volume":100}}}"#;
        let bars = serde_json::from_str::<HistoryResponse>(body).unwrap().into_bars();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 10.5);
    }

    #[test]
    fn test_history_null() {
        let bars = serde_json::from_str::<HistoryResponse>(r#"{"history":null}"#)
            .unwrap()
            .into_bars();
        assert!(bars.is_empty());
    }

    #[test]
    fn test_quote_with_null_last() {
        let body = r#"{"quotes":{"quote":{"symbol":"TQQQ","last":null,"bid":71.2,"ask":71.3}}}"#;
        let quote = serde_json::from_str::<QuotesResponse>(body)
            .unwrap()
            .into_quote("TQQQ")
            .unwrap();
        assert_eq!(quote.last, None);

        let body = r#"{"quotes":{"unmatched_symbols":{"symbol":"ZZZZ"}}}"#;
        assert!(serde_json::from_str::<QuotesResponse>(body)
            .unwrap()
            .into_quote("ZZZZ")
            .is_none());
    }

    #[test]
    fn test_expirations_sorted() {
        let body = r#"{"expirations":{"date":["2026-10-23","2026-10-16","2026-10-30"]}}"#;
        let dates = serde_json::from_str::<ExpirationsResponse>(body)
            .unwrap()
            .into_dates();
        assert_eq!(dates, vec![date("2026-10-16"), date("2026-10-23"), date("2026-10-30")]);

        let dates = serde_json::from_str::<ExpirationsResponse>(r#"{"expirations":null}"#)
            .unwrap()
            .into_dates();
        assert!(dates.is_empty());
    }

    #[test]
    fn test_chain_missing_quotes_default_to_zero() {
        let body = r#"{"options":{"option":[
            {"symbol":"TQQQ261016C00072000","strike":72.0,"bid":null,"ask":null,"option_type":"call","expiration_date":"2026-10-16"},
            {"symbol":"TQQQ261016P00072000","strike":72.0,"bid":1.1,"ask":1.2,"option_type":"put","expiration_date":"2026-10-16"}
        ]}}"#;
        let chain = serde_json::from_str::<ChainResponse>(body)
            .unwrap()
            .into_contracts();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].bid, 0.0);
        assert_eq!(chain[0].option_type, OptionType::Call);
        assert_eq!(chain[1].option_type, OptionType::Put);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let config = GatewayConfig {
            token_env: "BW_SCANNER_TEST_TOKEN_UNSET".to_string(),
            ..GatewayConfig::default()
        };
        let result = TradierGateway::from_config(&config);
        assert!(matches!(result, Err(ScanError::MissingCredential(_))));
    }
}
