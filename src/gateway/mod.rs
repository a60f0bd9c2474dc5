//! Quote gateway module
//!
//! The scanner only ever talks to market data through [`QuoteGateway`].
//! `TradierGateway` is the HTTP implementation used in production.

pub mod types;
pub mod tradier;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use types::*;

pub use tradier::TradierGateway;

/// Market data operations consumed by the scan pipeline
#[async_trait]
pub trait QuoteGateway: Send + Sync {
    /// Gateway ID (e.g., "tradier")
    fn id(&self) -> &'static str;

    /// Daily (or coarser) bars between `start` and `end`, inclusive, oldest first
    async fn get_history(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>>;

    /// Current quote for a symbol
    async fn get_quote(&self, symbol: &str) -> Result<Quote>;

    /// Listed option expirations for a symbol
    async fn get_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>>;

    /// Option chain (calls and puts) for one expiration
    async fn get_chain(&self, symbol: &str, expiration: NaiveDate) -> Result<Vec<OptionContract>>;
}

/// In-memory gateway serving frozen responses
#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::error::ScanError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Frozen responses keyed by symbol.
    ///
    /// History requests are answered by filtering the stored bars to the
    /// requested date range, so one series serves the drawdown and the
    /// momentum windows alike. Symbols listed in `failing` return a gateway
    /// error for every call.
    #[derive(Default)]
    pub struct StaticGateway {
        pub history: HashMap<String, Vec<Bar>>,
        pub quotes: HashMap<String, Option<f64>>,
        pub expirations: HashMap<String, Vec<NaiveDate>>,
        pub chains: HashMap<(String, NaiveDate), Vec<OptionContract>>,
        pub failing: Vec<String>,
        pub calls: AtomicUsize,
    }

    impl StaticGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_history(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
            self.history.insert(symbol.to_string(), bars);
            self
        }

        pub fn with_quote(mut self, symbol: &str, last: Option<f64>) -> Self {
            self.quotes.insert(symbol.to_string(), last);
            self
        }

        pub fn with_expirations(mut self, symbol: &str, dates: Vec<NaiveDate>) -> Self {
            self.expirations.insert(symbol.to_string(), dates);
            self
        }

        pub fn with_chain(mut self, symbol: &str, expiration: NaiveDate, chain: Vec<OptionContract>) -> Self {
            self.chains.insert((symbol.to_string(), expiration), chain);
            self
        }

        pub fn with_failure(mut self, symbol: &str) -> Self {
            self.failing.push(symbol.to_string());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check(&self, symbol: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|s| s == symbol) {
                return Err(ScanError::Gateway(format!("{} unavailable", symbol)));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl QuoteGateway for StaticGateway {
        fn id(&self) -> &'static str {
            "static"
        }

        async fn get_history(
            &self,
            symbol: &str,
            _interval: Interval,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<Bar>> {
            self.check(symbol)?;
            Ok(self
                .history
                .get(symbol)
                .map(|bars| {
                    bars.iter()
                        .filter(|b| b.date >= start && b.date <= end)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn get_quote(&self, symbol: &str) -> Result<Quote> {
            self.check(symbol)?;
            Ok(Quote {
                symbol: symbol.to_string(),
                last: self.quotes.get(symbol).copied().flatten(),
            })
        }

        async fn get_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
            self.check(symbol)?;
            Ok(self.expirations.get(symbol).cloned().unwrap_or_default())
        }

        async fn get_chain(&self, symbol: &str, expiration: NaiveDate) -> Result<Vec<OptionContract>> {
            self.check(symbol)?;
            Ok(self
                .chains
                .get(&(symbol.to_string(), expiration))
                .cloned()
                .unwrap_or_default())
        }
    }

    /// Consecutive daily bars ending at `end`, one per close, with high = close + `spread`
    pub fn daily_bars(end: NaiveDate, closes: &[f64], spread: f64) -> Vec<Bar> {
        let n = closes.len() as i64;
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: end - chrono::Duration::days(n - 1 - i as i64),
                close,
                high: close + spread,
            })
            .collect()
    }

    pub fn call(strike: f64, bid: f64, ask: f64, expiration: NaiveDate) -> OptionContract {
        OptionContract {
            symbol: format!("X{:08}C", (strike * 1000.0) as i64),
            strike,
            bid,
            ask,
            option_type: OptionType::Call,
            expiration_date: expiration,
        }
    }
}
