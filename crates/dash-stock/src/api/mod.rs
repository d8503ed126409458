//! Market-data provider abstraction and its bindings
//!
//! [`MarketDataProvider`] is the only seam between the summarizer and the
//! outside world. Two bindings ship with the crate:
//!
//! - [`YahooFinanceClient`]: library-style client returning ready-made quotes
//! - [`ChartGatewayClient`]: HTTP client for the nested chart envelope
//!
//! Both are interchangeable behind `Arc<dyn MarketDataProvider>`.

pub mod gateway;
pub mod yahoo;

pub use gateway::ChartGatewayClient;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::config::{DataProvider, StockConfig};
use crate::error::{Result, StockError};
use crate::models::{Period, PriceBar};

static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-^=$/]{0,19}$").expect("symbol pattern is valid")
});

/// Source of quotes and daily history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest or near-real-time price for `ticker`
    async fn get_quote(&self, ticker: &str) -> Result<f64>;

    /// Daily bars over `period`, oldest first
    async fn get_history(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "provider"
    }
}

/// Reject empty or obviously malformed symbols before hitting the network
pub fn validate_symbol(ticker: &str) -> Result<&str> {
    let trimmed = ticker.trim();
    if trimmed.is_empty() || trimmed.len() != ticker.len() || !SYMBOL_RE.is_match(trimmed) {
        return Err(StockError::InvalidSymbol(ticker.to_string()));
    }
    Ok(trimmed)
}

/// Build the provider selected by `config`
pub fn provider_from_config(config: &StockConfig) -> Result<Arc<dyn MarketDataProvider>> {
    Ok(match config.provider {
        DataProvider::Yahoo => Arc::new(YahooFinanceClient::new()),
        DataProvider::Gateway => Arc::new(ChartGatewayClient::from_config(config)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_symbol() {
        assert_eq!(validate_symbol("AAPL").unwrap(), "AAPL");
        assert!(validate_symbol("BRK.B").is_ok());
        assert!(validate_symbol("^GSPC").is_err());
        assert!(validate_symbol("ABR$D").is_ok());
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol(" AAPL").is_err());
        assert!(validate_symbol("AA PL").is_err());
    }

    #[test]
    fn test_provider_from_config() {
        let yahoo = provider_from_config(&StockConfig::default()).unwrap();
        assert_eq!(yahoo.name(), "yahoo");

        let config = StockConfig::builder()
            .provider(DataProvider::Gateway)
            .build()
            .unwrap();
        let gateway = provider_from_config(&config).unwrap();
        assert_eq!(gateway.name(), "gateway");
    }
}
