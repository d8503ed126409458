//! Yahoo Finance library client

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::{MarketDataProvider, validate_symbol};
use crate::error::{Result, StockError};
use crate::models::{Period, PriceBar, bar};

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    fn connector() -> Result<yahoo::YahooConnector> {
        yahoo::YahooConnector::new().map_err(|e| StockError::YahooFinanceError(e.to_string()))
    }

    /// Get the latest close for a symbol
    pub async fn get_latest_price(&self, symbol: &str) -> Result<f64> {
        let symbol = validate_symbol(symbol)?;
        let response = Self::connector()?
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quote = response
            .last_quote()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(quote.close)
    }

    /// Get daily bars between two instants
    pub async fn get_historical_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PriceBar>> {
        let symbol = validate_symbol(symbol)?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = Self::connector()?
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let bars = quotes
            .iter()
            .filter_map(|q| {
                PriceBar::from_timestamp(q.timestamp as i64, q.open, q.high, q.low, q.close, q.volume)
            })
            .collect();

        Ok(bar::normalize(bars))
    }

    /// Get daily bars for a relative window ending now
    pub async fn get_historical_range(&self, symbol: &str, period: Period) -> Result<Vec<PriceBar>> {
        let end = Utc::now();
        self.get_historical_bars(symbol, period.start_before(end), end).await
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn get_quote(&self, ticker: &str) -> Result<f64> {
        self.get_latest_price(ticker).await
    }

    async fn get_history(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>> {
        self.get_historical_range(ticker, period).await
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
