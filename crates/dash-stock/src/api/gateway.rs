//! Chart gateway client
//!
//! Speaks the nested chart envelope returned by Yahoo-style chart endpoints:
//!
//! ```json
//! {"chart": {"result": [{"meta": {...}, "timestamp": [...],
//!   "indicators": {"quote": [{"open": [...], "high": [...], "low": [...],
//!   "close": [...], "volume": [...]}]}}], "error": null}}
//! ```

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;

use super::{MarketDataProvider, validate_symbol};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::{Period, PriceBar, bar};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const USER_AGENT: &str = concat!("stock-dashboard/", env!("CARGO_PKG_VERSION"));

/// HTTP client for chart-envelope endpoints
#[derive(Debug, Clone)]
pub struct ChartGatewayClient {
    client: Client,
    base_url: String,
    region: String,
    rate_limiter: SharedRateLimiter,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

/// One entry of `chart.result`
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteSeries>,
}

/// Column-oriented OHLCV arrays; Yahoo emits `null` for missing cells
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSeries {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// Convert the column arrays into bars
    ///
    /// Rows without a close are dropped; other missing prices fall back to the
    /// close and a missing volume counts as zero.
    pub fn bars(&self) -> Vec<PriceBar> {
        fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
            column.get(i).copied().flatten()
        }

        let Some(series) = self.indicators.quote.first() else {
            return Vec::new();
        };

        let bars = self
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let close = cell(&series.close, i).filter(|c| c.is_finite())?;
                let open = cell(&series.open, i).unwrap_or(close);
                let high = cell(&series.high, i).unwrap_or(close);
                let low = cell(&series.low, i).unwrap_or(close);
                let volume = cell(&series.volume, i).map_or(0, |v| v.max(0.0) as u64);
                PriceBar::from_timestamp(ts, open, high, low, close, volume)
            })
            .collect();

        bar::normalize(bars)
    }

    /// First available price among the meta fallbacks, then the last close
    pub fn quote(&self) -> Option<f64> {
        self.meta
            .regular_market_price
            .or(self.meta.previous_close)
            .or(self.meta.chart_previous_close)
            .or_else(|| self.bars().last().map(|b| b.close))
    }
}

/// Parse a chart response body for `symbol`
pub fn parse_chart(symbol: &str, body: &str) -> Result<ChartResult> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| StockError::MalformedResponse {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

    if let Some(err) = envelope.chart.error {
        let code = err.code.unwrap_or_else(|| "Error".to_string());
        let description = err.description.unwrap_or_default();
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("{code}: {description}"),
        });
    }

    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| StockError::MalformedResponse {
            symbol: symbol.to_string(),
            reason: "chart.result is empty".to_string(),
        })
}

impl ChartGatewayClient {
    /// Create a gateway client
    ///
    /// # Arguments
    /// * `base_url` - endpoint template; `{symbol}` is replaced, otherwise the symbol is appended
    /// * `region` - region query parameter
    /// * `rate_limit` - maximum requests per minute
    pub fn new(client: Client, base_url: impl Into<String>, region: impl Into<String>, rate_limit: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        Self {
            client,
            base_url: base_url.into(),
            region: region.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Build from the dashboard configuration
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::new(
            client,
            config.gateway_base_url.clone(),
            config.gateway_region.clone(),
            config.gateway_rate_limit,
        ))
    }

    fn chart_url(&self, symbol: &str) -> String {
        if self.base_url.contains("{symbol}") {
            self.base_url.replace("{symbol}", symbol)
        } else {
            format!("{}/{symbol}", self.base_url.trim_end_matches('/'))
        }
    }

    /// Fetch one chart for `symbol` over `range`
    pub async fn fetch_chart(&self, symbol: &str, range: &str, adjusted: bool) -> Result<ChartResult> {
        let symbol = validate_symbol(symbol)?;

        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let adjusted = if adjusted { "true" } else { "false" };
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[
                ("symbol", symbol),
                ("region", self.region.as_str()),
                ("interval", "1d"),
                ("range", range),
                ("includeAdjustedClose", adjusted),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StockError::RateLimitExceeded {
                provider: "chart gateway".to_string(),
            });
        }

        let body = response.text().await?;
        match parse_chart(symbol, &body) {
            Ok(result) if status.is_success() => Ok(result),
            Ok(_) => Err(StockError::ApiError(format!("HTTP error: {status}"))),
            // error envelopes also arrive with 4xx codes
            Err(e @ StockError::DataUnavailable { .. }) => Err(e),
            Err(_) if !status.is_success() => Err(StockError::ApiError(format!("HTTP error: {status}"))),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl MarketDataProvider for ChartGatewayClient {
    async fn get_quote(&self, ticker: &str) -> Result<f64> {
        let chart = self.fetch_chart(ticker, Period::OneDay.as_str(), false).await?;
        chart.quote().ok_or_else(|| StockError::DataUnavailable {
            symbol: ticker.to_string(),
            reason: "no price in chart meta".to_string(),
        })
    }

    async fn get_history(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>> {
        let chart = self.fetch_chart(ticker, period.as_str(), true).await?;
        Ok(chart.bars())
    }

    fn name(&self) -> &'static str {
        "gateway"
    }
}
