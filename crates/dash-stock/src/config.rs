//! Configuration for the stock dashboard core

use crate::error::{Result, StockError};
use crate::indicators::ShortWindowPolicy;
use crate::models::Period;
use dash_utils::{env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the sector database
pub const DEFAULT_SECTOR_DB: &str = "sector_database.json";

/// Default chart endpoint for the gateway provider; `{symbol}` is substituted
pub const DEFAULT_GATEWAY_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}";

/// Market-data binding used by the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataProvider {
    /// Yahoo Finance through the `yahoo_finance_api` client (default)
    #[default]
    Yahoo,
    /// Chart endpoint returning the nested `chart.result` envelope
    Gateway,
}

impl std::str::FromStr for DataProvider {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" | "library" => Ok(Self::Yahoo),
            "gateway" | "chart" => Ok(Self::Gateway),
            other => Err(StockError::ConfigError(format!("unknown provider: {other}"))),
        }
    }
}

/// Configuration for loading and summarizing stocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockConfig {
    /// Market-data binding
    pub provider: DataProvider,

    /// Path of the sector database JSON file
    pub sector_db_path: PathBuf,

    /// History window fetched per summary
    pub history_period: Period,

    /// Pause after every ticker in a batch
    pub request_delay: Duration,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Chart endpoint template for the gateway provider
    pub gateway_base_url: String,

    /// Region parameter sent to the gateway
    pub gateway_region: String,

    /// Maximum gateway requests per minute
    pub gateway_rate_limit: u32,

    /// Moving-average behaviour for short histories
    pub short_window_policy: ShortWindowPolicy,

    /// TTL of the optional summary cache; `None` disables caching
    pub cache_ttl: Option<Duration>,

    /// TTL for downloaded ticker directories
    pub universe_ttl: Duration,

    /// Worker bound for concurrent batch loading
    pub max_concurrency: usize,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            provider: DataProvider::Yahoo,
            sector_db_path: PathBuf::from(DEFAULT_SECTOR_DB),
            history_period: Period::TwoMonths,
            request_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
            gateway_base_url: DEFAULT_GATEWAY_URL.to_string(),
            gateway_region: "US".to_string(),
            gateway_rate_limit: 120,
            short_window_policy: ShortWindowPolicy::LatestClose,
            cache_ttl: None,
            universe_ttl: Duration::from_secs(24 * 3600), // 1 day
            max_concurrency: 4,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sector_db_path.as_os_str().is_empty() {
            return Err(StockError::ConfigError(
                "sector_db_path must not be empty".to_string(),
            ));
        }

        if self.provider == DataProvider::Gateway {
            let probe = self.gateway_base_url.replace("{symbol}", "AAPL");
            url::Url::parse(&probe).map_err(|e| {
                StockError::ConfigError(format!("invalid gateway url {}: {e}", self.gateway_base_url))
            })?;
        }

        if self.gateway_rate_limit == 0 {
            return Err(StockError::ConfigError(
                "gateway_rate_limit must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(StockError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    provider: Option<DataProvider>,
    sector_db_path: Option<PathBuf>,
    history_period: Option<Period>,
    request_delay: Option<Duration>,
    request_timeout: Option<Duration>,
    gateway_base_url: Option<String>,
    gateway_region: Option<String>,
    gateway_rate_limit: Option<u32>,
    short_window_policy: Option<ShortWindowPolicy>,
    cache_ttl: Option<Duration>,
    universe_ttl: Option<Duration>,
    max_concurrency: Option<usize>,
}

impl StockConfigBuilder {
    /// Set the market-data provider
    pub fn provider(mut self, provider: DataProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the sector database path
    pub fn sector_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sector_db_path = Some(path.into());
        self
    }

    /// Set the history window used for summaries
    pub fn history_period(mut self, period: Period) -> Self {
        self.history_period = Some(period);
        self
    }

    /// Set the pause inserted after every batch ticker
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = Some(delay);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn gateway_base_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_base_url = Some(url.into());
        self
    }

    pub fn gateway_region(mut self, region: impl Into<String>) -> Self {
        self.gateway_region = Some(region.into());
        self
    }

    pub fn gateway_rate_limit(mut self, per_minute: u32) -> Self {
        self.gateway_rate_limit = Some(per_minute);
        self
    }

    pub fn short_window_policy(mut self, policy: ShortWindowPolicy) -> Self {
        self.short_window_policy = Some(policy);
        self
    }

    /// Enable the summary cache with the given TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn universe_ttl(mut self, ttl: Duration) -> Self {
        self.universe_ttl = Some(ttl);
        self
    }

    pub fn max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = Some(workers);
        self
    }

    /// Load unset values from `DASH_*` environment variables
    pub fn with_env(mut self) -> Result<Self> {
        if self.sector_db_path.is_none() {
            self.sector_db_path = env_var("DASH_SECTOR_DB").map(PathBuf::from);
        }
        if self.provider.is_none() {
            self.provider = env_var("DASH_PROVIDER").map(|v| v.parse()).transpose()?;
        }
        if self.gateway_base_url.is_none() {
            self.gateway_base_url = env_var("DASH_GATEWAY_URL");
        }
        if self.request_delay.is_none() {
            self.request_delay = env_parse::<u64>("DASH_REQUEST_DELAY_MS")?.map(Duration::from_millis);
        }
        if self.history_period.is_none() {
            self.history_period = env_var("DASH_HISTORY_PERIOD").map(|v| v.parse()).transpose()?;
        }
        if self.short_window_policy.is_none() {
            self.short_window_policy = env_var("DASH_MA_POLICY").map(|v| v.parse()).transpose()?;
        }
        if self.cache_ttl.is_none() {
            self.cache_ttl = env_parse::<u64>("DASH_CACHE_TTL_SECS")?.map(Duration::from_secs);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            provider: self.provider.unwrap_or(defaults.provider),
            sector_db_path: self.sector_db_path.unwrap_or(defaults.sector_db_path),
            history_period: self.history_period.unwrap_or(defaults.history_period),
            request_delay: self.request_delay.unwrap_or(defaults.request_delay),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            gateway_base_url: self.gateway_base_url.unwrap_or(defaults.gateway_base_url),
            gateway_region: self.gateway_region.unwrap_or(defaults.gateway_region),
            gateway_rate_limit: self.gateway_rate_limit.unwrap_or(defaults.gateway_rate_limit),
            short_window_policy: self.short_window_policy.unwrap_or(defaults.short_window_policy),
            cache_ttl: self.cache_ttl.or(defaults.cache_ttl),
            universe_ttl: self.universe_ttl.unwrap_or(defaults.universe_ttl),
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.provider, DataProvider::Yahoo);
        assert_eq!(config.history_period, Period::TwoMonths);
        assert_eq!(config.request_delay, Duration::from_millis(100));
        assert_eq!(config.sector_db_path, PathBuf::from("sector_database.json"));
        assert!(config.cache_ttl.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .provider(DataProvider::Gateway)
            .request_delay(Duration::from_millis(500))
            .history_period(Period::OneYear)
            .cache_ttl(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.provider, DataProvider::Gateway);
        assert_eq!(config.request_delay, Duration::from_millis(500));
        assert_eq!(config.history_period, Period::OneYear);
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_validation_bad_gateway_url() {
        let config = StockConfig {
            provider: DataProvider::Gateway,
            gateway_base_url: "not a url/{symbol}".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_limits() {
        let config = StockConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(StockConfig::builder().gateway_rate_limit(0).build().is_err());
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gateway".parse::<DataProvider>().unwrap(), DataProvider::Gateway);
        assert_eq!("yahoo".parse::<DataProvider>().unwrap(), DataProvider::Yahoo);
        assert!("bloomberg".parse::<DataProvider>().is_err());
    }
}
