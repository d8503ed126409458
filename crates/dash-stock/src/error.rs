//! Error types for stock dashboard operations

use std::path::PathBuf;
use thiserror::Error;

/// Stock dashboard specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Unrecognised history window
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Malformed provider payload
    #[error("Malformed response for {symbol}: {reason}")]
    MalformedResponse {
        symbol: String,
        reason: String,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Sector database could not be read or parsed
    #[error("Sector database {}: {reason}", path.display())]
    SectorDatabase {
        path: PathBuf,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Shorthand for an empty-history outcome
    pub fn no_data(symbol: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: "No historical data available".to_string(),
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<dash_utils::EnvError> for StockError {
    fn from(err: dash_utils::EnvError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}
