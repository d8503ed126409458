//! Configuration management utilities

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Error raised when an environment variable is present but unusable
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {name}: {value:?} ({reason})")]
pub struct EnvError {
    pub name: String,
    pub value: String,
    pub reason: String,
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "stock-dashboard".to_string(),
            environment: "development".to_string(),
            log_filter: "warn,dash_stock=info,dash_cli=info".to_string(),
        }
    }
}

impl Config {
    /// Build the configuration from `DASH_ENV` and `DASH_LOG`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_name: defaults.app_name,
            environment: env_var("DASH_ENV").unwrap_or(defaults.environment),
            log_filter: env_var("DASH_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

/// Read a non-empty, trimmed environment variable
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset or blank.
pub fn env_parse<T>(name: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|e| EnvError {
            name: name.to_string(),
            reason: e.to_string(),
            value,
        }),
    }
}
