//! Static ticker → sector/industry lookup
//!
//! The database is a JSON object keyed by ticker symbol:
//!
//! ```json
//! { "AAPL": { "sector": "Technology", "industry": "Consumer Electronics" } }
//! ```
//!
//! It is loaded once at startup and never mutated. Tickers that are not in the
//! file resolve to [`SectorEntry::unknown`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::{Result, StockError};

/// Label used for tickers without sector data
pub const UNKNOWN: &str = "Unknown";

/// Sector and industry classification for one ticker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorEntry {
    pub sector: String,
    pub industry: String,
}

impl SectorEntry {
    pub fn new(sector: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            industry: industry.into(),
        }
    }

    /// The `{"Unknown", "Unknown"}` default
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }

    pub fn is_unknown(&self) -> bool {
        self.sector == UNKNOWN
    }
}

/// Immutable sector mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectorDatabase {
    entries: HashMap<String, SectorEntry>,
}

impl SectorDatabase {
    /// Load the database, degrading to an empty mapping on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(db) => {
                tracing::info!(path = %path.display(), tickers = db.len(), "Loaded sector database");
                db
            }
            Err(e) => {
                tracing::warn!("{e}; all tickers will resolve to {UNKNOWN}");
                Self::default()
            }
        }
    }

    /// Load the database, surfacing read and parse failures
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StockError::SectorDatabase {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| StockError::SectorDatabase {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a database from its JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let entries: HashMap<String, SectorEntry> = serde_json::from_str(content)?;
        Ok(Self { entries })
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, SectorEntry)>,
        K: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Sector entry for `ticker`, or the Unknown default
    pub fn lookup(&self, ticker: &str) -> SectorEntry {
        self.get(ticker).cloned().unwrap_or_else(SectorEntry::unknown)
    }

    pub fn get(&self, ticker: &str) -> Option<&SectorEntry> {
        self.entries.get(ticker)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.entries.contains_key(ticker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct known sector names, sorted
    pub fn sectors(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|e| e.sector.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
