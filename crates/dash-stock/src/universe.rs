//! Exchange-listed ticker universe
//!
//! Downloads the Nasdaq Trader symbol directories, attaches sector data and
//! applies the dashboard filters (exchange, first letter, sector).

use cached::{Cached, TimedCache};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::sector::{SectorDatabase, UNKNOWN};

const NASDAQ_LISTED_URL: &str = "https://www.nasdaqtrader.com/dynamic/symdir/nasdaqlisted.txt";
const OTHER_LISTED_URL: &str = "https://www.nasdaqtrader.com/dynamic/symdir/otherlisted.txt";
const FOOTER_PREFIX: &str = "File Creation Time";

/// Listing venue, as grouped by the symbol directories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Exchange {
    /// `nasdaqlisted.txt`
    Nasdaq,
    /// `otherlisted.txt` (NYSE, NYSE American, NYSE Arca and others)
    Nyse,
}

impl Exchange {
    pub fn all() -> [Exchange; 2] {
        [Exchange::Nasdaq, Exchange::Nyse]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Exchange::Nasdaq => "NASDAQ",
            Exchange::Nyse => "NYSE",
        }
    }

    /// Symbol directory for this venue
    pub fn directory_url(&self) -> &'static str {
        match self {
            Exchange::Nasdaq => NASDAQ_LISTED_URL,
            Exchange::Nyse => OTHER_LISTED_URL,
        }
    }

    /// Zero-based (test issue, ETF) column positions in the directory
    fn flag_columns(&self) -> (usize, usize) {
        match self {
            Exchange::Nasdaq => (3, 6),
            Exchange::Nyse => (6, 4),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Exchange {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "NASDAQ" => Ok(Exchange::Nasdaq),
            "NYSE" | "OTHER" => Ok(Exchange::Nyse),
            other => Err(StockError::ConfigError(format!("unknown exchange: {other}"))),
        }
    }
}

/// One row of the ticker universe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedTicker {
    pub ticker: String,
    pub company: String,
    pub exchange: Exchange,
    pub etf: bool,
    pub sector: String,
    pub industry: String,
}

/// Parse a pipe-delimited symbol directory
///
/// The header row, blank lines, the creation-time footer and test issues are
/// skipped. Sector fields start out as Unknown; see [`TickerUniverse::enrich`].
pub fn parse_listing(text: &str, exchange: Exchange) -> Vec<ListedTicker> {
    let (test_col, etf_col) = exchange.flag_columns();

    text.lines()
        .skip(1)
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with(FOOTER_PREFIX))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() < 2 || parts[0].trim().is_empty() {
                return None;
            }
            let flag = |col: usize| parts.get(col).is_some_and(|v| v.trim() == "Y");
            if flag(test_col) {
                return None;
            }
            Some(ListedTicker {
                ticker: parts[0].trim().to_string(),
                company: parts[1].trim().to_string(),
                exchange,
                etf: flag(etf_col),
                sector: UNKNOWN.to_string(),
                industry: UNKNOWN.to_string(),
            })
        })
        .collect()
}

/// Dashboard filters; an empty list means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseFilter {
    pub exchanges: Vec<Exchange>,
    pub letters: Vec<char>,
    pub sectors: Vec<String>,
}

impl UniverseFilter {
    /// Match every listed ticker
    pub fn all() -> Self {
        Self::default()
    }

    pub fn exchanges(mut self, exchanges: impl IntoIterator<Item = Exchange>) -> Self {
        self.exchanges = exchanges.into_iter().collect();
        self
    }

    pub fn letters(mut self, letters: impl IntoIterator<Item = char>) -> Self {
        self.letters = letters.into_iter().map(|c| c.to_ascii_uppercase()).collect();
        self
    }

    pub fn sectors<S: Into<String>>(mut self, sectors: impl IntoIterator<Item = S>) -> Self {
        self.sectors = sectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn matches(&self, listed: &ListedTicker) -> bool {
        let exchange_ok = self.exchanges.is_empty() || self.exchanges.contains(&listed.exchange);
        let letter_ok = self.letters.is_empty()
            || listed
                .ticker
                .chars()
                .next()
                .is_some_and(|c| self.letters.contains(&c.to_ascii_uppercase()));
        let sector_ok = self.sectors.is_empty()
            || self.sectors.iter().any(|s| s.eq_ignore_ascii_case(&listed.sector));
        exchange_ok && letter_ok && sector_ok
    }
}

/// Every listed ticker known to the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerUniverse {
    tickers: Vec<ListedTicker>,
}

impl TickerUniverse {
    pub fn new(tickers: Vec<ListedTicker>) -> Self {
        Self { tickers }
    }

    /// Attach sector and industry from the lookup
    pub fn enrich(&mut self, sectors: &SectorDatabase) {
        for listed in &mut self.tickers {
            let entry = sectors.lookup(&listed.ticker);
            listed.sector = entry.sector;
            listed.industry = entry.industry;
        }
    }

    pub fn tickers(&self) -> &[ListedTicker] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn filter<'a>(&'a self, filter: &'a UniverseFilter) -> impl Iterator<Item = &'a ListedTicker> + 'a {
        self.tickers.iter().filter(move |t| filter.matches(t))
    }

    /// The first `max` matching symbols, in directory order
    pub fn select(&self, filter: &UniverseFilter, max: usize) -> Vec<String> {
        self.filter(filter).take(max).map(|t| t.ticker.clone()).collect()
    }

    /// Distinct sectors present, excluding Unknown
    pub fn sectors(&self) -> Vec<String> {
        self.tickers
            .iter()
            .filter(|t| t.sector != UNKNOWN)
            .map(|t| t.sector.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Downloads and caches symbol directories
#[derive(Clone)]
pub struct UniverseClient {
    client: Client,
    cache: Arc<RwLock<TimedCache<Exchange, Vec<ListedTicker>>>>,
}

impl UniverseClient {
    pub fn new(client: Client, ttl: Duration) -> Self {
        Self {
            client,
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::new(client, config.universe_ttl))
    }

    /// Download one directory, served from cache while fresh
    pub async fn fetch_exchange(&self, exchange: Exchange) -> Result<Vec<ListedTicker>> {
        if let Some(hit) = self.cache.write().await.cache_get(&exchange).cloned() {
            tracing::debug!(%exchange, "Ticker directory cache hit");
            return Ok(hit);
        }

        let response = self.client.get(exchange.directory_url()).send().await?;
        if !response.status().is_success() {
            return Err(StockError::ApiError(format!(
                "{exchange} directory: HTTP {}",
                response.status()
            )));
        }
        let text = response.text().await?;
        let listed = parse_listing(&text, exchange);
        tracing::info!(%exchange, tickers = listed.len(), "Loaded ticker directory");

        let _ = self.cache.write().await.cache_set(exchange, listed.clone());
        Ok(listed)
    }

    /// Download the given directories; failing ones are logged and skipped
    pub async fn fetch(&self, exchanges: &[Exchange]) -> TickerUniverse {
        let mut tickers = Vec::new();
        for &exchange in exchanges {
            match self.fetch_exchange(exchange).await {
                Ok(listed) => tickers.extend(listed),
                Err(e) => tracing::error!(%exchange, "Error loading tickers: {e}"),
            }
        }
        TickerUniverse::new(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sector::SectorEntry;

    const NASDAQ: &str = "Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares\r\n\
AAPL|Apple Inc. - Common Stock|Q|N|N|100|N|N\r\n\
ADBE|Adobe Inc. - Common Stock|Q|N|N|100|N|N\r\n\
QQQ|Invesco QQQ Trust, Series 1|G|N|N|100|Y|N\r\n\
ZVZZT|NASDAQ TEST STOCK|G|Y|N|100|N|N\r\n\
MSFT|Microsoft Corporation - Common Stock|Q|N|N|100|N|N\r\n\
File Creation Time: 1016202518:02|||||||\r\n";

    const OTHER: &str = "ACT Symbol|Security Name|Exchange|CQS Symbol|ETF|Round Lot Size|Test Issue|NASDAQ Symbol\n\
JPM|JPMorgan Chase & Co. Common Stock|N|JPM|N|100|N|JPM\n\
XOM|Exxon Mobil Corporation Common Stock|N|XOM|N|100|N|XOM\n\
\n\
File Creation Time: 1016202518:02|||||||\n";

    fn universe() -> TickerUniverse {
        let mut tickers = parse_listing(NASDAQ, Exchange::Nasdaq);
        tickers.extend(parse_listing(OTHER, Exchange::Nyse));
        let mut universe = TickerUniverse::new(tickers);
        universe.enrich(&SectorDatabase::from_entries([
            ("AAPL", SectorEntry::new("Technology", "Consumer Electronics")),
            ("MSFT", SectorEntry::new("Technology", "Software - Infrastructure")),
            ("JPM", SectorEntry::new("Financial Services", "Banks - Diversified")),
        ]));
        universe
    }

    #[test]
    fn test_parse_listing_skips_header_footer_and_test_issues() {
        let listed = parse_listing(NASDAQ, Exchange::Nasdaq);
        let symbols: Vec<&str> = listed.iter().map(|t| t.ticker.as_str()).collect();

        assert_eq!(symbols, vec!["AAPL", "ADBE", "QQQ", "MSFT"]);
        assert_eq!(listed[0].company, "Apple Inc. - Common Stock");
        assert_eq!(listed[0].exchange, Exchange::Nasdaq);
        assert!(listed[2].etf);
        assert!(!listed[0].etf);
        assert_eq!(listed[0].sector, "Unknown");
    }

    #[test]
    fn test_parse_other_listed() {
        let listed = parse_listing(OTHER, Exchange::Nyse);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].ticker, "XOM");
        assert_eq!(listed[1].exchange.to_string(), "NYSE");
    }

    #[test]
    fn test_enrich_and_sectors() {
        let universe = universe();
        let jpm = universe.tickers().iter().find(|t| t.ticker == "JPM").unwrap();
        assert_eq!(jpm.sector, "Financial Services");
        assert_eq!(
            universe.sectors(),
            vec!["Financial Services".to_string(), "Technology".to_string()]
        );
    }

    #[test]
    fn test_filters() {
        let universe = universe();

        let nasdaq = UniverseFilter::all().exchanges([Exchange::Nasdaq]);
        assert_eq!(universe.filter(&nasdaq).count(), 4);

        let letter_a = UniverseFilter::all().letters(['a']);
        assert_eq!(universe.select(&letter_a, 10), vec!["AAPL", "ADBE"]);

        let tech_nyse = UniverseFilter::all()
            .exchanges([Exchange::Nyse])
            .sectors(["technology"]);
        assert_eq!(universe.filter(&tech_nyse).count(), 0);

        let tech = UniverseFilter::all().sectors(["Technology"]);
        assert_eq!(universe.select(&tech, 10), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_select_respects_max() {
        let universe = universe();
        assert_eq!(universe.select(&UniverseFilter::all(), 3), vec!["AAPL", "ADBE", "QQQ"]);
        assert!(universe.select(&UniverseFilter::all(), 0).is_empty());
    }

    #[test]
    fn test_exchange_from_str() {
        assert_eq!("nasdaq".parse::<Exchange>().unwrap(), Exchange::Nasdaq);
        assert_eq!("NYSE".parse::<Exchange>().unwrap(), Exchange::Nyse);
        assert!("LSE".parse::<Exchange>().is_err());
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_nasdaq_directory() {
        let client = UniverseClient::from_config(&StockConfig::default()).unwrap();
        let universe = client.fetch(&[Exchange::Nasdaq]).await;
        assert!(universe.len() > 1000);
    }
}
