//! Per-ticker summaries and sequential batch loading
//!
//! [`StockSummarizer`] is an explicit, caller-owned value built from a provider,
//! the shared sector mapping and a [`StockConfig`]. All provider failures are
//! caught here: the plain operations degrade to an empty history or an absent
//! summary, while the `try_` variants return the underlying [`StockError`].
//!
//! Batches run strictly in input order with a fixed pause after every ticker,
//! so one bad symbol never aborts the run and the provider's implicit rate
//! limit is respected.

use futures::{Stream, StreamExt, stream};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::sync::Arc;

use crate::api::{MarketDataProvider, provider_from_config, validate_symbol};
use crate::cache::SummaryCache;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::models::{Period, PriceBar, StockSummary, bar};
use crate::sector::{SectorDatabase, SectorEntry};

/// Progress report emitted before each ticker is fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress<'a> {
    /// 1-based position in the batch
    pub index: usize,
    pub total: usize,
    pub ticker: &'a str,
}

/// Result for one ticker of a detailed batch
#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: Result<StockSummary>,
}

/// Events produced by [`StockSummarizer::batch_events`]
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Progress {
        index: usize,
        total: usize,
        ticker: String,
    },
    Loaded(Box<StockSummary>),
    Skipped {
        ticker: String,
        reason: String,
    },
}

enum Step {
    Announce(usize),
    Fetch(usize),
}

/// Builds [`StockSummary`] records from a market-data provider
pub struct StockSummarizer {
    provider: Arc<dyn MarketDataProvider>,
    sectors: Arc<SectorDatabase>,
    config: Arc<StockConfig>,
    cache: Option<SummaryCache>,
}

impl StockSummarizer {
    /// Create a summarizer; a cache is attached when `config.cache_ttl` is set
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        sectors: Arc<SectorDatabase>,
        config: Arc<StockConfig>,
    ) -> Self {
        let cache = config.cache_ttl.map(SummaryCache::new);
        Self {
            provider,
            sectors,
            config,
            cache,
        }
    }

    /// Load the sector database and provider named by `config`
    pub fn from_config(config: StockConfig) -> Result<Self> {
        let sectors = Arc::new(SectorDatabase::load(&config.sector_db_path));
        Self::with_sectors(config, sectors)
    }

    /// Build the configured provider around an already loaded sector mapping
    pub fn with_sectors(config: StockConfig, sectors: Arc<SectorDatabase>) -> Result<Self> {
        config.validate()?;
        let provider = provider_from_config(&config)?;
        Ok(Self::new(provider, sectors, Arc::new(config)))
    }

    /// Attach an explicit summary cache
    pub fn with_cache(mut self, cache: SummaryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    pub fn sectors(&self) -> &SectorDatabase {
        &self.sectors
    }

    pub fn shared_sectors(&self) -> Arc<SectorDatabase> {
        Arc::clone(&self.sectors)
    }

    pub fn cache(&self) -> Option<&SummaryCache> {
        self.cache.as_ref()
    }

    pub fn lookup_sector(&self, ticker: &str) -> SectorEntry {
        self.sectors.lookup(ticker)
    }

    /// Fetch daily history, surfacing provider errors
    pub async fn try_fetch_history(&self, ticker: &str, period: Period) -> Result<Vec<PriceBar>> {
        let ticker = validate_symbol(ticker)?;
        let bars = self.provider.get_history(ticker, period).await?;
        Ok(bar::normalize(bars))
    }

    /// Fetch daily history; any failure yields an empty vector
    pub async fn fetch_history(&self, ticker: &str, period: Period) -> Vec<PriceBar> {
        match self.try_fetch_history(ticker, period).await {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!(ticker, %period, "Error fetching historical data: {e}");
                Vec::new()
            }
        }
    }

    /// Latest price, or `None` on any failure
    pub async fn quote(&self, ticker: &str) -> Option<f64> {
        let result = match validate_symbol(ticker) {
            Ok(ticker) => self.provider.get_quote(ticker).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(price) => Some(price),
            Err(e) => {
                tracing::warn!(ticker, "Error fetching price: {e}");
                None
            }
        }
    }

    /// Build a summary, surfacing why it could not be produced
    pub async fn try_summarize(&self, ticker: &str) -> Result<StockSummary> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(ticker).await {
                return Ok(hit.summary);
            }
        }

        let bars = self.try_fetch_history(ticker, self.config.history_period).await?;
        let summary = StockSummary::from_history(
            ticker,
            bars,
            self.sectors.lookup(ticker),
            self.config.short_window_policy,
        )?
        .ok_or_else(|| StockError::no_data(ticker))?;

        if let Some(cache) = &self.cache {
            cache.insert(summary.clone()).await;
        }
        Ok(summary)
    }

    /// Build a summary; `None` when no history is available
    pub async fn summarize(&self, ticker: &str) -> Option<StockSummary> {
        match self.try_summarize(ticker).await {
            Ok(summary) => Some(summary),
            Err(StockError::DataUnavailable { reason, .. }) => {
                tracing::info!(ticker, "Skipping: {reason}");
                None
            }
            Err(e) => {
                tracing::warn!(ticker, "Error getting info: {e}");
                None
            }
        }
    }

    /// Summarize `tickers` in order, dropping the ones without data
    ///
    /// `on_progress` runs before each fetch, including for tickers that fail.
    pub async fn summarize_batch<S, F>(&self, tickers: &[S], on_progress: F) -> Vec<StockSummary>
    where
        S: AsRef<str>,
        F: FnMut(BatchProgress<'_>),
    {
        self.summarize_batch_detailed(tickers, on_progress)
            .await
            .into_iter()
            .filter_map(|outcome| outcome.result.ok())
            .collect()
    }

    /// Summarize `tickers` in order, keeping one outcome per input
    pub async fn summarize_batch_detailed<S, F>(&self, tickers: &[S], mut on_progress: F) -> Vec<TickerOutcome>
    where
        S: AsRef<str>,
        F: FnMut(BatchProgress<'_>),
    {
        let total = tickers.len();
        let mut outcomes = Vec::with_capacity(total);
        tracing::info!(total, delay_ms = self.config.request_delay.as_millis() as u64, "Loading batch");

        for (i, ticker) in tickers.iter().enumerate() {
            let ticker = ticker.as_ref();
            on_progress(BatchProgress {
                index: i + 1,
                total,
                ticker,
            });

            let result = self.try_summarize(ticker).await;
            if let Err(e) = &result {
                tracing::warn!(ticker, "Skipping: {e}");
            }
            outcomes.push(TickerOutcome {
                ticker: ticker.to_string(),
                result,
            });

            // Rate limiting between provider calls
            tokio::time::sleep(self.config.request_delay).await;
        }

        let loaded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        tracing::info!(loaded, total, "Batch complete");
        outcomes
    }

    /// The sequential batch as a stream of progress and result events
    pub fn batch_events<'a, S>(&'a self, tickers: &'a [S]) -> impl Stream<Item = BatchEvent> + 'a
    where
        S: AsRef<str>,
    {
        let total = tickers.len();
        stream::unfold(Step::Announce(0), move |step| async move {
            match step {
                Step::Announce(i) => {
                    let ticker = tickers.get(i)?.as_ref().to_string();
                    let event = BatchEvent::Progress {
                        index: i + 1,
                        total,
                        ticker,
                    };
                    Some((event, Step::Fetch(i)))
                }
                Step::Fetch(i) => {
                    let ticker = tickers.get(i)?.as_ref();
                    let event = match self.try_summarize(ticker).await {
                        Ok(summary) => BatchEvent::Loaded(Box::new(summary)),
                        Err(e) => BatchEvent::Skipped {
                            ticker: ticker.to_string(),
                            reason: e.to_string(),
                        },
                    };
                    tokio::time::sleep(self.config.request_delay).await;
                    Some((event, Step::Announce(i + 1)))
                }
            }
        })
    }

    /// Summarize with up to `max_concurrency` requests in flight
    ///
    /// Requests are admitted at most once per `request_delay`. Output keeps
    /// input order; progress is reported in input order as results complete
    /// rather than before each fetch.
    pub async fn summarize_batch_concurrent<S, F>(&self, tickers: &[S], mut on_progress: F) -> Vec<StockSummary>
    where
        S: AsRef<str>,
        F: FnMut(BatchProgress<'_>),
    {
        let total = tickers.len();
        let gate: Option<DefaultDirectRateLimiter> =
            Quota::with_period(self.config.request_delay).map(RateLimiter::direct);
        let gate = gate.as_ref();

        let results = stream::iter(tickers.iter().enumerate())
            .map(|(i, ticker)| async move {
                if let Some(gate) = gate {
                    gate.until_ready().await;
                }
                let ticker = ticker.as_ref();
                (i, ticker, self.summarize(ticker).await)
            })
            .buffered(self.config.max_concurrency);
        let mut results = std::pin::pin!(results);

        let mut summaries = Vec::with_capacity(total);
        while let Some((i, ticker, summary)) = results.next().await {
            on_progress(BatchProgress {
                index: i + 1,
                total,
                ticker,
            });
            summaries.extend(summary);
        }
        summaries
    }
}
