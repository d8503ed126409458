//! Market data core for the US stock dashboard
//!
//! This crate turns a list of tickers into per-ticker summaries:
//!
//! - Sector and industry classification from a local JSON database
//! - Daily OHLCV history from Yahoo Finance or a chart gateway
//! - 20/50 day moving averages over the fetched closes
//! - Sequential batch loading with progress reporting and a fixed request delay
//! - NASDAQ/NYSE ticker universe downloads and filters
//!
//! Per-ticker failures never abort a batch: the ticker is logged and skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! use dash_stock::{StockConfig, StockSummarizer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env()?.build()?;
//!     let summarizer = StockSummarizer::from_config(config)?;
//!
//!     let summaries = summarizer
//!         .summarize_batch(&["AAPL", "MSFT"], |p| {
//!             eprintln!("Loading {}/{}: {}", p.index, p.total, p.ticker);
//!         })
//!         .await;
//!     println!("{}", dash_stock::report::summary_table(&summaries));
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod report;
pub mod sector;
pub mod summarizer;
pub mod universe;

pub use api::{ChartGatewayClient, MarketDataProvider, YahooFinanceClient};
pub use cache::SummaryCache;
pub use config::{DataProvider, StockConfig};
pub use error::{Result, StockError};
pub use indicators::ShortWindowPolicy;
pub use models::{PriceBar, Period, StockSummary};
pub use sector::{SectorDatabase, SectorEntry};
pub use summarizer::{BatchEvent, BatchProgress, StockSummarizer, TickerOutcome};
pub use universe::{Exchange, ListedTicker, TickerUniverse, UniverseClient, UniverseFilter};
