//! Command-line front end for the stock dashboard

use std::collections::BTreeMap;
use std::sync::Arc;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use dash_stock::report;
use dash_stock::{
    BatchProgress, DataProvider, Exchange, Period, SectorDatabase, SectorEntry, StockConfig, StockSummarizer, StockSummary, UniverseClient,
    UniverseFilter,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dash")]
#[command(about = "US stock dashboard: sectors, prices and moving averages", long_about = None)]
struct Cli {
    /// Sector database JSON file
    #[arg(long, global = true)]
    sector_db: Option<PathBuf>,

    /// Market data provider (yahoo, gateway)
    #[arg(long, global = true)]
    provider: Option<DataProvider>,

    /// Pause between tickers in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// History window (1d, 5d, 1mo, 2mo, 3mo, 6mo, 1y, ...)
    #[arg(long, global = true)]
    period: Option<Period>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the given tickers
    Summary {
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Fetch several tickers at once
        #[arg(long)]
        concurrent: bool,
    },
    /// Show daily bars for one ticker
    History { ticker: String },
    /// Show metrics and daily bars for one summarized ticker
    Detail { ticker: String },
    /// Show the latest price for one ticker
    Quote { ticker: String },
    /// Show sector and industry for tickers
    Sector {
        #[arg(required = true)]
        tickers: Vec<String>,
    },
    /// List tickers from the exchange directories
    Tickers {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of rows
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Select tickers from the exchange directories and summarize them
    Load {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of stocks to load
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..=500))]
        max: u16,

        /// Explicit tickers, bypassing the exchange directories
        #[arg(long, value_delimiter = ',')]
        tickers: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Exchanges to include (nasdaq, nyse); all when omitted
    #[arg(long = "exchange")]
    exchanges: Vec<Exchange>,

    /// First letters to include
    #[arg(long = "letter")]
    letters: Vec<char>,

    /// Sectors to include
    #[arg(long = "sector")]
    sectors: Vec<String>,
}

impl FilterArgs {
    fn exchanges(&self) -> Vec<Exchange> {
        if self.exchanges.is_empty() {
            Exchange::all().to_vec()
        } else {
            self.exchanges.clone()
        }
    }

    fn to_filter(&self) -> UniverseFilter {
        UniverseFilter::all()
            .exchanges(self.exchanges.iter().copied())
            .letters(self.letters.iter().copied())
            .sectors(self.sectors.iter().cloned())
    }
}

impl Cli {
    fn stock_config(&self) -> anyhow::Result<StockConfig> {
        let mut builder = StockConfig::builder();
        if let Some(path) = &self.sector_db {
            builder = builder.sector_db_path(path);
        }
        if let Some(provider) = self.provider {
            builder = builder.provider(provider);
        }
        if let Some(ms) = self.delay_ms {
            builder = builder.request_delay(Duration::from_millis(ms));
        }
        if let Some(period) = self.period {
            builder = builder.history_period(period);
        }
        Ok(builder.with_env()?.build()?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = dash_utils::Config::from_env();
    dash_utils::init_tracing_with(&settings.log_filter);

    let cli = Cli::parse();
    let config = cli.stock_config()?;
    info!(provider = ?config.provider, period = %config.history_period, "Starting {}", settings.app_name);

    let sectors = Arc::new(SectorDatabase::load(&config.sector_db_path));
    let summarizer = StockSummarizer::with_sectors(config, sectors)?;

    match &cli.command {
        Command::Summary { tickers, concurrent } => {
            let summaries = if *concurrent {
                summarizer.summarize_batch_concurrent(tickers, print_progress).await
            } else {
                summarizer.summarize_batch(tickers, print_progress).await
            };
            print_summaries(&summaries, tickers.len(), cli.json)?;
        }
        Command::History { ticker } => {
            let period = summarizer.config().history_period;
            let bars = summarizer.try_fetch_history(ticker, period).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&bars)?);
            } else {
                println!("{ticker} ({period}, {} bars)", bars.len());
                println!("{}", report::history_table(&bars));
            }
        }
        Command::Detail { ticker } => {
            let summary = summarizer.try_summarize(ticker).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", report::detail_block(&summary));
                println!("{}", report::history_table(&summary.historical_data));
            }
        }
        Command::Quote { ticker } => {
            let price = summarizer.quote(ticker).await;
            if cli.json {
                println!("{}", serde_json::json!({ "ticker": ticker, "price": price }));
            } else {
                match price {
                    Some(price) => println!("{ticker}: {}", report::format_price(price)),
                    None => println!("{ticker}: no quote available"),
                }
            }
        }
        Command::Sector { tickers } => {
            if cli.json {
                let entries: BTreeMap<&str, SectorEntry> = tickers
                    .iter()
                    .map(|t| (t.as_str(), summarizer.lookup_sector(t)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for ticker in tickers {
                    let entry = summarizer.lookup_sector(ticker);
                    println!("{ticker}: {} / {}", entry.sector, entry.industry);
                }
            }
        }
        Command::Tickers { filter, limit } => {
            let universe = load_universe(&summarizer, filter).await?;
            let filter = filter.to_filter();
            let listed: Vec<_> = universe.filter(&filter).take(*limit).collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else {
                println!("{}", report::listing_table(listed.iter().copied()));
                println!("Showing {} of {} listed tickers", listed.len(), universe.len());
            }
        }
        Command::Load { filter, max, tickers } => {
            let tickers = if tickers.is_empty() {
                let universe = load_universe(&summarizer, filter).await?;
                universe.select(&filter.to_filter(), usize::from(*max))
            } else {
                tickers.iter().take(usize::from(*max)).cloned().collect()
            };
            if tickers.is_empty() {
                anyhow::bail!("no tickers match the given filters");
            }
            let summaries = summarizer.summarize_batch(&tickers, print_progress).await;
            print_summaries(&summaries, tickers.len(), cli.json)?;
        }
    }

    Ok(())
}

/// Download the exchange directories and tag them with the summarizer's sectors
async fn load_universe(
    summarizer: &StockSummarizer,
    filter: &FilterArgs,
) -> anyhow::Result<dash_stock::TickerUniverse> {
    let client = UniverseClient::from_config(summarizer.config())?;
    let mut universe = client.fetch(&filter.exchanges()).await;
    if universe.is_empty() {
        anyhow::bail!("could not load any exchange directory");
    }
    universe.enrich(summarizer.sectors());
    Ok(universe)
}

fn progress_line(progress: &BatchProgress<'_>) -> String {
    format!("Loading {}/{}: {}", progress.index, progress.total, progress.ticker)
}

fn print_progress(progress: BatchProgress<'_>) {
    eprintln!("{}", progress_line(&progress));
}

fn print_summaries(summaries: &[StockSummary], requested: usize, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
        return Ok(());
    }

    println!("Successfully loaded {}/{} stocks", summaries.len(), requested);
    if summaries.is_empty() {
        return Ok(());
    }
    println!("{}", report::summary_table(summaries));

    let distribution = report::sector_distribution(summaries);
    println!("{}", report::distribution_table(&distribution));
    Ok(())
}
