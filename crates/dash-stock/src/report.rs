//! Terminal tables for summaries, listings and price history

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::collections::HashMap;

use crate::models::{PriceBar, StockSummary};
use crate::universe::ListedTicker;

/// `$190.50`
pub fn format_price(value: f64) -> String {
    format!("${value:.2}")
}

/// `82,488,700`
pub fn format_volume(volume: u64) -> String {
    let digits = volume.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Ticker, Price, Sector, Industry, Volume, MA20, MA50
pub fn summary_table(summaries: &[StockSummary]) -> Table {
    let mut table = new_table(&["Ticker", "Price", "Sector", "Industry", "Volume", "MA20", "MA50"]);
    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.ticker),
            right(format_price(s.price)),
            Cell::new(&s.sector),
            Cell::new(&s.industry),
            right(format_volume(s.volume)),
            right(format_price(s.ma20)),
            right(format_price(s.ma50)),
        ]);
    }
    table
}

pub fn listing_table<'a>(listed: impl IntoIterator<Item = &'a ListedTicker>) -> Table {
    let mut table = new_table(&["Ticker", "Company", "Exchange", "Sector", "Industry"]);
    for t in listed {
        table.add_row(vec![
            Cell::new(&t.ticker),
            Cell::new(&t.company),
            Cell::new(t.exchange.label()),
            Cell::new(&t.sector),
            Cell::new(&t.industry),
        ]);
    }
    table
}

/// Count of loaded stocks per sector, largest first (ties by name)
pub fn sector_distribution(summaries: &[StockSummary]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for s in summaries {
        *counts.entry(s.sector.as_str()).or_default() += 1;
    }
    let mut distribution: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    distribution
}

pub fn distribution_table(distribution: &[(String, usize)]) -> Table {
    let total: usize = distribution.iter().map(|(_, n)| n).sum();
    let mut table = new_table(&["Sector", "Stocks", "Share"]);
    for (sector, count) in distribution {
        let share = if total == 0 {
            0.0
        } else {
            *count as f64 * 100.0 / total as f64
        };
        table.add_row(vec![
            Cell::new(sector),
            right(count.to_string()),
            right(format!("{share:.1}%")),
        ]);
    }
    table
}

/// OHLCV rows, oldest first
pub fn history_table(bars: &[PriceBar]) -> Table {
    let mut table = new_table(&["Date", "Open", "High", "Low", "Close", "Volume"]);
    for b in bars {
        table.add_row(vec![
            Cell::new(b.date.format("%Y-%m-%d")),
            right(format!("{:.2}", b.open)),
            right(format!("{:.2}", b.high)),
            right(format!("{:.2}", b.low)),
            right(format!("{:.2}", b.close)),
            right(format_volume(b.volume)),
        ]);
    }
    table
}

/// Headline metrics for one stock
pub fn detail_block(summary: &StockSummary) -> String {
    let trend = if summary.above_ma20() { "above" } else { "at or below" };
    format!(
        "{ticker}\n  Price:    {price}\n  Sector:   {sector}\n  Industry: {industry}\n  Volume:   {volume}\n  MA20:     {ma20}\n  MA50:     {ma50}\n  Points:   {points} (close {trend} MA20)",
        ticker = summary.ticker,
        price = format_price(summary.price),
        sector = summary.sector,
        industry = summary.industry,
        volume = format_volume(summary.volume),
        ma20 = format_price(summary.ma20),
        ma50 = format_price(summary.ma50),
        points = summary.data_points(),
    )
}
