//! Per-ticker summary record

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::indicators::{MA_LONG, MA_SHORT, ShortWindowPolicy, moving_average};
use crate::models::PriceBar;
use crate::sector::SectorEntry;

/// Latest price, volume and moving averages for one ticker
///
/// `price` is always the close of the last bar in `historical_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub ticker: String,
    pub price: f64,
    pub sector: String,
    pub industry: String,
    pub volume: u64,
    pub ma20: f64,
    pub ma50: f64,
    pub historical_data: Vec<PriceBar>,
}

impl StockSummary {
    /// Derive a summary from date-ascending bars; `None` when `bars` is empty
    pub fn from_history(
        ticker: impl Into<String>,
        bars: Vec<PriceBar>,
        sector: SectorEntry,
        policy: ShortWindowPolicy,
    ) -> Result<Option<Self>> {
        let Some(last) = bars.last() else {
            return Ok(None);
        };
        let price = last.close;
        let volume = last.volume;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let ma20 = moving_average(&closes, MA_SHORT, policy)?.unwrap_or(price);
        let ma50 = moving_average(&closes, MA_LONG, policy)?.unwrap_or(price);

        Ok(Some(Self {
            ticker: ticker.into(),
            price,
            sector: sector.sector,
            industry: sector.industry,
            volume,
            ma20,
            ma50,
            historical_data: bars,
        }))
    }

    pub fn data_points(&self) -> usize {
        self.historical_data.len()
    }

    /// Whether the latest close sits above the 20-day average
    pub fn above_ma20(&self) -> bool {
        self.price > self.ma20
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn history(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume: 1_000 + i as u64,
            })
            .collect()
    }

    #[test]
    fn test_empty_history_is_absent() {
        let summary = StockSummary::from_history(
            "AAPL",
            Vec::new(),
            SectorEntry::unknown(),
            ShortWindowPolicy::LatestClose,
        )
        .unwrap();
        assert!(summary.is_none());
    }

    #[test]
    fn test_price_and_volume_from_last_bar() {
        let summary = StockSummary::from_history(
            "AAPL",
            history(&[10.0, 11.0, 12.5]),
            SectorEntry::new("Technology", "Consumer Electronics"),
            ShortWindowPolicy::LatestClose,
        )
        .unwrap()
        .unwrap();

        assert_eq!(summary.price, 12.5);
        assert_eq!(summary.volume, 1_002);
        assert_eq!(summary.sector, "Technology");
        assert_eq!(summary.industry, "Consumer Electronics");
        // fewer than 20 bars: both averages fall back to the latest close
        assert_eq!(summary.ma20, 12.5);
        assert_eq!(summary.ma50, 12.5);
        assert_eq!(summary.data_points(), 3);
    }

    #[test]
    fn test_ma20_full_window_ma50_fallback() {
        let closes: Vec<f64> = (1..=40).map(f64::from).collect();
        let summary = StockSummary::from_history(
            "MSFT",
            history(&closes),
            SectorEntry::unknown(),
            ShortWindowPolicy::LatestClose,
        )
        .unwrap()
        .unwrap();

        assert!((summary.ma20 - 30.5).abs() < 1e-9);
        assert_eq!(summary.ma50, 40.0);
        assert!(summary.above_ma20());
    }

    #[test]
    fn test_partial_mean_policy() {
        let closes: Vec<f64> = (1..=40).map(f64::from).collect();
        let summary = StockSummary::from_history(
            "MSFT",
            history(&closes),
            SectorEntry::unknown(),
            ShortWindowPolicy::PartialMean,
        )
        .unwrap()
        .unwrap();

        assert!((summary.ma20 - 30.5).abs() < 1e-9);
        assert!((summary.ma50 - 20.5).abs() < 1e-9);
    }
}
