//! Daily price bars

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Build a bar from a unix timestamp in seconds, using the UTC calendar date
    pub fn from_timestamp(
        timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Option<Self> {
        let date = DateTime::from_timestamp(timestamp, 0)?.date_naive();
        Some(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Order bars by date ascending, keeping the last bar seen for a duplicated date
pub fn normalize(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    #[test]
    fn test_from_timestamp_uses_utc_date() {
        // 2024-01-02T14:30:00Z, a regular session open
        let bar = PriceBar::from_timestamp(1_704_205_800, 1.0, 2.0, 0.5, 1.5, 10).unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bar.volume, 10);
    }

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let bars = vec![bar(5, 3.0), bar(3, 1.0), bar(4, 2.0), bar(5, 4.0)];
        let normalized = normalize(bars);
        let closes: Vec<f64> = normalized.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 4.0]);
    }
}
