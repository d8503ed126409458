//! Trailing moving averages over closing prices

use serde::{Deserialize, Serialize};
use ta::{Next, indicators::SimpleMovingAverage};

use crate::error::{Result, StockError};

/// Short-term moving average window
pub const MA_SHORT: usize = 20;
/// Medium-term moving average window
pub const MA_LONG: usize = 50;

/// What a moving average reports when fewer closes than its window exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortWindowPolicy {
    /// Fall back to the latest close
    #[default]
    LatestClose,
    /// Average whatever closes are available
    PartialMean,
}

impl std::str::FromStr for ShortWindowPolicy {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "latest_close" | "latest" => Ok(Self::LatestClose),
            "partial_mean" | "partial" => Ok(Self::PartialMean),
            other => Err(StockError::ConfigError(format!(
                "unknown short window policy: {other}"
            ))),
        }
    }
}

/// Simple moving average of the trailing `window` closes
///
/// Returns `None` for an empty series.
pub fn moving_average(closes: &[f64], window: usize, policy: ShortWindowPolicy) -> Result<Option<f64>> {
    let Some(&latest) = closes.last() else {
        return Ok(None);
    };

    if closes.len() < window && policy == ShortWindowPolicy::LatestClose {
        return Ok(Some(latest));
    }

    let mut sma = SimpleMovingAverage::new(window)
        .map_err(|e| StockError::Other(format!("moving average window {window}: {e}")))?;
    let tail = &closes[closes.len().saturating_sub(window)..];
    let mut value = latest;
    for &close in tail {
        value = sma.next(close);
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(moving_average(&[], 20, ShortWindowPolicy::LatestClose).unwrap(), None);
    }

    #[test]
    fn test_full_window_uses_last_closes_only() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let ma = moving_average(&closes, 20, ShortWindowPolicy::LatestClose).unwrap().unwrap();
        // mean of 11..=30
        assert!(approx(ma, 20.5));
    }

    #[test]
    fn test_short_series_latest_close() {
        let closes = [10.0, 20.0, 30.0];
        let ma = moving_average(&closes, 20, ShortWindowPolicy::LatestClose).unwrap().unwrap();
        assert!(approx(ma, 30.0));
    }

    #[test]
    fn test_short_series_partial_mean() {
        let closes = [10.0, 20.0, 30.0];
        let ma = moving_average(&closes, 20, ShortWindowPolicy::PartialMean).unwrap().unwrap();
        assert!(approx(ma, 20.0));
    }

    #[test]
    fn test_exact_window() {
        let closes = vec![2.0; 50];
        let ma = moving_average(&closes, 50, ShortWindowPolicy::LatestClose).unwrap().unwrap();
        assert!(approx(ma, 2.0));
    }

    #[test]
    fn test_zero_window_is_error() {
        assert!(moving_average(&[1.0], 0, ShortWindowPolicy::PartialMean).is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("partial-mean".parse::<ShortWindowPolicy>().unwrap(), ShortWindowPolicy::PartialMean);
        assert_eq!("latest_close".parse::<ShortWindowPolicy>().unwrap(), ShortWindowPolicy::LatestClose);
        assert!("median".parse::<ShortWindowPolicy>().is_err());
    }
}
