//! Relative history windows understood by the providers

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StockError;

/// Relative look-back window for daily history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    OneDay,
    FiveDays,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    /// Provider range code, e.g. `"2mo"`
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::TwoMonths => "2mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Get all periods
    pub fn all() -> [Period; 12] {
        [
            Period::OneDay,
            Period::FiveDays,
            Period::OneMonth,
            Period::TwoMonths,
            Period::ThreeMonths,
            Period::SixMonths,
            Period::OneYear,
            Period::TwoYears,
            Period::FiveYears,
            Period::TenYears,
            Period::YearToDate,
            Period::Max,
        ]
    }

    /// Start of the window ending at `end`
    pub fn start_before(&self, end: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            Period::OneDay => 1,
            Period::FiveDays => 5,
            Period::OneMonth => 30,
            Period::TwoMonths => 61,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1825,
            Period::TenYears => 3650,
            Period::Max => 36500, // ~100 years
            Period::YearToDate => {
                return NaiveDate::from_ymd_opt(end.year(), 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map_or(end - Duration::days(365), |dt| dt.and_utc());
            }
        };
        end - Duration::days(days)
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::TwoMonths
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Period::all()
            .into_iter()
            .find(|p| p.as_str() == code)
            .ok_or_else(|| StockError::InvalidPeriod(s.to_string()))
    }
}

impl TryFrom<String> for Period {
    type Error = StockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.as_str().to_string()
    }
}
