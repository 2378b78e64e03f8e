//! Monthly price records.
//!
//! [`MonthlyPriceObservation`] is the strongly-typed fact the engine reads.
//! [`MonthlyPriceRecord`] is its loosely-typed twin used at ingestion
//! boundaries (CSV files, database rows) where any column may be missing.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar key of a monthly observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
}

impl YearMonth {
    /// Create a new key.
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Advance the key by `months`, rolling over year boundaries.
    ///
    /// Returns `None` when the resulting year does not fit in an `i32`.
    ///
    /// ```
    /// use almanac_data::YearMonth;
    ///
    /// assert_eq!(YearMonth::new(2020, 10).add_months(6), Some(YearMonth::new(2021, 4)));
    /// assert_eq!(YearMonth::new(2020, 12).add_months(1), Some(YearMonth::new(2021, 1)));
    /// ```
    pub const fn add_months(self, months: u32) -> Option<Self> {
        let total = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        let year = total.div_euclid(12);
        if year > i32::MAX as i64 || year < i32::MIN as i64 {
            return None;
        }
        Some(Self {
            year: year as i32,
            month: (total.rem_euclid(12) + 1) as u32,
        })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// One month of price history for a ticker.
///
/// Uniquely keyed by `(ticker, year, month)`. Only `open_first`, `close_last`
/// and `close_max` feed the return calculation; the remaining columns are
/// carried through from the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyPriceObservation {
    /// Uppercase ticker symbol.
    pub ticker: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Open of the first trading day.
    pub open_first: Option<f64>,
    /// Close of the last trading day.
    pub close_last: Option<f64>,
    /// Highest close of the month.
    pub close_max: Option<f64>,
    /// Highest intraday high of the month.
    pub high_max: Option<f64>,
    /// Lowest intraday low of the month.
    pub low_min: Option<f64>,
    /// Total traded volume.
    pub volume_total: Option<u64>,
    /// Number of trading days.
    pub trading_days: Option<u32>,
}

impl MonthlyPriceObservation {
    /// Create an observation with no price columns set.
    pub fn new(ticker: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            year,
            month,
            ..Default::default()
        }
    }

    /// Set the first-day open.
    pub fn with_open_first(mut self, price: f64) -> Self {
        self.open_first = Some(price);
        self
    }

    /// Set the last-day close.
    pub fn with_close_last(mut self, price: f64) -> Self {
        self.close_last = Some(price);
        self
    }

    /// Set the peak close.
    pub fn with_close_max(mut self, price: f64) -> Self {
        self.close_max = Some(price);
        self
    }

    /// Calendar key of this observation.
    pub const fn key(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }

    /// Whether the identifying columns are usable.
    pub fn is_well_formed(&self) -> bool {
        !self.ticker.is_empty() && (1..=12).contains(&self.month)
    }
}

/// A monthly price row as it arrives from a file or database.
///
/// Every column is optional. Rows lacking a ticker, year or valid month are
/// rejected by the conversion into [`MonthlyPriceObservation`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyPriceRecord {
    /// Ticker symbol.
    pub ticker: Option<String>,
    /// Calendar year.
    pub year: Option<i32>,
    /// Calendar month.
    pub month: Option<u32>,
    /// Open of the first trading day.
    pub open_first: Option<f64>,
    /// Close of the last trading day.
    pub close_last: Option<f64>,
    /// Highest close of the month.
    pub close_max: Option<f64>,
    /// Highest intraday high.
    #[serde(default)]
    pub high_max: Option<f64>,
    /// Lowest intraday low.
    #[serde(default)]
    pub low_min: Option<f64>,
    /// Total traded volume.
    #[serde(default)]
    pub volume_total: Option<u64>,
    /// Number of trading days.
    #[serde(default)]
    pub trading_days: Option<u32>,
}

impl TryFrom<MonthlyPriceRecord> for MonthlyPriceObservation {
    type Error = DataError;

    fn try_from(record: MonthlyPriceRecord) -> Result<Self> {
        let ticker = record
            .ticker
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DataError::MalformedRecord("missing ticker".to_string()))?;
        let year = record
            .year
            .ok_or_else(|| DataError::MalformedRecord(format!("{ticker}: missing year")))?;
        let month = record
            .month
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                DataError::MalformedRecord(format!("{ticker}: missing or invalid month"))
            })?;

        Ok(Self {
            ticker,
            year,
            month,
            open_first: record.open_first,
            close_last: record.close_last,
            close_max: record.close_max,
            high_max: record.high_max,
            low_min: record.low_min,
            volume_total: record.volume_total,
            trading_days: record.trading_days,
        })
    }
}

impl From<MonthlyPriceObservation> for MonthlyPriceRecord {
    fn from(obs: MonthlyPriceObservation) -> Self {
        Self {
            ticker: Some(obs.ticker),
            year: Some(obs.year),
            month: Some(obs.month),
            open_first: obs.open_first,
            close_last: obs.close_last,
            close_max: obs.close_max,
            high_max: obs.high_max,
            low_min: obs.low_min,
            volume_total: obs.volume_total,
            trading_days: obs.trading_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_rollover() {
        assert_eq!(YearMonth::new(2020, 10).add_months(6), Some(YearMonth::new(2021, 4)));
        assert_eq!(YearMonth::new(2020, 12).add_months(1), Some(YearMonth::new(2021, 1)));
        assert_eq!(YearMonth::new(2020, 1).add_months(3), Some(YearMonth::new(2020, 4)));
        assert_eq!(YearMonth::new(2020, 5).add_months(30), Some(YearMonth::new(2022, 11)));
        assert_eq!(YearMonth::new(2020, 12).add_months(12), Some(YearMonth::new(2021, 12)));
    }

    #[test]
    fn test_year_month_huge_offsets() {
        assert_eq!(
            YearMonth::new(2020, 1).add_months(u32::MAX),
            Some(YearMonth::new(2020 + 357_913_941, 4))
        );
        assert_eq!(YearMonth::new(i32::MAX, 12).add_months(1), None);
    }

    #[test]
    fn test_year_month_ordering_and_display() {
        assert!(YearMonth::new(2020, 12) < YearMonth::new(2021, 1));
        assert_eq!(YearMonth::new(2024, 3).to_string(), "2024-03");
    }

    #[test]
    fn test_new_normalizes_ticker() {
        let obs = MonthlyPriceObservation::new(" aapl ", 2024, 1).with_close_max(180.0);
        assert_eq!(obs.ticker, "AAPL");
        assert_eq!(obs.close_max, Some(180.0));
        assert!(obs.open_first.is_none());
        assert!(obs.is_well_formed());
    }

    #[test]
    fn test_record_conversion() {
        let record = MonthlyPriceRecord {
            ticker: Some("msft".to_string()),
            year: Some(2023),
            month: Some(7),
            close_max: Some(350.0),
            ..Default::default()
        };
        let obs = MonthlyPriceObservation::try_from(record).unwrap();
        assert_eq!(obs.ticker, "MSFT");
        assert_eq!(obs.key(), YearMonth::new(2023, 7));
    }

    #[test]
    fn test_record_conversion_rejects_malformed() {
        let missing_ticker = MonthlyPriceRecord {
            year: Some(2023),
            month: Some(7),
            ..Default::default()
        };
        assert!(MonthlyPriceObservation::try_from(missing_ticker).is_err());

        let blank_ticker = MonthlyPriceRecord {
            ticker: Some("  ".to_string()),
            year: Some(2023),
            month: Some(7),
            ..Default::default()
        };
        assert!(MonthlyPriceObservation::try_from(blank_ticker).is_err());

        let bad_month = MonthlyPriceRecord {
            ticker: Some("AAPL".to_string()),
            year: Some(2023),
            month: Some(13),
            ..Default::default()
        };
        assert!(MonthlyPriceObservation::try_from(bad_month).is_err());

        let missing_year = MonthlyPriceRecord {
            ticker: Some("AAPL".to_string()),
            month: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            MonthlyPriceObservation::try_from(missing_year),
            Err(DataError::MalformedRecord(_))
        ));
    }
}
