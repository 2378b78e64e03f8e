//! Price series index.
//!
//! Groups monthly rows by ticker. Each [`PriceSeries`] keeps every row in
//! calendar order and a hash lookup from [`YearMonth`] to the row, so exit
//! prices resolve in constant time while the return calculator walks entries.

use crate::observation::{MonthlyPriceObservation, MonthlyPriceRecord, YearMonth};
use std::collections::{BTreeMap, HashMap};

/// Monthly rows of a single ticker.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    ticker: String,
    rows: Vec<MonthlyPriceObservation>,
    lookup: HashMap<YearMonth, usize>,
}

impl PriceSeries {
    /// Build a series from rows belonging to `ticker`.
    ///
    /// Rows are ordered by `(year, month)`. If the same key appears more than
    /// once, every row is kept but lookups resolve to the last one supplied.
    pub fn from_rows(ticker: impl Into<String>, mut rows: Vec<MonthlyPriceObservation>) -> Self {
        rows.sort_by_key(MonthlyPriceObservation::key);
        let lookup = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.key(), i))
            .collect();

        Self {
            ticker: ticker.into(),
            rows,
            lookup,
        }
    }

    /// Ticker symbol.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// All rows in calendar order.
    pub fn rows(&self) -> &[MonthlyPriceObservation] {
        &self.rows
    }

    /// Number of rows, duplicates included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observation for a calendar key.
    pub fn get(&self, key: YearMonth) -> Option<&MonthlyPriceObservation> {
        self.lookup.get(&key).map(|&i| &self.rows[i])
    }

    /// Observation for `(year, month)`.
    pub fn price_at(&self, year: i32, month: u32) -> Option<&MonthlyPriceObservation> {
        self.get(YearMonth::new(year, month))
    }

    /// First and last calendar keys covered.
    pub fn span(&self) -> Option<(YearMonth, YearMonth)> {
        Some((self.rows.first()?.key(), self.rows.last()?.key()))
    }

    /// Copy of the series restricted to rows with `year >= min_year`.
    pub fn since(&self, min_year: i32) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| row.year >= min_year)
            .cloned()
            .collect();
        Self::from_rows(self.ticker.clone(), rows)
    }
}

/// Monthly price series for many tickers, keyed by uppercase symbol.
#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Group observations by ticker.
    ///
    /// Rows with an empty ticker or a month outside 1-12 are dropped; gaps in
    /// source data are expected and are not an error.
    pub fn from_observations<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = MonthlyPriceObservation>,
    {
        let mut grouped: BTreeMap<String, Vec<MonthlyPriceObservation>> = BTreeMap::new();
        let mut dropped = 0usize;

        for mut row in rows {
            row.ticker = row.ticker.trim().to_uppercase();
            if !row.is_well_formed() {
                dropped += 1;
                continue;
            }
            grouped.entry(row.ticker.clone()).or_default().push(row);
        }

        if dropped > 0 {
            tracing::debug!(dropped, "dropped malformed monthly price rows");
        }

        let series = grouped
            .into_iter()
            .map(|(ticker, rows)| {
                let series = PriceSeries::from_rows(ticker.clone(), rows);
                (ticker, series)
            })
            .collect();

        Self { series }
    }

    /// Group loosely-typed records by ticker, dropping malformed ones.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MonthlyPriceRecord>,
    {
        let mut dropped = 0usize;
        let rows: Vec<_> = records
            .into_iter()
            .filter_map(|record| {
                MonthlyPriceObservation::try_from(record)
                    .map_err(|_| dropped += 1)
                    .ok()
            })
            .collect();

        if dropped > 0 {
            tracing::debug!(dropped, "dropped malformed monthly price records");
        }

        Self::from_observations(rows)
    }

    /// Series for a ticker (case-insensitive).
    pub fn get(&self, ticker: &str) -> Option<&PriceSeries> {
        self.series
            .get(ticker)
            .or_else(|| self.series.get(&ticker.to_uppercase()))
    }

    /// Whether the index holds at least one row for `ticker`.
    pub fn contains(&self, ticker: &str) -> bool {
        self.get(ticker).is_some_and(|s| !s.is_empty())
    }

    /// Tickers in ascending order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Iterate over `(ticker, series)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceSeries)> {
        self.series.iter().map(|(t, s)| (t.as_str(), s))
    }

    /// Number of tickers.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of rows across all tickers.
    pub fn row_count(&self) -> usize {
        self.series.values().map(PriceSeries::len).sum()
    }

    /// Copy of the index restricted to rows with `year >= min_year`.
    ///
    /// Tickers left without rows are removed.
    pub fn since_year(&self, min_year: i32) -> Self {
        let series = self
            .series
            .iter()
            .map(|(ticker, s)| (ticker.clone(), s.since(min_year)))
            .filter(|(_, s)| !s.is_empty())
            .collect();
        Self { series }
    }
}

impl FromIterator<MonthlyPriceObservation> for PriceIndex {
    fn from_iter<T: IntoIterator<Item = MonthlyPriceObservation>>(iter: T) -> Self {
        Self::from_observations(iter)
    }
}
