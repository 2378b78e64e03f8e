//! SQLite-backed monthly price store.

use crate::error::Result;
use crate::observation::{MonthlyPriceObservation, MonthlyPriceRecord};
use crate::series::PriceIndex;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SELECT_MONTHLY: &str = "SELECT ticker, year, month, open_first, close_last, close_max,
        high_max, low_min, volume_total, trading_days
 FROM monthly_prices";

/// SQLite store for monthly price rows and the tracked stock list.
#[derive(Debug)]
pub struct MonthlyPriceStore {
    conn: Connection,
}

/// A tracked stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    /// Ticker symbol
    pub ticker: String,
    /// Display name
    pub name: Option<String>,
    /// Watchlist tier (0 = benchmark)
    pub tier: u8,
}

/// Summary statistics of the stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    /// Number of monthly rows
    pub total_rows: usize,
    /// Number of distinct tickers with rows
    pub unique_tickers: usize,
    /// Earliest year present
    pub min_year: Option<i32>,
    /// Latest year present
    pub max_year: Option<i32>,
}

impl MonthlyPriceStore {
    /// Open (or create) a store at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS stocks (
                ticker TEXT PRIMARY KEY,
                name TEXT,
                tier INTEGER NOT NULL DEFAULT 1,
                added_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS monthly_prices (
                ticker TEXT NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                open_first REAL,
                high_max REAL,
                low_min REAL,
                close_max REAL,
                close_last REAL,
                volume_total INTEGER,
                trading_days INTEGER,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (ticker, year, month)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_monthly_prices_year ON monthly_prices(year)",
            [],
        )?;

        Ok(())
    }

    /// Register or update a tracked stock.
    pub fn put_stock(&self, ticker: &str, name: Option<&str>, tier: u8) -> Result<()> {
        let added_at = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO stocks (ticker, name, tier, added_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![ticker.to_uppercase(), name, tier, added_at],
        )?;
        Ok(())
    }

    /// Look up a tracked stock.
    pub fn get_stock(&self, ticker: &str) -> Result<Option<StockEntry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT ticker, name, tier FROM stocks WHERE ticker = ?1",
                params![ticker.to_uppercase()],
                |row| {
                    Ok(StockEntry {
                        ticker: row.get(0)?,
                        name: row.get(1)?,
                        tier: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// Tickers registered in `tier`, sorted.
    pub fn tickers_by_tier(&self, tier: u8) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT ticker FROM stocks WHERE tier = ?1 ORDER BY ticker")?;
        let tickers = stmt
            .query_map(params![tier], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(tickers)
    }

    /// Upsert monthly rows in a single transaction. Returns the number written.
    pub fn put_monthly_prices(&self, rows: &[MonthlyPriceObservation]) -> Result<usize> {
        let updated_at = Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO monthly_prices
                 (ticker, year, month, open_first, high_max, low_min, close_max, close_last,
                  volume_total, trading_days, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                let volume = row.volume_total.map(|v| i64::try_from(v).unwrap_or(i64::MAX));
                stmt.execute(params![
                    row.ticker,
                    row.year,
                    row.month,
                    row.open_first,
                    row.high_max,
                    row.low_min,
                    row.close_max,
                    row.close_last,
                    volume,
                    row.trading_days,
                    updated_at
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!(rows = rows.len(), "stored monthly prices");
        Ok(rows.len())
    }

    /// All rows with `year >= min_year`, ordered by ticker, year, month.
    pub fn load_monthly_prices(&self, min_year: i32) -> Result<Vec<MonthlyPriceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_MONTHLY} WHERE year >= ?1 ORDER BY ticker, year, month"
        ))?;
        let rows = stmt
            .query_map(params![min_year], record_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Rows for the given tickers with `year >= min_year`.
    pub fn load_for_tickers(
        &self,
        tickers: &[String],
        min_year: i32,
    ) -> Result<Vec<MonthlyPriceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_MONTHLY} WHERE ticker = ?1 AND year >= ?2 ORDER BY year, month"
        ))?;

        let mut rows = Vec::new();
        for ticker in tickers {
            let batch = stmt
                .query_map(params![ticker.to_uppercase(), min_year], record_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.extend(batch);
        }
        Ok(rows)
    }

    /// Load rows since `min_year` straight into a [`PriceIndex`].
    pub fn load_index(&self, min_year: i32) -> Result<PriceIndex> {
        Ok(PriceIndex::from_records(self.load_monthly_prices(min_year)?))
    }

    /// Row count, ticker count and year range.
    pub fn stats(&self) -> Result<StoreStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT ticker), MIN(year), MAX(year) FROM monthly_prices",
            [],
            |row| {
                Ok(StoreStats {
                    total_rows: row.get::<_, i64>(0)? as usize,
                    unique_tickers: row.get::<_, i64>(1)? as usize,
                    min_year: row.get(2)?,
                    max_year: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }

    /// Most recent (year, month) stored for a ticker.
    pub fn latest_month(&self, ticker: &str) -> Result<Option<(i32, u32)>> {
        let latest = self
            .conn
            .query_row(
                "SELECT year, month FROM monthly_prices WHERE ticker = ?1
                 ORDER BY year DESC, month DESC LIMIT 1",
                params![ticker.to_uppercase()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(latest)
    }

    /// Delete a ticker's monthly rows. Returns the number removed.
    pub fn clear_ticker(&self, ticker: &str) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM monthly_prices WHERE ticker = ?1",
            params![ticker.to_uppercase()],
        )?;
        Ok(removed)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<MonthlyPriceRecord> {
    Ok(MonthlyPriceRecord {
        ticker: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        open_first: row.get(3)?,
        close_last: row.get(4)?,
        close_max: row.get(5)?,
        high_max: row.get(6)?,
        low_min: row.get(7)?,
        volume_total: row.get::<_, Option<i64>>(8)?.map(|v| v.max(0) as u64),
        trading_days: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(ticker: &str, year: i32, month: u32, close: f64) -> MonthlyPriceObservation {
        MonthlyPriceObservation::new(ticker, year, month)
            .with_open_first(close - 1.0)
            .with_close_last(close)
            .with_close_max(close + 1.0)
    }

    #[test]
    fn test_empty_store_stats() {
        let store = MonthlyPriceStore::in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats, StoreStats::default());
    }

    #[test]
    fn test_put_and_load_monthly_prices() {
        let store = MonthlyPriceStore::in_memory().unwrap();
        let rows = vec![
            obs("AAPL", 2019, 12, 70.0),
            obs("AAPL", 2020, 1, 75.0),
            obs("MSFT", 2020, 1, 160.0),
        ];
        assert_eq!(store.put_monthly_prices(&rows).unwrap(), 3);

        let all = store.load_monthly_prices(2000).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].ticker.as_deref(), Some("AAPL"));
        assert_eq!(all[0].close_last, Some(70.0));

        let recent = store.load_monthly_prices(2020).unwrap();
        assert_eq!(recent.len(), 2);

        let msft = store.load_for_tickers(&["msft".to_string()], 2000).unwrap();
        assert_eq!(msft.len(), 1);
        assert_eq!(msft[0].close_max, Some(161.0));
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let store = MonthlyPriceStore::in_memory().unwrap();
        store.put_monthly_prices(&[obs("SPY", 2021, 5, 400.0)]).unwrap();
        store.put_monthly_prices(&[obs("SPY", 2021, 5, 410.0)]).unwrap();

        let rows = store.load_monthly_prices(2021).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close_last, Some(410.0));
    }

    #[test]
    fn test_stats_and_latest_month() {
        let store = MonthlyPriceStore::in_memory().unwrap();
        store
            .put_monthly_prices(&[
                obs("AAPL", 2018, 3, 40.0),
                obs("AAPL", 2022, 11, 150.0),
                obs("DIA", 2020, 6, 260.0),
            ])
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.unique_tickers, 2);
        assert_eq!(stats.min_year, Some(2018));
        assert_eq!(stats.max_year, Some(2022));

        assert_eq!(store.latest_month("aapl").unwrap(), Some((2022, 11)));
        assert_eq!(store.latest_month("NVDA").unwrap(), None);
    }

    #[test]
    fn test_stocks_by_tier() {
        let store = MonthlyPriceStore::in_memory().unwrap();
        store.put_stock("spy", Some("SPDR S&P 500"), 0).unwrap();
        store.put_stock("TSLA", None, 1).unwrap();
        store.put_stock("AAPL", None, 1).unwrap();

        assert_eq!(store.tickers_by_tier(1).unwrap(), vec!["AAPL", "TSLA"]);
        assert_eq!(store.tickers_by_tier(0).unwrap(), vec!["SPY"]);

        let spy = store.get_stock("SPY").unwrap().unwrap();
        assert_eq!(spy.name.as_deref(), Some("SPDR S&P 500"));
        assert_eq!(spy.tier, 0);
    }

    #[test]
    fn test_clear_ticker() {
        let store = MonthlyPriceStore::in_memory().unwrap();
        store
            .put_monthly_prices(&[obs("AAPL", 2020, 1, 1.0), obs("AAPL", 2020, 2, 2.0)])
            .unwrap();
        assert_eq!(store.clear_ticker("AAPL").unwrap(), 2);
        assert!(store.load_monthly_prices(2000).unwrap().is_empty());
    }

    #[test]
    fn test_load_index() {
        let store = MonthlyPriceStore::in_memory().unwrap();
        store
            .put_monthly_prices(&[obs("AAPL", 2020, 1, 1.0), obs("MSFT", 2020, 1, 2.0)])
            .unwrap();
        let index = store.load_index(2000).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.get("MSFT").and_then(|s| s.price_at(2020, 1)).is_some());
    }
}
