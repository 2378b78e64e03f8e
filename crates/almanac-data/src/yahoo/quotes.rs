//! Daily quote fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::observation::MonthlyPriceObservation;
use crate::rollup;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Default pause after each request.
    pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(500);

    /// Create a provider with the default rate limit.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Self::DEFAULT_RATE_LIMIT)
    }

    /// Create a provider that pauses `rate_limit_delay` after each request.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch daily OHLCV quotes for one symbol.
    ///
    /// Returns a DataFrame with columns: symbol, date, open, high, low, close,
    /// volume, adjusted_close.
    pub async fn fetch_daily(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        let symbol = normalize_symbol(symbol)?;
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history(&symbol, start_time, end_time)
            .await?;
        let quotes = response.quotes()?;

        sleep(self.rate_limit_delay).await;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol,
                reason: "no quotes returned".to_string(),
            });
        }

        let timestamps: Vec<i64> = quotes.iter().map(|q| q.timestamp).collect();
        let opens: Vec<f64> = quotes.iter().map(|q| q.open).collect();
        let highs: Vec<f64> = quotes.iter().map(|q| q.high).collect();
        let lows: Vec<f64> = quotes.iter().map(|q| q.low).collect();
        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let volumes: Vec<u64> = quotes.iter().map(|q| q.volume).collect();
        let adj_closes: Vec<f64> = quotes.iter().map(|q| q.adjclose).collect();
        let symbols = vec![symbol.as_str(); quotes.len()];

        let df = DataFrame::new(vec![
            Series::new("symbol".into(), symbols).into(),
            Series::new("timestamp".into(), timestamps).into(),
            Series::new("open".into(), opens).into(),
            Series::new("high".into(), highs).into(),
            Series::new("low".into(), lows).into(),
            Series::new("close".into(), closes).into(),
            Series::new("volume".into(), volumes).into(),
            Series::new("adjusted_close".into(), adj_closes).into(),
        ])?;

        let df = df
            .lazy()
            .with_column(
                (col("timestamp") * lit(1_000_000_000i64))
                    .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                    .cast(DataType::Date)
                    .alias("date"),
            )
            .select([
                col("symbol"),
                col("date"),
                col("open"),
                col("high"),
                col("low"),
                col("close"),
                col("volume"),
                col("adjusted_close"),
            ])
            .collect()?;

        tracing::debug!(symbol = %symbol, rows = df.height(), "fetched daily quotes");
        Ok(df)
    }

    /// Fetch daily quotes and roll them up to monthly observations.
    pub async fn fetch_monthly(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MonthlyPriceObservation>> {
        let daily = self.fetch_daily(symbol, start, end).await?;
        rollup::monthly_observations(&daily)
    }
}

/// Trim and uppercase a ticker, rejecting empty or whitespace-containing input.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(DataError::InvalidSymbol("empty symbol".to_string()));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(DataError::InvalidSymbol(symbol.to_string()));
    }
    Ok(symbol.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" brk-b ").unwrap(), "BRK-B");
        assert!(matches!(normalize_symbol(""), Err(DataError::InvalidSymbol(_))));
        assert!(matches!(normalize_symbol("A B"), Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    async fn test_invalid_date_range() {
        let provider = YahooQuoteProvider::with_rate_limit(Duration::ZERO).unwrap();
        let start = Utc::now();
        let end = start - ChronoDuration::days(30);

        let result = provider.fetch_daily("AAPL", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidDateRange { .. })));
    }

    #[tokio::test]
    async fn test_invalid_symbol() {
        let provider = YahooQuoteProvider::with_rate_limit(Duration::ZERO).unwrap();
        let end = Utc::now();
        let start = end - ChronoDuration::days(30);

        let result = provider.fetch_daily("", start, end).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_fetch_monthly() {
        let provider = YahooQuoteProvider::new().unwrap();
        let end = Utc::now();
        let start = end - ChronoDuration::days(120);

        let rows = provider.fetch_monthly("AAPL", start, end).await.unwrap();
        assert!(rows.len() >= 3);
        assert!(rows.iter().all(|r| r.ticker == "AAPL"));
    }
}
