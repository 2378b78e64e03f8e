//! Data pipeline for refreshing the monthly price store.
//!
//! Fetches daily quotes from Yahoo Finance with bounded concurrency, rolls them
//! up to monthly observations and upserts them into the SQLite store. Tickers
//! already in the store are refreshed from their latest stored month unless a
//! full refresh is requested.

use almanac::{Tier, WatchlistEntry, WatchlistUniverse};
use almanac_data::{DataError, MonthlyPriceStore, yahoo::YahooQuoteProvider};
use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::path::Path;

/// Error type for data pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DataPipelineError {
    /// Store or fetch error.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    /// Start of the fetch window is not a calendar date.
    #[error("Invalid start date: {year}-{month:02}")]
    InvalidStart {
        /// Year of the window start
        year: i32,
        /// Month of the window start
        month: u32,
    },
    /// Every ticker failed to fetch.
    #[error("No data fetched for any of {0} tickers")]
    NothingFetched(usize),
}

/// Default number of concurrent fetches.
pub(crate) const DEFAULT_CONCURRENCY: usize = 4;

/// Default first year of history.
pub(crate) const DEFAULT_START_YEAR: i32 = 2000;

/// Configuration for data fetching.
#[derive(Debug, Clone)]
pub(crate) struct FetchConfig {
    /// First year fetched for tickers with no stored history.
    pub start_year: i32,
    /// Maximum in-flight requests.
    pub concurrency: usize,
    /// Refetch full history even for tickers already stored.
    pub force_refresh: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            concurrency: DEFAULT_CONCURRENCY,
            force_refresh: false,
        }
    }
}

/// Outcome of a store update.
#[derive(Debug, Default)]
pub(crate) struct UpdateSummary {
    /// Tickers fetched and stored.
    pub updated: usize,
    /// Monthly rows written.
    pub rows_written: usize,
    /// Tickers that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>, DataPipelineError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or(DataPipelineError::InvalidStart { year, month })
}

/// Start of the fetch window for `ticker`.
///
/// The latest stored month is refetched since it may have been stored partial.
fn window_start(
    store: &MonthlyPriceStore,
    ticker: &str,
    config: &FetchConfig,
) -> Result<DateTime<Utc>, DataPipelineError> {
    if !config.force_refresh
        && let Some((year, month)) = store.latest_month(ticker)?
    {
        return month_start(year, month);
    }
    month_start(config.start_year, 1)
}

/// Register `entries` in the store and refresh their monthly prices.
pub(crate) async fn update_store(
    provider: &YahooQuoteProvider,
    store: &MonthlyPriceStore,
    entries: &[WatchlistEntry],
    config: &FetchConfig,
    progress: Option<&ProgressBar>,
) -> Result<UpdateSummary, DataPipelineError> {
    let end = Utc::now();

    let mut jobs = Vec::with_capacity(entries.len());
    for entry in entries {
        store.put_stock(&entry.symbol, entry.name.as_deref(), entry.tier.level())?;
        jobs.push((entry.symbol.clone(), window_start(store, &entry.symbol, config)?));
    }

    if let Some(pb) = progress {
        pb.set_length(jobs.len() as u64);
        pb.set_message(format!(
            "Fetching {} tickers ({} concurrent)...",
            jobs.len(),
            config.concurrency
        ));
    }

    let total = jobs.len();
    let mut summary = UpdateSummary::default();
    let mut fetches = stream::iter(jobs)
        .map(|(ticker, start)| async move {
            let result = provider.fetch_monthly(&ticker, start, end).await;
            (ticker, result)
        })
        .buffer_unordered(config.concurrency.max(1));

    while let Some((ticker, result)) = fetches.next().await {
        match result.and_then(|rows| store.put_monthly_prices(&rows)) {
            Ok(written) => {
                summary.updated += 1;
                summary.rows_written += written;
            }
            Err(e) => {
                let warn =
                    || tracing::warn!(ticker = %ticker, error = %e, "failed to update ticker");
                match progress {
                    Some(pb) => pb.suspend(warn),
                    None => warn(),
                }
                summary.failed.push((ticker, e.to_string()));
            }
        }
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    if total > 0 && summary.updated == 0 {
        return Err(DataPipelineError::NothingFetched(total));
    }

    tracing::info!(
        updated = summary.updated,
        failed = summary.failed.len(),
        rows = summary.rows_written,
        "store update complete"
    );
    Ok(summary)
}

/// Watchlist entries for ad-hoc tickers, tiered from `watchlist` when known.
pub(crate) fn entries_for(
    tickers: &[String],
    watchlist: &WatchlistUniverse,
) -> Vec<WatchlistEntry> {
    tickers
        .iter()
        .map(|t| {
            watchlist
                .entry(t)
                .cloned()
                .unwrap_or_else(|| WatchlistEntry::new(t.as_str(), None, Tier::Extended))
        })
        .collect()
}

/// Print store location and contents.
pub(crate) fn print_store_info(store: &MonthlyPriceStore, path: &Path) {
    println!("  Store location: {}", path.display());
    if let Ok(stats) = store.stats() {
        match (stats.min_year, stats.max_year) {
            (Some(min), Some(max)) => println!(
                "  Stored data: {} monthly rows for {} tickers ({}-{})",
                stats.total_rows, stats.unique_tickers, min, max
            ),
            _ => println!("  Stored data: empty"),
        }
    }
}
