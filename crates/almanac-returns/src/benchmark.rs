//! Pooled benchmark statistics keyed by entry month and holding period.

use crate::aggregate::{MonthlyAggregate, aggregate};
use crate::calculator::{ReturnObservation, compute_returns, returns_by_entry_month};
use crate::error::Result;
use crate::method::CalcMethod;
use almanac_data::PriceIndex;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Composite key of an entry month and a holding period.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display("month {month}, {holding_period}m")]
#[serde(rename_all = "camelCase")]
pub struct SeasonKey {
    /// Entry month (1-12)
    pub month: u32,
    /// Holding period in months
    pub holding_period: u32,
}

impl SeasonKey {
    /// Create a key.
    pub const fn new(month: u32, holding_period: u32) -> Self {
        Self {
            month,
            holding_period,
        }
    }
}

/// Statistics over the pooled returns of every benchmark ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkAggregate {
    /// Mean return in percent
    pub avg_return_pct: f64,
    /// Mean return divided by the actual holding months
    pub avg_per_month_pct: f64,
    /// Share of strictly positive returns, whole percent
    pub win_rate_pct: f64,
    /// Number of distinct entry years
    pub sample_years: usize,
    /// Smallest return
    pub min_return_pct: f64,
    /// Largest return
    pub max_return_pct: f64,
}

impl From<MonthlyAggregate> for BenchmarkAggregate {
    fn from(agg: MonthlyAggregate) -> Self {
        Self {
            avg_return_pct: agg.avg_return_pct,
            avg_per_month_pct: agg.avg_per_month_pct,
            win_rate_pct: agg.win_rate_pct,
            sample_years: agg.sample_years,
            min_return_pct: agg.min_return_pct,
            max_return_pct: agg.max_return_pct,
        }
    }
}

/// Benchmark statistics by [`SeasonKey`]. Keys without data are absent.
pub type BenchmarkMap = HashMap<SeasonKey, BenchmarkAggregate>;

/// Pool the returns of all `benchmark_tickers` per (entry month, holding period)
/// and aggregate each non-empty pool.
///
/// Returns are pooled flat: a year with two benchmark tickers contributes two
/// values to the mean. Tickers absent from `index` are ignored.
pub fn compute_benchmark_aggregates(
    index: &PriceIndex,
    holding_periods: &[u32],
    method: CalcMethod,
    benchmark_tickers: &[String],
) -> Result<BenchmarkMap> {
    let mut map = BenchmarkMap::new();

    for &holding_period in holding_periods {
        let mut pooled: [Vec<ReturnObservation>; 12] = std::array::from_fn(|_| Vec::new());

        for ticker in benchmark_tickers {
            let Some(series) = index.get(ticker) else {
                tracing::debug!(ticker = %ticker, "benchmark ticker has no price data");
                continue;
            };
            let returns = compute_returns(series, holding_period, method)?;
            for (pool, month_returns) in pooled.iter_mut().zip(returns_by_entry_month(&returns)) {
                pool.extend(month_returns);
            }
        }

        for (month, pool) in (1u32..).zip(pooled.iter()) {
            if pool.is_empty() {
                continue;
            }
            let agg = aggregate(pool, holding_period, method)?;
            map.insert(SeasonKey::new(month, holding_period), agg.into());
        }
    }

    tracing::debug!(keys = map.len(), "computed benchmark aggregates");
    Ok(map)
}
