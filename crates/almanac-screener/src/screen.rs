//! Universe-wide screening and ranking.

use crate::config::ScreenerConfig;
use crate::error::{Result, ScreenerError};
use crate::result::{ScreenerOutput, ScreenerResult};
use almanac_data::{PriceIndex, PriceSeries};
use almanac_returns::{
    BenchmarkMap, SeasonKey, aggregate, compute_benchmark_aggregates, compute_returns,
    returns_by_entry_month,
};
use rayon::prelude::*;
use std::{
    cmp::Ordering,
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering as AtomicOrdering},
    },
};

/// Seasonality screener.
///
/// Stateless between runs: each [`Screener::screen`] call recomputes the
/// benchmark map and every ticker's statistics from the given prices.
#[derive(Debug, Clone)]
pub struct Screener {
    config: ScreenerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Screener {
    /// Create a screener after validating `config`.
    pub fn new(config: ScreenerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Create a screener with the default configuration.
    pub fn try_default() -> Result<Self> {
        Self::new(ScreenerConfig::default())
    }

    /// Abort a run once `flag` is set; checked before each ticker.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Active configuration.
    pub const fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(AtomicOrdering::Relaxed))
    }

    /// Screen `universe` against `prices`.
    ///
    /// Prices are restricted to the lookback window first. Benchmark tickers
    /// are excluded from the universe and tickers are matched
    /// case-insensitively.
    pub fn screen(&self, universe: &[String], prices: &PriceIndex) -> Result<ScreenerOutput> {
        let config = &self.config;
        let min_year = config.min_year();
        let prices = prices.since_year(min_year);
        let periods = config.distinct_holding_periods();
        let benchmark_tickers = config.benchmark_tickers();

        let benchmarks = compute_benchmark_aggregates(
            &prices,
            &periods,
            config.calc_method,
            &benchmark_tickers,
        )?;

        let excluded: BTreeSet<&str> = benchmark_tickers.iter().map(String::as_str).collect();
        let tickers: Vec<String> = universe
            .iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty() && !excluded.contains(t.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let total_tickers = tickers.iter().filter(|t| prices.contains(t)).count();

        let per_ticker = tickers
            .par_iter()
            .map(|ticker| {
                if self.is_cancelled() {
                    return Err(ScreenerError::Cancelled);
                }
                prices.get(ticker).map_or(Ok(Vec::new()), |series| {
                    self.screen_series(series, &periods, &benchmarks)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let candidates: Vec<ScreenerResult> = per_ticker.into_iter().flatten().collect();
        let candidate_count = candidates.len();
        let output = rank(candidates, config, total_tickers);

        tracing::info!(
            tickers = total_tickers,
            candidates = candidate_count,
            matched = output.total_matched,
            returned = output.results.len(),
            min_year,
            "screening complete"
        );
        Ok(output)
    }

    /// Every non-empty (month, holding period) group of one ticker.
    fn screen_series(
        &self,
        series: &PriceSeries,
        periods: &[u32],
        benchmarks: &BenchmarkMap,
    ) -> Result<Vec<ScreenerResult>> {
        let method = self.config.calc_method;
        let mut rows = Vec::new();

        for &holding_period in periods {
            let returns = compute_returns(series, holding_period, method)?;
            for (month, month_returns) in (1u32..).zip(returns_by_entry_month(&returns)) {
                if month_returns.is_empty() {
                    continue;
                }
                let benchmark = benchmarks.get(&SeasonKey::new(month, holding_period)).cloned();
                let stats = aggregate(&month_returns, holding_period, method)?
                    .with_benchmark(benchmark.as_ref());
                rows.push(ScreenerResult {
                    ticker: series.ticker().to_string(),
                    month,
                    month_name: self.config.month_label(month).to_string(),
                    holding_period,
                    stats,
                    benchmark,
                });
            }
        }

        Ok(rows)
    }
}

/// Screen with a one-off configuration.
pub fn screen(
    universe: &[String],
    prices: &PriceIndex,
    config: &ScreenerConfig,
) -> Result<ScreenerOutput> {
    Screener::new(config.clone())?.screen(universe, prices)
}

/// Descending by per-month return, then ticker, month and holding period.
fn compare(a: &ScreenerResult, b: &ScreenerResult) -> Ordering {
    b.avg_per_month_pct()
        .total_cmp(&a.avg_per_month_pct())
        .then_with(|| a.ticker.cmp(&b.ticker))
        .then_with(|| a.month.cmp(&b.month))
        .then_with(|| a.holding_period.cmp(&b.holding_period))
}

/// Filter by the configured minimums, sort and truncate.
fn rank(
    candidates: Vec<ScreenerResult>,
    config: &ScreenerConfig,
    total_tickers: usize,
) -> ScreenerOutput {
    let mut results: Vec<ScreenerResult> = candidates
        .into_iter()
        .filter(|r| {
            r.stats.win_rate_pct >= config.min_win_rate_pct
                && r.stats.avg_per_month_pct >= config.min_avg_per_month_pct
                && r.stats.sample_years >= config.min_sample_years
        })
        .collect();

    let total_matched = results.len();
    results.sort_by(compare);
    results.truncate(config.result_limit);

    ScreenerOutput {
        results,
        total_matched,
        total_tickers,
    }
}
