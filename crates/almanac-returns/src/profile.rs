//! Twelve-month seasonality view of a single ticker.

use crate::aggregate::{MonthlyAggregate, aggregate};
use crate::benchmark::{BenchmarkAggregate, BenchmarkMap, SeasonKey};
use crate::calculator::{compute_returns, returns_by_entry_month};
use crate::error::{Result, ReturnsError};
use crate::method::CalcMethod;
use crate::outlier::{FlaggedReturn, OutlierBounds, flag_outliers};
use almanac_data::PriceSeries;
use serde::{Deserialize, Serialize};

/// Statistics for one entry month of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    /// Entry month (1-12)
    pub month: u32,
    /// Ticker statistics with alpha attached, absent when no returns exist
    pub aggregate: Option<MonthlyAggregate>,
    /// Benchmark statistics for the same key
    pub benchmark: Option<BenchmarkAggregate>,
}

/// Per-month statistics and flagged returns for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalityProfile {
    /// Ticker symbol
    pub ticker: String,
    /// Holding period in months
    pub holding_period: u32,
    /// Pricing convention
    pub calc_method: CalcMethod,
    /// Always twelve entries, January first
    pub months: Vec<MonthSummary>,
    /// Month the outlier peer group is restricted to, if any
    pub peer_month: Option<u32>,
    /// Fences of the peer group
    pub bounds: OutlierBounds,
    /// Peer group returns in (year, month) order
    pub returns: Vec<FlaggedReturn>,
}

impl SeasonalityProfile {
    /// Month with the highest average per-month return.
    pub fn best_month(&self) -> Option<&MonthSummary> {
        self.months
            .iter()
            .filter(|m| m.aggregate.is_some())
            .max_by(|a, b| {
                let a = a.aggregate.as_ref().map_or(f64::NEG_INFINITY, |x| x.avg_per_month_pct);
                let b = b.aggregate.as_ref().map_or(f64::NEG_INFINITY, |x| x.avg_per_month_pct);
                a.total_cmp(&b)
            })
    }

    /// Number of flagged returns.
    pub fn outlier_count(&self) -> usize {
        self.returns.iter().filter(|r| r.is_outlier).count()
    }
}

/// Build a ticker's profile for one holding period.
///
/// `peer_month` narrows the outlier peer group to returns entered in that
/// month; `None` evaluates the whole distribution.
pub fn build_profile(
    series: &PriceSeries,
    holding_period: u32,
    method: CalcMethod,
    benchmarks: &BenchmarkMap,
    peer_month: Option<u32>,
) -> Result<SeasonalityProfile> {
    if let Some(month) = peer_month
        && !(1..=12).contains(&month)
    {
        return Err(ReturnsError::InvalidArgument(format!(
            "peer month must be 1-12, got {month}"
        )));
    }

    let returns = compute_returns(series, holding_period, method)?;
    let by_month = returns_by_entry_month(&returns);

    let mut months = Vec::with_capacity(12);
    for (month, month_returns) in (1u32..).zip(by_month.iter()) {
        let benchmark = benchmarks.get(&SeasonKey::new(month, holding_period)).cloned();
        let aggregate = if month_returns.is_empty() {
            None
        } else {
            Some(
                aggregate(month_returns, holding_period, method)?
                    .with_benchmark(benchmark.as_ref()),
            )
        };
        months.push(MonthSummary {
            month,
            aggregate,
            benchmark,
        });
    }

    let peer_group = match peer_month {
        Some(month) => returns
            .iter()
            .filter(|r| r.entry_month == month)
            .copied()
            .collect(),
        None => returns,
    };
    let (bounds, flagged) = flag_outliers(&peer_group);

    Ok(SeasonalityProfile {
        ticker: series.ticker().to_string(),
        holding_period,
        calc_method: method,
        months,
        peer_month,
        bounds,
        returns: flagged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_data::MonthlyPriceObservation;
    use approx::assert_relative_eq;

    /// Five years of March→April gains plus one outsized year.
    fn series() -> PriceSeries {
        let mut rows = Vec::new();
        for (year, exit) in (2015..).zip([102.0, 103.0, 101.0, 102.5, 150.0, 102.0]) {
            rows.push(MonthlyPriceObservation::new("NVDA", year, 3).with_close_max(100.0));
            rows.push(MonthlyPriceObservation::new("NVDA", year, 4).with_close_max(exit));
        }
        PriceSeries::from_rows("NVDA", rows)
    }

    #[test]
    fn test_profile_months_and_alpha() {
        let mut benchmarks = BenchmarkMap::new();
        benchmarks.insert(
            SeasonKey::new(3, 1),
            BenchmarkAggregate {
                avg_return_pct: 1.0,
                avg_per_month_pct: 1.0,
                win_rate_pct: 60.0,
                sample_years: 6,
                min_return_pct: -1.0,
                max_return_pct: 3.0,
            },
        );

        let profile = build_profile(&series(), 1, CalcMethod::MaxToMax, &benchmarks, None).unwrap();
        assert_eq!(profile.months.len(), 12);

        let march = &profile.months[2];
        let agg = march.aggregate.as_ref().unwrap();
        assert_eq!(agg.sample_years, 6);
        // (2 + 3 + 1 + 2.5 + 50 + 2) / 6 = 10.0833
        assert_relative_eq!(agg.avg_per_month_pct, 10.08);
        assert_relative_eq!(agg.alpha_pct.unwrap(), 9.08, epsilon = 1e-9);
        assert!(march.benchmark.is_some());

        assert!(profile.months[0].aggregate.is_none());
        assert_eq!(profile.best_month().map(|m| m.month), Some(3));
    }

    #[test]
    fn test_profile_flags_outlier_year() {
        let profile = build_profile(&series(), 1, CalcMethod::MaxToMax, &BenchmarkMap::new(), Some(3))
            .unwrap();
        assert_eq!(profile.returns.len(), 6);
        assert_eq!(profile.outlier_count(), 1);
        let outlier = profile.returns.iter().find(|r| r.is_outlier).unwrap();
        assert_eq!(outlier.observation.entry_year, 2019);
    }

    #[test]
    fn test_peer_month_without_returns_never_flags() {
        let profile = build_profile(&series(), 1, CalcMethod::MaxToMax, &BenchmarkMap::new(), Some(7))
            .unwrap();
        assert!(profile.returns.is_empty());
        assert!(profile.bounds.is_unbounded());
    }

    #[test]
    fn test_invalid_peer_month() {
        let err = build_profile(&series(), 1, CalcMethod::MaxToMax, &BenchmarkMap::new(), Some(13))
            .unwrap_err();
        assert!(matches!(err, ReturnsError::InvalidArgument(_)));
    }
}
