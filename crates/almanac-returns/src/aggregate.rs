//! Summary statistics over returns sharing an entry month and holding period.

use crate::benchmark::BenchmarkAggregate;
use crate::calculator::ReturnObservation;
use crate::error::{Result, ReturnsError};
use crate::method::CalcMethod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Round half up to `decimals` places, the way a `Math.round`-style rounding does.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Benchmark-relative per-month return: both sides rounded, then the difference.
pub fn alpha_pct(avg_per_month_pct: f64, benchmark_avg_per_month_pct: f64) -> f64 {
    round_to(
        round_to(avg_per_month_pct, 2) - round_to(benchmark_avg_per_month_pct, 2),
        2,
    )
}

/// Statistics for one (ticker, entry month, holding period) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAggregate {
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
    /// Per-month return relative to the benchmark, once one is attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_pct: Option<f64>,
}

impl MonthlyAggregate {
    /// Set `alpha_pct` against `benchmark`; a missing benchmark yields zero alpha.
    pub fn attach_benchmark(&mut self, benchmark: Option<&BenchmarkAggregate>) {
        let alpha =
            benchmark.map_or(0.0, |b| alpha_pct(self.avg_per_month_pct, b.avg_per_month_pct));
        self.alpha_pct = Some(alpha);
    }

    /// Returns a copy with the benchmark attached.
    pub fn with_benchmark(mut self, benchmark: Option<&BenchmarkAggregate>) -> Self {
        self.attach_benchmark(benchmark);
        self
    }
}

/// Aggregate a non-empty group of returns.
///
/// Percentages are rounded to two decimals and the win rate to a whole percent.
/// A zero return is not a win.
pub fn aggregate(
    returns: &[ReturnObservation],
    holding_period: u32,
    method: CalcMethod,
) -> Result<MonthlyAggregate> {
    if returns.is_empty() {
        return Err(ReturnsError::InvalidArgument(
            "cannot aggregate an empty set of returns".to_string(),
        ));
    }
    if holding_period == 0 {
        return Err(ReturnsError::InvalidArgument(
            "holding period must be positive".to_string(),
        ));
    }

    let n = returns.len() as f64;
    let sum: f64 = returns.iter().map(|r| r.return_pct).sum();
    let wins = returns.iter().filter(|r| r.return_pct > 0.0).count();
    let min = returns
        .iter()
        .map(|r| r.return_pct)
        .fold(f64::INFINITY, f64::min);
    let max = returns
        .iter()
        .map(|r| r.return_pct)
        .fold(f64::NEG_INFINITY, f64::max);
    let sample_years = returns
        .iter()
        .map(|r| r.entry_year)
        .collect::<BTreeSet<_>>()
        .len();

    let avg = sum / n;
    let actual_months = f64::from(method.actual_holding_months(holding_period));

    Ok(MonthlyAggregate {
        avg_return_pct: round_to(avg, 2),
        avg_per_month_pct: round_to(avg / actual_months, 2),
        win_rate_pct: round_to(wins as f64 / n * 100.0, 0),
        sample_years,
        min_return_pct: round_to(min, 2),
        max_return_pct: round_to(max, 2),
        alpha_pct: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn obs(year: i32, return_pct: f64) -> ReturnObservation {
        ReturnObservation {
            entry_year: year,
            entry_month: 1,
            return_pct,
            used_fallback: false,
        }
    }

    #[rstest]
    #[case(1.234, 2, 1.23)]
    #[case(1.236, 2, 1.24)]
    #[case(-1.5, 0, -1.0)]
    #[case(66.666_666, 0, 67.0)]
    #[case(2.5, 0, 3.0)]
    fn test_round_to(#[case] value: f64, #[case] decimals: i32, #[case] expected: f64) {
        assert_relative_eq!(round_to(value, decimals), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_alpha_rounds_before_subtracting() {
        assert_relative_eq!(alpha_pct(1.50, 0.80), 0.70, epsilon = 1e-12);
        assert_relative_eq!(alpha_pct(1.004, 1.006), -0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregate_basic_statistics() {
        let returns = [obs(2018, 12.0), obs(2019, -4.0), obs(2020, 8.0)];
        let agg = aggregate(&returns, 3, CalcMethod::OpenToClose).unwrap();

        assert_relative_eq!(agg.avg_return_pct, 5.33);
        // 5.333... / 4 actual months
        assert_relative_eq!(agg.avg_per_month_pct, 1.33);
        assert_relative_eq!(agg.win_rate_pct, 67.0);
        assert_eq!(agg.sample_years, 3);
        assert_relative_eq!(agg.min_return_pct, -4.0);
        assert_relative_eq!(agg.max_return_pct, 12.0);
        assert_eq!(agg.alpha_pct, None);
    }

    #[test]
    fn test_aggregate_max_to_max_divides_by_holding_period() {
        let returns = [obs(2020, 9.0)];
        let agg = aggregate(&returns, 3, CalcMethod::MaxToMax).unwrap();
        assert_relative_eq!(agg.avg_per_month_pct, 3.0);
    }

    #[test]
    fn test_zero_return_is_not_a_win() {
        let returns = [obs(2019, 0.0), obs(2020, 1.0)];
        let agg = aggregate(&returns, 1, CalcMethod::MaxToMax).unwrap();
        assert_relative_eq!(agg.win_rate_pct, 50.0);
    }

    #[test]
    fn test_sample_years_counts_distinct_years() {
        let returns = [obs(2020, 1.0), obs(2020, 2.0), obs(2021, 3.0)];
        let agg = aggregate(&returns, 1, CalcMethod::MaxToMax).unwrap();
        assert_eq!(agg.sample_years, 2);
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = aggregate(&[], 3, CalcMethod::OpenToClose).unwrap_err();
        assert!(matches!(err, ReturnsError::InvalidArgument(_)));
    }

    #[test]
    fn test_attach_benchmark() {
        let returns = [obs(2020, 6.0)];
        let mut agg = aggregate(&returns, 3, CalcMethod::MaxToMax).unwrap();
        let bench = BenchmarkAggregate {
            avg_return_pct: 2.4,
            avg_per_month_pct: 0.8,
            win_rate_pct: 100.0,
            sample_years: 1,
            min_return_pct: 2.4,
            max_return_pct: 2.4,
        };
        agg.attach_benchmark(Some(&bench));
        assert_relative_eq!(agg.alpha_pct.unwrap(), 1.2, epsilon = 1e-12);

        let agg = agg.with_benchmark(None);
        assert_eq!(agg.alpha_pct, Some(0.0));
    }
}
