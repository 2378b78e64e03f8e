//! Screener result records.

use almanac_returns::{BenchmarkAggregate, MonthlyAggregate};
use serde::{Deserialize, Serialize};

/// One (ticker, entry month, holding period) row that passed the filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerResult {
    /// Ticker symbol
    pub ticker: String,
    /// Entry month (1-12)
    pub month: u32,
    /// Configured label of the entry month
    pub month_name: String,
    /// Holding period in months
    pub holding_period: u32,
    /// Ticker statistics, alpha included
    #[serde(flatten)]
    pub stats: MonthlyAggregate,
    /// Benchmark statistics for the same month and holding period
    pub benchmark: Option<BenchmarkAggregate>,
}

impl ScreenerResult {
    /// Benchmark-relative per-month return; zero when no benchmark was attached.
    pub fn alpha_pct(&self) -> f64 {
        self.stats.alpha_pct.unwrap_or(0.0)
    }

    /// Average per-month return, the ranking key.
    pub const fn avg_per_month_pct(&self) -> f64 {
        self.stats.avg_per_month_pct
    }
}

/// Ranked, truncated screener rows with match counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerOutput {
    /// Rows in rank order, at most the result limit
    pub results: Vec<ScreenerResult>,
    /// Rows passing the filters before truncation
    pub total_matched: usize,
    /// Universe tickers with at least one price row
    pub total_tickers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_flat_camel_case() {
        let result = ScreenerResult {
            ticker: "AAPL".into(),
            month: 10,
            month_name: "Oct".into(),
            holding_period: 3,
            stats: MonthlyAggregate {
                avg_return_pct: 6.0,
                avg_per_month_pct: 1.5,
                win_rate_pct: 80.0,
                sample_years: 10,
                min_return_pct: -3.2,
                max_return_pct: 14.1,
                alpha_pct: Some(0.7),
            },
            benchmark: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["monthName"], "Oct");
        assert_eq!(json["holdingPeriod"], 3);
        assert_eq!(json["avgPerMonthPct"], 1.5);
        assert_eq!(json["alphaPct"], 0.7);
        assert!(json["benchmark"].is_null());

        let output = ScreenerOutput {
            results: vec![result],
            total_matched: 1,
            total_tickers: 1,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["totalMatched"], 1);
        assert_eq!(json["totalTickers"], 1);
    }
}
