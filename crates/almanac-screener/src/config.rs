//! Screener configuration and string parameter conversion.

use crate::error::{Result, ScreenerError};
use almanac_returns::CalcMethod;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Benchmark tickers: broad market and industrial average.
pub const DEFAULT_BENCHMARKS: [&str; 2] = ["SPY", "DIA"];

/// Short English month names, January first.
pub const DEFAULT_MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Longest holding period accepted, in months.
pub const MAX_HOLDING_PERIOD: u32 = 120;

/// Longest lookback accepted, in years.
pub const MAX_LOOKBACK_YEARS: u32 = 200;

/// Screener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenerConfig {
    /// Holding periods to evaluate, in months
    pub holding_periods: Vec<u32>,
    /// Pricing convention
    pub calc_method: CalcMethod,
    /// Minimum win rate in percent
    pub min_win_rate_pct: f64,
    /// Minimum average per-month return in percent
    pub min_avg_per_month_pct: f64,
    /// Minimum number of distinct entry years
    pub min_sample_years: usize,
    /// Maximum number of rows returned
    pub result_limit: usize,
    /// Years of history considered, counted back from the current year
    pub lookback_years: u32,
    /// Benchmark tickers pooled for alpha
    pub benchmarks: Vec<String>,
    /// Twelve month labels, January first
    pub month_labels: Vec<String>,
    /// Overrides the calendar year the lookback window counts back from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_year: Option<i32>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            holding_periods: vec![3, 6],
            calc_method: CalcMethod::OpenToClose,
            min_win_rate_pct: 0.0,
            min_avg_per_month_pct: 0.0,
            min_sample_years: 0,
            result_limit: 100,
            lookback_years: 10,
            benchmarks: DEFAULT_BENCHMARKS.iter().map(ToString::to_string).collect(),
            month_labels: DEFAULT_MONTH_LABELS.iter().map(ToString::to_string).collect(),
            current_year: None,
        }
    }
}

impl ScreenerConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ScreenerError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the screener cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.holding_periods.is_empty() {
            return Err(invalid("at least one holding period is required"));
        }
        if self.holding_periods.contains(&0) {
            return Err(invalid("holding periods must be positive"));
        }
        if let Some(p) = self.holding_periods.iter().find(|&&p| p > MAX_HOLDING_PERIOD) {
            return Err(invalid(format!(
                "holding period {p} exceeds {MAX_HOLDING_PERIOD} months"
            )));
        }
        if self.lookback_years > MAX_LOOKBACK_YEARS {
            return Err(invalid(format!(
                "lookback of {} years exceeds {MAX_LOOKBACK_YEARS}",
                self.lookback_years
            )));
        }
        if self.result_limit == 0 {
            return Err(invalid("result limit must be positive"));
        }
        if !self.min_win_rate_pct.is_finite() || !self.min_avg_per_month_pct.is_finite() {
            return Err(invalid("minimum thresholds must be finite"));
        }
        if self.month_labels.len() != 12 {
            return Err(invalid(format!(
                "expected 12 month labels, got {}",
                self.month_labels.len()
            )));
        }
        Ok(())
    }

    /// Year the lookback window counts back from.
    pub fn effective_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Utc::now().year())
    }

    /// Oldest year included: `current year - lookback - 1`.
    pub fn min_year(&self) -> i32 {
        let lookback = i32::try_from(self.lookback_years).unwrap_or(i32::MAX);
        self.effective_year()
            .saturating_sub(lookback)
            .saturating_sub(1)
    }

    /// Label for `month` (1-12), empty when out of range.
    pub fn month_label(&self, month: u32) -> &str {
        (month as usize)
            .checked_sub(1)
            .and_then(|i| self.month_labels.get(i))
            .map_or("", String::as_str)
    }

    /// Holding periods sorted ascending without duplicates.
    pub fn distinct_holding_periods(&self) -> Vec<u32> {
        let mut periods = self.holding_periods.clone();
        periods.sort_unstable();
        periods.dedup();
        periods
    }

    /// Uppercased benchmark tickers.
    pub fn benchmark_tickers(&self) -> Vec<String> {
        self.benchmarks
            .iter()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn invalid(msg: impl Into<String>) -> ScreenerError {
    ScreenerError::InvalidConfiguration(msg.into())
}

/// Loosely-typed screener parameters, as received from a query string.
///
/// Absent or blank values take the [`ScreenerConfig`] default; present values
/// that do not parse are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerParams {
    /// Comma-separated holding periods, e.g. `"3,6"`
    pub periods: Option<String>,
    /// `openToClose` or `maxToMax`
    pub calc_method: Option<String>,
    /// Minimum win rate in percent
    pub min_win_rate: Option<String>,
    /// Minimum average per-month return in percent
    pub min_avg_per_month: Option<String>,
    /// Minimum distinct entry years
    pub min_sample_years: Option<String>,
    /// Maximum rows returned
    pub limit: Option<String>,
    /// Years of history
    pub lookback_years: Option<String>,
    /// Comma-separated benchmark tickers
    pub benchmarks: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_field<T>(name: &str, value: Option<&String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    present(value).map_or(Ok(default), |raw| {
        raw.parse()
            .map_err(|e| invalid(format!("{name}: cannot parse {raw:?}: {e}")))
    })
}

fn parse_periods(raw: &str) -> Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.parse::<i64>() {
            Ok(n) if n > 0 => {
                u32::try_from(n).map_err(|_| invalid(format!("periods: {p} is too large")))
            }
            Ok(n) => Err(invalid(format!("periods: {n} is not positive"))),
            Err(e) => Err(invalid(format!("periods: cannot parse {p:?}: {e}"))),
        })
        .collect()
}

impl TryFrom<ScreenerParams> for ScreenerConfig {
    type Error = ScreenerError;

    fn try_from(params: ScreenerParams) -> Result<Self> {
        let defaults = Self::default();

        let holding_periods = match present(params.periods.as_ref()) {
            Some(raw) => parse_periods(raw)?,
            None => defaults.holding_periods,
        };
        let calc_method = match present(params.calc_method.as_ref()) {
            Some(raw) => raw.parse::<CalcMethod>()?,
            None => defaults.calc_method,
        };
        let benchmarks = match present(params.benchmarks.as_ref()) {
            Some(raw) => raw
                .split(',')
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
            None => defaults.benchmarks,
        };

        let config = Self {
            holding_periods,
            calc_method,
            min_win_rate_pct: parse_field(
                "minWinRate",
                params.min_win_rate.as_ref(),
                defaults.min_win_rate_pct,
            )?,
            min_avg_per_month_pct: parse_field(
                "minAvgPerMonth",
                params.min_avg_per_month.as_ref(),
                defaults.min_avg_per_month_pct,
            )?,
            min_sample_years: parse_field(
                "minSampleYears",
                params.min_sample_years.as_ref(),
                defaults.min_sample_years,
            )?,
            result_limit: parse_field("limit", params.limit.as_ref(), defaults.result_limit)?,
            lookback_years: parse_field(
                "lookbackYears",
                params.lookback_years.as_ref(),
                defaults.lookback_years,
            )?,
            benchmarks,
            month_labels: defaults.month_labels,
            current_year: None,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = ScreenerConfig::default();
        assert_eq!(config.holding_periods, vec![3, 6]);
        assert_eq!(config.calc_method, CalcMethod::OpenToClose);
        assert_eq!(config.result_limit, 100);
        assert_eq!(config.lookback_years, 10);
        assert_eq!(config.benchmarks, vec!["SPY", "DIA"]);
        assert_eq!(config.month_label(1), "Jan");
        assert_eq!(config.month_label(12), "Dec");
        assert_eq!(config.month_label(13), "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_year_window() {
        let config = ScreenerConfig {
            current_year: Some(2025),
            ..Default::default()
        };
        assert_eq!(config.min_year(), 2014);
    }

    #[test]
    fn test_min_year_saturates_for_huge_lookback() {
        let config = ScreenerConfig {
            current_year: Some(2025),
            lookback_years: u32::MAX,
            ..Default::default()
        };
        assert_eq!(config.min_year(), 2024 - i32::MAX);
        let earliest = ScreenerConfig {
            current_year: Some(i32::MIN + 1),
            lookback_years: 5,
            ..Default::default()
        };
        assert_eq!(earliest.min_year(), i32::MIN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_period_and_lookback_bounds() {
        let longest = ScreenerConfig {
            holding_periods: vec![MAX_HOLDING_PERIOD],
            lookback_years: MAX_LOOKBACK_YEARS,
            ..Default::default()
        };
        assert!(longest.validate().is_ok());

        let too_long = ScreenerConfig {
            holding_periods: vec![3, MAX_HOLDING_PERIOD + 1],
            ..Default::default()
        };
        assert!(matches!(
            too_long.validate(),
            Err(ScreenerError::InvalidConfiguration(_))
        ));
    }

    #[rstest]
    #[case::no_periods(ScreenerConfig { holding_periods: vec![], ..Default::default() })]
    #[case::zero_period(ScreenerConfig { holding_periods: vec![3, 0], ..Default::default() })]
    #[case::zero_limit(ScreenerConfig { result_limit: 0, ..Default::default() })]
    #[case::nan_threshold(ScreenerConfig { min_win_rate_pct: f64::NAN, ..Default::default() })]
    #[case::short_labels(ScreenerConfig { month_labels: vec!["Jan".into()], ..Default::default() })]
    fn test_invalid_configs(#[case] config: ScreenerConfig) {
        assert!(matches!(
            config.validate(),
            Err(ScreenerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            ScreenerConfig::from_json(r#"{"holdingPeriods":[1],"calcMethod":"maxToMax"}"#).unwrap();
        assert_eq!(config.holding_periods, vec![1]);
        assert_eq!(config.calc_method, CalcMethod::MaxToMax);
        assert_eq!(config.result_limit, 100);
    }

    #[test]
    fn test_params_absent_take_defaults() {
        let config = ScreenerConfig::try_from(ScreenerParams::default()).unwrap();
        assert_eq!(config, ScreenerConfig::default());

        let blank = ScreenerParams {
            periods: Some("  ".into()),
            limit: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(ScreenerConfig::try_from(blank).unwrap(), ScreenerConfig::default());
    }

    #[test]
    fn test_params_parsed() {
        let params = ScreenerParams {
            periods: Some("1, 2,12".into()),
            calc_method: Some("max_to_max".into()),
            min_win_rate: Some("60".into()),
            min_avg_per_month: Some("0.3".into()),
            min_sample_years: Some("5".into()),
            limit: Some("25".into()),
            lookback_years: Some("15".into()),
            benchmarks: Some("spy, qqq".into()),
        };
        let config = ScreenerConfig::try_from(params).unwrap();
        assert_eq!(config.holding_periods, vec![1, 2, 12]);
        assert_eq!(config.calc_method, CalcMethod::MaxToMax);
        assert_eq!(config.min_win_rate_pct, 60.0);
        assert_eq!(config.min_avg_per_month_pct, 0.3);
        assert_eq!(config.min_sample_years, 5);
        assert_eq!(config.result_limit, 25);
        assert_eq!(config.lookback_years, 15);
        assert_eq!(config.benchmarks, vec!["SPY", "QQQ"]);
    }

    #[rstest]
    #[case::negative_period(ScreenerParams { periods: Some("3,-1".into()), ..Default::default() })]
    #[case::zero_period(ScreenerParams { periods: Some("0".into()), ..Default::default() })]
    #[case::huge_period(ScreenerParams {
        periods: Some("4294967295".into()),
        ..Default::default()
    })]
    #[case::huge_lookback(ScreenerParams {
        lookback_years: Some("4294967295".into()),
        ..Default::default()
    })]
    #[case::text_period(ScreenerParams { periods: Some("three".into()), ..Default::default() })]
    #[case::unknown_method(ScreenerParams {
        calc_method: Some("closeToClose".into()),
        ..Default::default()
    })]
    #[case::bad_win_rate(ScreenerParams { min_win_rate: Some("high".into()), ..Default::default() })]
    #[case::zero_limit(ScreenerParams { limit: Some("0".into()), ..Default::default() })]
    #[case::negative_limit(ScreenerParams { limit: Some("-5".into()), ..Default::default() })]
    fn test_params_rejected(#[case] params: ScreenerParams) {
        assert!(matches!(
            ScreenerConfig::try_from(params),
            Err(ScreenerError::InvalidConfiguration(_))
        ));
    }
}
