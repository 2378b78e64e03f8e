//! CSV and JSON export of screener results, profiles and validation reports.

use almanac_data::validate::ValidationReport;
use almanac_returns::{CalcMethod, SeasonalityProfile};
use almanac_screener::{DEFAULT_MONTH_LABELS, ScreenerOutput, ScreenerResult};
use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, io::Write, path::Path, str::FromStr};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Serialize `records` as CSV with a header row.
fn to_csv<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn to_json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// Flat CSV row for a screener result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerResultRow {
    /// Ticker symbol.
    pub ticker: String,
    /// Entry month.
    pub month: u32,
    /// Entry month label.
    pub month_name: String,
    /// Holding period in months.
    pub holding_period: u32,
    /// Mean return.
    pub avg_return_pct: f64,
    /// Mean return per held month.
    pub avg_per_month_pct: f64,
    /// Win rate.
    pub win_rate_pct: f64,
    /// Distinct entry years.
    pub sample_years: usize,
    /// Smallest return.
    pub min_return_pct: f64,
    /// Largest return.
    pub max_return_pct: f64,
    /// Benchmark-relative per-month return.
    pub alpha_pct: f64,
    /// Benchmark mean return per held month.
    pub benchmark_avg_per_month_pct: Option<f64>,
    /// Benchmark win rate.
    pub benchmark_win_rate_pct: Option<f64>,
}

impl From<&ScreenerResult> for ScreenerResultRow {
    fn from(r: &ScreenerResult) -> Self {
        Self {
            ticker: r.ticker.clone(),
            month: r.month,
            month_name: r.month_name.clone(),
            holding_period: r.holding_period,
            avg_return_pct: r.stats.avg_return_pct,
            avg_per_month_pct: r.stats.avg_per_month_pct,
            win_rate_pct: r.stats.win_rate_pct,
            sample_years: r.stats.sample_years,
            min_return_pct: r.stats.min_return_pct,
            max_return_pct: r.stats.max_return_pct,
            alpha_pct: r.alpha_pct(),
            benchmark_avg_per_month_pct: r.benchmark.as_ref().map(|b| b.avg_per_month_pct),
            benchmark_win_rate_pct: r.benchmark.as_ref().map(|b| b.win_rate_pct),
        }
    }
}

impl Exporter for Vec<ScreenerResult> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self.iter().map(ScreenerResultRow::from)),
            _ => to_json(self, format),
        }
    }
}

impl Exporter for ScreenerOutput {
    /// CSV carries the result rows only; JSON carries the match counts too.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self.results.iter().map(ScreenerResultRow::from)),
            _ => to_json(self, format),
        }
    }
}

/// Flat CSV row for one month of a seasonality profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileMonthRow {
    /// Ticker symbol.
    pub ticker: String,
    /// Holding period in months.
    pub holding_period: u32,
    /// Pricing convention.
    pub calc_method: CalcMethod,
    /// Entry month.
    pub month: u32,
    /// Entry month label.
    pub month_name: String,
    /// Mean return.
    pub avg_return_pct: Option<f64>,
    /// Mean return per held month.
    pub avg_per_month_pct: Option<f64>,
    /// Win rate.
    pub win_rate_pct: Option<f64>,
    /// Distinct entry years.
    pub sample_years: Option<usize>,
    /// Benchmark-relative per-month return.
    pub alpha_pct: Option<f64>,
    /// Benchmark mean return per held month.
    pub benchmark_avg_per_month_pct: Option<f64>,
}

impl ProfileMonthRow {
    fn rows(profile: &SeasonalityProfile) -> Vec<Self> {
        profile
            .months
            .iter()
            .map(|m| {
                let agg = m.aggregate.as_ref();
                Self {
                    ticker: profile.ticker.clone(),
                    holding_period: profile.holding_period,
                    calc_method: profile.calc_method,
                    month: m.month,
                    month_name: (m.month as usize)
                        .checked_sub(1)
                        .and_then(|i| DEFAULT_MONTH_LABELS.get(i))
                        .map_or_else(String::new, ToString::to_string),
                    avg_return_pct: agg.map(|a| a.avg_return_pct),
                    avg_per_month_pct: agg.map(|a| a.avg_per_month_pct),
                    win_rate_pct: agg.map(|a| a.win_rate_pct),
                    sample_years: agg.map(|a| a.sample_years),
                    alpha_pct: agg.and_then(|a| a.alpha_pct),
                    benchmark_avg_per_month_pct: m.benchmark.as_ref().map(|b| b.avg_per_month_pct),
                }
            })
            .collect()
    }
}

impl Exporter for SeasonalityProfile {
    /// CSV carries the twelve month rows; JSON carries the flagged returns too.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(ProfileMonthRow::rows(self)),
            _ => to_json(self, format),
        }
    }
}

/// Flat CSV row for a validation mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchRow {
    /// Ticker symbol.
    pub ticker: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Stored highest close.
    pub stored: Option<f64>,
    /// Reference highest close.
    pub reference: f64,
    /// Relative difference in percent.
    pub diff_pct: Option<f64>,
}

impl Exporter for ValidationReport {
    /// CSV lists the mismatching months; JSON carries the whole report.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self.mismatches.iter().map(|m| MismatchRow {
                ticker: self.ticker.clone(),
                year: m.key.year,
                month: m.key.month,
                stored: m.stored,
                reference: m.reference,
                diff_pct: m.diff_pct,
            })),
            _ => to_json(self, format),
        }
    }
}
