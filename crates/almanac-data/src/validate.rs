//! Cross-checking stored `close_max` values against a reference source.

use crate::error::Result;
use crate::observation::YearMonth;
use crate::series::PriceSeries;
use serde::{Deserialize, Serialize};
use std::{fmt, io};

/// Default relative tolerance, in percent.
pub const DEFAULT_TOLERANCE_PCT: f64 = 1.0;

/// Minimum match percentage for a [`ValidationStatus::Pass`].
pub const PASS_THRESHOLD_PCT: f64 = 95.0;

/// A reference monthly maximum close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Calendar year
    pub year: i32,
    /// Calendar month
    pub month: u32,
    /// Reference highest close of the month
    pub close_max: f64,
}

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    /// At least 95 % of overlapping months match
    Pass,
    /// Overlap exists but too many months differ
    Check,
    /// No month present in both sources
    NoOverlap,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pass => "PASS",
            Self::Check => "CHECK",
            Self::NoOverlap => "NO_OVERLAP",
        };
        f.write_str(s)
    }
}

/// A month whose stored value differs from the reference beyond tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mismatch {
    /// Month compared
    pub key: YearMonth,
    /// Stored value (absent when the stored row has no `close_max`)
    pub stored: Option<f64>,
    /// Reference value
    pub reference: f64,
    /// Relative difference in percent of the reference
    pub diff_pct: Option<f64>,
}

/// Result of comparing one ticker against reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Ticker validated
    pub ticker: String,
    /// Months within tolerance
    pub matches: usize,
    /// Months present in both sources
    pub total: usize,
    /// `matches / total * 100`, zero without overlap
    pub match_pct: f64,
    /// Overall status
    pub status: ValidationStatus,
    /// Months outside tolerance, oldest first
    pub mismatches: Vec<Mismatch>,
}

/// Compare a series' `close_max` against reference points.
///
/// A month matches when `|stored - reference| / reference * 100` is strictly
/// below `tolerance_pct`.
pub fn validate_close_max(
    series: &PriceSeries,
    reference: &[ReferencePoint],
    tolerance_pct: f64,
) -> ValidationReport {
    let mut matches = 0;
    let mut total = 0;
    let mut mismatches = Vec::new();

    let mut points = reference.to_vec();
    points.sort_by_key(|p| YearMonth::new(p.year, p.month));

    for point in &points {
        let Some(row) = series.price_at(point.year, point.month) else {
            continue;
        };
        total += 1;

        let diff_pct = row
            .close_max
            .map(|stored| (stored - point.close_max).abs() / point.close_max * 100.0)
            .filter(|d| d.is_finite());
        match diff_pct {
            Some(d) if d < tolerance_pct => matches += 1,
            _ => mismatches.push(Mismatch {
                key: YearMonth::new(point.year, point.month),
                stored: row.close_max,
                reference: point.close_max,
                diff_pct,
            }),
        }
    }

    let (match_pct, status) = if total == 0 {
        (0.0, ValidationStatus::NoOverlap)
    } else {
        let pct = matches as f64 / total as f64 * 100.0;
        let status = if pct >= PASS_THRESHOLD_PCT {
            ValidationStatus::Pass
        } else {
            ValidationStatus::Check
        };
        (pct, status)
    };

    tracing::info!(
        ticker = series.ticker(),
        matches,
        total,
        status = %status,
        "validated close_max against reference"
    );

    ValidationReport {
        ticker: series.ticker().to_string(),
        matches,
        total,
        match_pct,
        status,
        mismatches,
    }
}

/// Read reference points from CSV with header `year,month,close_max`.
pub fn read_reference<R: io::Read>(reader: R) -> Result<Vec<ReferencePoint>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let points = rdr
        .deserialize::<ReferencePoint>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(points)
}
