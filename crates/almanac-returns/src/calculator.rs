//! Per-entry-month holding period returns.

use crate::error::{Result, ReturnsError};
use crate::method::CalcMethod;
use almanac_data::{MonthlyPriceObservation, PriceSeries};
use serde::{Deserialize, Serialize};

/// Return of a position entered in one month and held for the holding period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnObservation {
    /// Year of the entry month
    pub entry_year: i32,
    /// Entry month (1-12)
    pub entry_month: u32,
    /// Signed return in percent
    pub return_pct: f64,
    /// Entry or exit price fell back to the month's highest close
    pub used_fallback: bool,
}

/// Entry and exit prices under `method`, with whether a fallback was taken.
fn prices(
    method: CalcMethod,
    entry: &MonthlyPriceObservation,
    exit: &MonthlyPriceObservation,
) -> Option<(f64, f64, bool)> {
    match method {
        CalcMethod::OpenToClose => {
            let fallback = entry.open_first.is_none() || exit.close_last.is_none();
            let entry_price = entry.open_first.or(entry.close_max)?;
            let exit_price = exit.close_last.or(exit.close_max)?;
            Some((entry_price, exit_price, fallback))
        }
        CalcMethod::MaxToMax => Some((entry.close_max?, exit.close_max?, false)),
    }
}

/// Compute one return per entry row of `series` that has a matching exit row.
///
/// The exit is the row `holding_period` months after the entry, rolling over
/// year boundaries. Pairs with a missing price or a zero entry price are
/// skipped. Rows are visited in (year, month) order, duplicates included.
pub fn compute_returns(
    series: &PriceSeries,
    holding_period: u32,
    method: CalcMethod,
) -> Result<Vec<ReturnObservation>> {
    if holding_period == 0 {
        return Err(ReturnsError::InvalidArgument(
            "holding period must be positive".to_string(),
        ));
    }

    let returns = series
        .rows()
        .iter()
        .filter_map(|entry| {
            let exit = series.get(entry.key().add_months(holding_period)?)?;
            let (entry_price, exit_price, used_fallback) = prices(method, entry, exit)?;
            if entry_price == 0.0 {
                return None;
            }
            Some(ReturnObservation {
                entry_year: entry.year,
                entry_month: entry.month,
                return_pct: (exit_price - entry_price) / entry_price * 100.0,
                used_fallback,
            })
        })
        .collect();

    Ok(returns)
}

/// Partition returns by entry month; index 0 holds January.
pub fn returns_by_entry_month(returns: &[ReturnObservation]) -> [Vec<ReturnObservation>; 12] {
    let mut months: [Vec<ReturnObservation>; 12] = std::array::from_fn(|_| Vec::new());
    for r in returns {
        if let Some(bucket) = (r.entry_month as usize)
            .checked_sub(1)
            .and_then(|i| months.get_mut(i))
        {
            bucket.push(*r);
        }
    }
    months
}
