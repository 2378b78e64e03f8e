//! Daily-to-monthly rollup.
//!
//! Aggregates daily OHLCV quotes into one row per `(symbol, year, month)`:
//!
//! | column         | aggregation              |
//! |----------------|--------------------------|
//! | `open_first`   | first open of the month  |
//! | `high_max`     | max high                 |
//! | `low_min`      | min low                  |
//! | `close_max`    | max close                |
//! | `close_last`   | last close               |
//! | `volume_total` | summed volume            |
//! | `trading_days` | number of daily rows     |
//!
//! When an `adjusted_close` column is present, OHLC prices are first scaled by
//! `adjusted_close / close` so monthly values are split-adjusted.

use crate::error::Result;
use crate::observation::MonthlyPriceObservation;
use polars::prelude::*;

/// Aggregate daily quotes into a monthly DataFrame.
///
/// Expects columns `symbol`, `date`, `open`, `high`, `low`, `close`, `volume`
/// and optionally `adjusted_close`. The `date` column may be a date or an
/// ISO-8601 string.
///
/// Returns a DataFrame with columns: symbol, year, month, open_first, high_max,
/// low_min, close_max, close_last, volume_total, trading_days.
pub fn monthly_rollup(daily: &DataFrame) -> Result<DataFrame> {
    let has_adjusted = daily
        .get_column_names()
        .iter()
        .any(|s| s.as_str() == "adjusted_close");

    let adj_factor = if has_adjusted {
        when(col("close").gt(lit(0.0)))
            .then(col("adjusted_close") / col("close"))
            .otherwise(lit(1.0))
    } else {
        lit(1.0)
    };

    let monthly = daily
        .clone()
        .lazy()
        .with_columns([
            col("date").cast(DataType::Date),
            adj_factor.alias("adj_factor"),
        ])
        .with_columns([
            (col("open") * col("adj_factor")).alias("open"),
            (col("high") * col("adj_factor")).alias("high"),
            (col("low") * col("adj_factor")).alias("low"),
            (col("close") * col("adj_factor")).alias("close"),
            col("date").dt().year().alias("year"),
            col("date").dt().month().cast(DataType::Int32).alias("month"),
        ])
        .sort(["symbol", "date"], SortMultipleOptions::default())
        .group_by_stable([col("symbol"), col("year"), col("month")])
        .agg([
            col("open").first().alias("open_first"),
            col("high").max().alias("high_max"),
            col("low").min().alias("low_min"),
            col("close").max().alias("close_max"),
            col("close").last().alias("close_last"),
            col("volume").cast(DataType::Int64).sum().alias("volume_total"),
            col("date").count().cast(DataType::Int64).alias("trading_days"),
        ])
        .sort(["symbol", "year", "month"], SortMultipleOptions::default())
        .collect()?;

    Ok(monthly)
}

/// Convert a monthly DataFrame produced by [`monthly_rollup`] into observations.
pub fn to_observations(monthly: &DataFrame) -> Result<Vec<MonthlyPriceObservation>> {
    let symbols = monthly.column("symbol")?.str()?;
    let years = monthly.column("year")?.i32()?;
    let months = monthly.column("month")?.i32()?;
    let open_first = monthly.column("open_first")?.f64()?;
    let high_max = monthly.column("high_max")?.f64()?;
    let low_min = monthly.column("low_min")?.f64()?;
    let close_max = monthly.column("close_max")?.f64()?;
    let close_last = monthly.column("close_last")?.f64()?;
    let volume_total = monthly.column("volume_total")?.i64()?;
    let trading_days = monthly.column("trading_days")?.i64()?;

    let mut rows = Vec::with_capacity(monthly.height());
    for i in 0..monthly.height() {
        let (Some(symbol), Some(year), Some(month)) = (symbols.get(i), years.get(i), months.get(i))
        else {
            continue;
        };

        let mut obs = MonthlyPriceObservation::new(symbol, year, month as u32);
        obs.open_first = open_first.get(i);
        obs.high_max = high_max.get(i);
        obs.low_min = low_min.get(i);
        obs.close_max = close_max.get(i);
        obs.close_last = close_last.get(i);
        obs.volume_total = volume_total.get(i).map(|v| v.max(0) as u64);
        obs.trading_days = trading_days.get(i).map(|d| d.max(0) as u32);
        rows.push(obs);
    }

    Ok(rows)
}

/// Roll daily quotes up to monthly observations in one step.
pub fn monthly_observations(daily: &DataFrame) -> Result<Vec<MonthlyPriceObservation>> {
    let monthly = monthly_rollup(daily)?;
    let rows = to_observations(&monthly)?;
    tracing::debug!(
        daily_rows = daily.height(),
        monthly_rows = rows.len(),
        "rolled up daily quotes"
    );
    Ok(rows)
}
