//! CSV import and export of monthly price rows.
//!
//! The file layout matches the store's `monthly_prices` table: a header row
//! with `ticker,year,month,open_first,close_last,close_max` and, optionally,
//! `high_max,low_min,volume_total,trading_days`. Empty cells are nulls.

use crate::error::Result;
use crate::observation::{MonthlyPriceObservation, MonthlyPriceRecord};
use crate::series::PriceIndex;
use std::{fs::File, io, path::Path};

/// Read every parseable record from CSV input.
///
/// Rows that fail to deserialize (for example a non-numeric year) are skipped
/// and counted in a debug event; structural CSV errors in the header abort.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<MonthlyPriceRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    rdr.headers()?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in rdr.deserialize::<MonthlyPriceRecord>() {
        match row {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped unparseable CSV rows");
    }
    Ok(records)
}

/// Load a CSV file into a [`PriceIndex`], dropping malformed rows.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<PriceIndex> {
    let file = File::open(path.as_ref())?;
    let records = read_records(file)?;
    let index = PriceIndex::from_records(records);
    tracing::info!(
        path = %path.as_ref().display(),
        tickers = index.len(),
        rows = index.row_count(),
        "loaded monthly prices"
    );
    Ok(index)
}

/// Write observations as CSV with a header row.
pub fn write_csv<W: io::Write>(writer: W, rows: &[MonthlyPriceObservation]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(MonthlyPriceRecord::from(row.clone()))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ticker,year,month,open_first,close_last,close_max
aapl,2023,1,100.0,105.0,106.0
AAPL,2023,2,105.5,,108.0
,2023,3,1.0,1.0,1.0
MSFT,abc,1,1.0,1.0,1.0
MSFT,2023,13,1.0,1.0,1.0
MSFT,2023,4,250.0,260.0,262.5
";

    #[test]
    fn test_read_records_skips_unparseable_rows() {
        let records = read_records(SAMPLE.as_bytes()).unwrap();
        // The non-numeric year fails to deserialize
        assert_eq!(records.len(), 5);
        assert_eq!(records[1].close_last, None);
        assert_eq!(records[2].ticker, None);
    }

    #[test]
    fn test_records_into_index_drop_malformed() {
        let index = PriceIndex::from_records(read_records(SAMPLE.as_bytes()).unwrap());
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("AAPL").map(|s| s.len()), Some(2));
        assert_eq!(index.get("MSFT").map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_write_then_read() {
        let rows = vec![
            MonthlyPriceObservation::new("SPY", 2022, 12)
                .with_open_first(380.0)
                .with_close_last(382.4)
                .with_close_max(407.7),
        ];
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("ticker,year,month,open_first,close_last,close_max"));

        let back = read_records(text.as_bytes()).unwrap();
        let obs = MonthlyPriceObservation::try_from(back[0].clone()).unwrap();
        assert_eq!(obs, rows[0]);
    }
}
