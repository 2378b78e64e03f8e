#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/almanac/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod observation;
pub mod rollup;
pub mod series;
pub mod store;
pub mod validate;
pub mod yahoo;

pub use error::{DataError, Result};
pub use observation::{MonthlyPriceObservation, MonthlyPriceRecord, YearMonth};
pub use series::{PriceIndex, PriceSeries};
pub use store::{MonthlyPriceStore, StockEntry, StoreStats};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
