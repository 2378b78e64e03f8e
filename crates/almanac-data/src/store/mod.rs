//! Persistent storage for monthly price rows.

mod sqlite;

pub use sqlite::{MonthlyPriceStore, StockEntry, StoreStats};
