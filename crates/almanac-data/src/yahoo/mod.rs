//! Yahoo Finance ingestion.

pub mod quotes;

pub use quotes::YahooQuoteProvider;
