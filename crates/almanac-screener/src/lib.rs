#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/almanac/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod result;
pub mod screen;

pub use config::{
    DEFAULT_BENCHMARKS, DEFAULT_MONTH_LABELS, MAX_HOLDING_PERIOD, MAX_LOOKBACK_YEARS,
    ScreenerConfig, ScreenerParams,
};
pub use error::{Result, ScreenerError};
pub use result::{ScreenerOutput, ScreenerResult};
pub use screen::{Screener, screen};
