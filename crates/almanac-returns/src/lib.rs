#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/almanac/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod benchmark;
pub mod calculator;
pub mod error;
pub mod method;
pub mod outlier;
pub mod profile;

// Re-export main types
pub use aggregate::{MonthlyAggregate, aggregate, alpha_pct, round_to};
pub use benchmark::{BenchmarkAggregate, BenchmarkMap, SeasonKey, compute_benchmark_aggregates};
pub use calculator::{ReturnObservation, compute_returns, returns_by_entry_month};
pub use error::{Result, ReturnsError};
pub use method::CalcMethod;
pub use outlier::{FlaggedReturn, OutlierBounds, detect_bounds, flag_outliers};
pub use profile::{MonthSummary, SeasonalityProfile, build_profile};
