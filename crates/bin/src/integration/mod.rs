//! Integration between the CLI, the Yahoo quote provider and the monthly price store.
//!
//! This module provides the ingestion pipeline and the default store location.

pub(crate) mod cache_manager;
pub(crate) mod data_pipeline;
