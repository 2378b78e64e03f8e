//! Store location management.
//!
//! Resolves the SQLite monthly price store, defaulting to a platform-specific
//! cache directory.

use almanac_data::{MonthlyPriceStore, Result};
use std::path::{Path, PathBuf};

/// Get the default store directory.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/almanac/`
/// - macOS: `~/Library/Caches/almanac/`
/// - Windows: `%LOCALAPPDATA%\almanac\`
pub(crate) fn default_store_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("almanac")
}

/// Get the default store database path.
pub(crate) fn default_store_path() -> PathBuf {
    default_store_dir().join("almanac.db")
}

/// Store path: `override_path` when given, otherwise the default.
pub(crate) fn store_path(override_path: Option<&Path>) -> PathBuf {
    override_path.map_or_else(default_store_path, Path::to_path_buf)
}

/// Open the store, creating the parent directory if needed.
pub(crate) fn open_store(override_path: Option<&Path>) -> Result<MonthlyPriceStore> {
    let path = store_path(override_path);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    MonthlyPriceStore::new(&path)
}
