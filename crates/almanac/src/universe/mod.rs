//! Watchlist universes.
//!
//! Tickers are grouped into tiers: benchmarks, a core list with reference data
//! for validation, and an extended list.

pub mod tier;
pub mod watchlist;

pub use tier::{Tier, TierError};
pub use watchlist::{WatchlistEntry, WatchlistUniverse};

/// Trait for stock universes.
pub trait Universe {
    /// Get all symbols in the universe.
    fn symbols(&self) -> Vec<String>;

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        let symbol = symbol.trim().to_uppercase();
        self.symbols().contains(&symbol)
    }

    /// Get the number of constituents.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

impl Universe for WatchlistUniverse {
    fn symbols(&self) -> Vec<String> {
        self.symbols()
    }

    fn contains(&self, symbol: &str) -> bool {
        self.tier_of(symbol).is_some()
    }
}
