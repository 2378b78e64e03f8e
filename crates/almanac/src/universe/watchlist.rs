//! Tiered watchlist universe.

use crate::universe::tier::Tier;
use std::collections::HashMap;

/// A watchlist ticker with its tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistEntry {
    /// Stock symbol.
    pub symbol: String,
    /// Display name, when known.
    pub name: Option<String>,
    /// Tier.
    pub tier: Tier,
}

impl WatchlistEntry {
    /// Create a new entry.
    pub fn new(symbol: impl Into<String>, name: Option<&str>, tier: Tier) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            name: name.map(ToString::to_string),
            tier,
        }
    }
}

const BENCHMARKS: [(&str, &str); 2] = [
    ("SPY", "SPDR S&P 500 ETF"),
    ("DIA", "SPDR Dow Jones Industrial Average ETF"),
];

const CORE: [(&str, &str); 16] = [
    ("AAPL", "Apple"),
    ("TSLA", "Tesla"),
    ("AMZN", "Amazon"),
    ("MSFT", "Microsoft"),
    ("GOOGL", "Alphabet"),
    ("NVDA", "Nvidia"),
    ("RCL", "Royal Caribbean"),
    ("ASML", "ASML Holding"),
    ("AMD", "AMD"),
    ("WMT", "Walmart"),
    ("SBUX", "Starbucks"),
    ("NFLX", "Netflix"),
    ("COIN", "Coinbase"),
    ("DAKT", "Daktronics"),
    ("KEN", "Kenon Holdings"),
    ("CVX", "Chevron"),
];

const EXTENDED: [&str; 73] = [
    "AFRM", "ARKK", "AXON", "BILL", "BROS", "CELH", "CHPT", "CHWY", "CRSP", "CRWD", "CVNA",
    "DDOG", "DELL", "DIS", "DUOL", "ENPH", "F", "FCX", "FLEX", "FSLR", "FTNT", "GILD", "GM",
    "GRAB", "GRMN", "GTLB", "HLT", "HOOD", "HPQ", "HUBS", "IONQ", "JBLU", "JD", "KLAC", "LEN",
    "LRCX", "LUV", "LYFT", "META", "MU", "NET", "NIO", "NOW", "OKTA", "ON", "PANW", "PAYC",
    "PINS", "PLTR", "PSKY", "PYPL", "QCOM", "RIVN", "ROKU", "SE", "SHOP", "SNAP", "SNOW", "SOFI",
    "TEVA", "TGT", "TOST", "TTD", "TWLO", "U", "UBER", "UPST", "VRT", "WDAY", "WFC", "XYZ", "ZM",
    "ZS",
];

/// Watchlist of benchmark, core and extended tickers.
#[derive(Debug, Clone)]
pub struct WatchlistUniverse {
    entries: Vec<WatchlistEntry>,
    symbol_to_tier: HashMap<String, Tier>,
}

impl WatchlistUniverse {
    /// Create the default watchlist.
    pub fn new() -> Self {
        Self::from_entries(Self::default_entries())
    }

    /// Create a watchlist from explicit entries; a repeated symbol keeps its first tier.
    pub fn from_entries(entries: Vec<WatchlistEntry>) -> Self {
        let mut symbol_to_tier = HashMap::new();
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            if symbol_to_tier.contains_key(&entry.symbol) {
                continue;
            }
            symbol_to_tier.insert(entry.symbol.clone(), entry.tier);
            kept.push(entry);
        }
        Self {
            entries: kept,
            symbol_to_tier,
        }
    }

    /// All entries in watchlist order.
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    /// All symbols, benchmarks included.
    pub fn symbols(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.symbol.clone()).collect()
    }

    /// Symbols in `tier`.
    pub fn symbols_in_tier(&self, tier: Tier) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.tier == tier)
            .map(|e| e.symbol.clone())
            .collect()
    }

    /// Benchmark symbols.
    pub fn benchmarks(&self) -> Vec<String> {
        self.symbols_in_tier(Tier::Benchmark)
    }

    /// Non-benchmark symbols: the screenable universe.
    pub fn screenable(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.tier != Tier::Benchmark)
            .map(|e| e.symbol.clone())
            .collect()
    }

    /// Tier of `symbol`, case-insensitive.
    pub fn tier_of(&self, symbol: &str) -> Option<Tier> {
        self.symbol_to_tier
            .get(&symbol.trim().to_uppercase())
            .copied()
    }

    /// Look up an entry.
    pub fn entry(&self, symbol: &str) -> Option<&WatchlistEntry> {
        let symbol = symbol.trim().to_uppercase();
        self.entries.iter().find(|e| e.symbol == symbol)
    }

    fn default_entries() -> Vec<WatchlistEntry> {
        let benchmarks = BENCHMARKS
            .iter()
            .map(|&(s, n)| WatchlistEntry::new(s, Some(n), Tier::Benchmark));
        let core = CORE
            .iter()
            .map(|&(s, n)| WatchlistEntry::new(s, Some(n), Tier::Core));
        let extended = EXTENDED
            .iter()
            .map(|&s| WatchlistEntry::new(s, None, Tier::Extended));
        benchmarks.chain(core).chain(extended).collect()
    }
}

impl Default for WatchlistUniverse {
    fn default() -> Self {
        Self::new()
    }
}
