//! Watchlist tiers.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Unknown tier name or number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown tier: {0}")]
pub struct TierError(String);

/// Watchlist grouping of a ticker.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Index funds used as benchmarks
    #[display("benchmark")]
    Benchmark,
    /// Priority list with reference data for validation
    #[display("core")]
    Core,
    /// Broader list screened after the core list
    #[display("extended")]
    Extended,
}

impl Tier {
    /// Every tier, benchmarks first.
    pub const ALL: [Self; 3] = [Self::Benchmark, Self::Core, Self::Extended];

    /// Numeric level stored alongside tickers.
    pub const fn level(self) -> u8 {
        match self {
            Self::Benchmark => 0,
            Self::Core => 1,
            Self::Extended => 2,
        }
    }

    /// Tier for a stored numeric level.
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Benchmark),
            1 => Some(Self::Core),
            2 => Some(Self::Extended),
            _ => None,
        }
    }
}

impl FromStr for Tier {
    type Err = TierError;

    /// Accepts a tier name or its numeric level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "benchmark" | "0" => Ok(Self::Benchmark),
            "core" | "1" => Ok(Self::Core),
            "extended" | "2" => Ok(Self::Extended),
            other => Err(TierError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("benchmark", Tier::Benchmark)]
    #[case("0", Tier::Benchmark)]
    #[case("Core", Tier::Core)]
    #[case("2", Tier::Extended)]
    fn test_parse(#[case] input: &str, #[case] expected: Tier) {
        assert_eq!(input.parse::<Tier>().unwrap(), expected);
    }

    #[test]
    fn test_levels_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_level(tier.level()), Some(tier));
        }
        assert_eq!(Tier::from_level(3), None);
        assert!("3".parse::<Tier>().is_err());
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(Tier::Extended.to_string(), "extended");
        assert_eq!(serde_json::to_string(&Tier::Core).unwrap(), "\"core\"");
        let tier: Tier = serde_json::from_str("\"benchmark\"").unwrap();
        assert_eq!(tier, Tier::Benchmark);
    }
}
