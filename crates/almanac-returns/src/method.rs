//! Pricing conventions for entry and exit.

use crate::error::ReturnsError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which monthly prices define a position's entry and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalcMethod {
    /// Enter at the entry month's first open, exit at the exit month's last close.
    #[default]
    #[display("openToClose")]
    OpenToClose,
    /// Enter and exit at each month's highest close.
    #[display("maxToMax")]
    MaxToMax,
}

impl CalcMethod {
    /// Calendar months actually spanned by a position held `holding_period` months.
    ///
    /// `OpenToClose` covers the entry month through the end of the exit month,
    /// one month more than the holding period.
    pub const fn actual_holding_months(self, holding_period: u32) -> u32 {
        match self {
            Self::OpenToClose => holding_period + 1,
            Self::MaxToMax => holding_period,
        }
    }
}

impl FromStr for CalcMethod {
    type Err = ReturnsError;

    /// Accepts `openToClose`, `open_to_close`, `open-to-close` and the `maxToMax`
    /// equivalents, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "opentoclose" => Ok(Self::OpenToClose),
            "maxtomax" => Ok(Self::MaxToMax),
            _ => Err(ReturnsError::InvalidConfiguration(format!(
                "unknown calc method: {s}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CalcMethod::OpenToClose, 3, 4)]
    #[case(CalcMethod::OpenToClose, 6, 7)]
    #[case(CalcMethod::MaxToMax, 3, 3)]
    #[case(CalcMethod::MaxToMax, 1, 1)]
    fn test_actual_holding_months(
        #[case] method: CalcMethod,
        #[case] holding_period: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(method.actual_holding_months(holding_period), expected);
    }

    #[rstest]
    #[case("openToClose", CalcMethod::OpenToClose)]
    #[case("open_to_close", CalcMethod::OpenToClose)]
    #[case("OPEN-TO-CLOSE", CalcMethod::OpenToClose)]
    #[case(" maxToMax ", CalcMethod::MaxToMax)]
    #[case("max_to_max", CalcMethod::MaxToMax)]
    fn test_parse(#[case] input: &str, #[case] expected: CalcMethod) {
        assert_eq!(input.parse::<CalcMethod>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "closeToClose".parse::<CalcMethod>().unwrap_err();
        assert!(matches!(err, ReturnsError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(CalcMethod::OpenToClose.to_string(), "openToClose");
        assert_eq!(
            serde_json::to_string(&CalcMethod::MaxToMax).unwrap(),
            "\"maxToMax\""
        );
    }
}
