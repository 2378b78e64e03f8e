//! IQR-based outlier flags.

use crate::calculator::ReturnObservation;
use serde::{Deserialize, Serialize};

/// Inclusive range of non-outlier values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierBounds {
    /// Lower fence
    pub lower_bound: f64,
    /// Upper fence
    pub upper_bound: f64,
}

impl OutlierBounds {
    /// Bounds that flag nothing.
    pub const UNBOUNDED: Self = Self {
        lower_bound: f64::NEG_INFINITY,
        upper_bound: f64::INFINITY,
    };

    /// Whether `value` lies strictly outside the fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower_bound || value > self.upper_bound
    }

    /// Whether both fences are infinite.
    pub const fn is_unbounded(&self) -> bool {
        self.lower_bound.is_infinite() && self.upper_bound.is_infinite()
    }
}

impl Default for OutlierBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Tukey fences `Q1 - 1.5 IQR` and `Q3 + 1.5 IQR`.
///
/// Quartiles are positional: `Q1 = v[floor(0.25 n)]`, `Q3 = v[floor(0.75 n)]` of
/// the ascending values. Fewer than four values give [`OutlierBounds::UNBOUNDED`].
pub fn detect_bounds(values: &[f64]) -> OutlierBounds {
    if values.len() < 4 {
        return OutlierBounds::UNBOUNDED;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let q1 = sorted[n / 4];
    let q3 = sorted[n * 3 / 4];
    let iqr = q3 - q1;

    OutlierBounds {
        lower_bound: q1 - 1.5 * iqr,
        upper_bound: q3 + 1.5 * iqr,
    }
}

/// A return with its outlier flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedReturn {
    /// The underlying return
    #[serde(flatten)]
    pub observation: ReturnObservation,
    /// Outside the peer group's fences
    pub is_outlier: bool,
}

/// Flag each observation against the bounds of the whole slice.
pub fn flag_outliers(peer_group: &[ReturnObservation]) -> (OutlierBounds, Vec<FlaggedReturn>) {
    let values: Vec<f64> = peer_group.iter().map(|r| r.return_pct).collect();
    let bounds = detect_bounds(&values);
    let flagged = peer_group
        .iter()
        .map(|&observation| FlaggedReturn {
            observation,
            is_outlier: bounds.is_outlier(observation.return_pct),
        })
        .collect();
    (bounds, flagged)
}
