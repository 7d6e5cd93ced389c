//! Per-unit box bounds derived from the calibration method.
//!
//! Bounded methods constrain each calibrated weight to a box centered
//! multiplicatively on that unit's own design weight, `[L·d_i, U·d_i]`,
//! rather than on any global constant. Unbounded methods return no box at
//! all, except `raking_ratio` which keeps a per-unit lower bound of zero so
//! calibrated weights stay non-negative.

use nalgebra::DVector;

use crate::metric::Metric;

/// Box bounds for every decision variable: `(low, high)` per unit.
///
/// Unbounded sides are represented by infinities.
pub type BoxBounds = Vec<(f64, f64)>;

/// Build the per-unit bounds for `metric` given the design weights.
///
/// Returns `None` when the problem is fully unbounded (linear method).
/// The bound multipliers carried by bounded metrics have already been
/// validated at configuration time (`lower < 1 < upper`), which guarantees
/// `low_i < d_i < high_i` for every unit.
pub fn build_bounds(metric: &Metric, design_weights: &DVector<f64>) -> Option<BoxBounds> {
    match metric {
        Metric::Linear => None,
        Metric::RakingRatio => Some(
            design_weights
                .iter()
                .map(|_| (0.0, f64::INFINITY))
                .collect(),
        ),
        Metric::TruncatedLinear { lower, upper } | Metric::Logit { lower, upper } => Some(
            design_weights
                .iter()
                .map(|&d| (lower * d, upper * d))
                .collect(),
        ),
    }
}
