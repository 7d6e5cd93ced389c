//! Error types for configuration and input validation.
//!
//! Two families of failure exist: configuration errors (bad method/bounds/
//! penalty setup, detected at construction) and input errors (bad
//! probabilities/matrix/target, detected before the solver is invoked).
//! Solver non-convergence is *not* an error; it is reported through
//! [`crate::CalibrationResult`] so the caller can inspect the diagnostics.

use thiserror::Error;

/// Errors raised by configuration validation or input checking.
///
/// Every message names the offending quantity so that failures in larger
/// pipelines can be traced back to the specific input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// The calibration method name is not one of the supported four.
    #[error(
        "unknown calibration method '{0}'; must be one of: \
         'linear', 'truncated_linear', 'raking_ratio', 'logit'"
    )]
    UnknownMethod(String),

    /// A bounded method was configured without its bound multipliers.
    #[error("calibration method '{method}' requires both 'lower_bound' and 'upper_bound'")]
    MissingBounds {
        /// Name of the method that requires bounds.
        method: &'static str,
    },

    /// Bound multipliers must be finite numbers.
    #[error("'lower_bound' and 'upper_bound' must be finite numeric values (got {lower}, {upper})")]
    NonFiniteBounds {
        /// The supplied lower multiplier.
        lower: f64,
        /// The supplied upper multiplier.
        upper: f64,
    },

    /// Bound multipliers must straddle 1.
    #[error(
        "the lower bound should be strictly inferior to 1 and the upper bound \
         strictly superior to 1 (got lower={lower}, upper={upper})"
    )]
    BoundOrdering {
        /// The supplied lower multiplier.
        lower: f64,
        /// The supplied upper multiplier.
        upper: f64,
    },

    /// Exactly one of (penalty, costs) was supplied.
    #[error("'{supplied}' was supplied without '{missing}'; penalized calibration needs both")]
    IncompletePenalty {
        /// The half of the penalty configuration that was present.
        supplied: &'static str,
        /// The half that was absent.
        missing: &'static str,
    },

    /// The penalty scalar must be a finite, non-negative number.
    #[error("'penalty' must be a finite non-negative number (got {0})")]
    InvalidPenalty(f64),

    /// NaN values were found in a numeric input.
    #[error("NaN values in {quantity}")]
    NanValues {
        /// Name of the offending input.
        quantity: &'static str,
    },

    /// Infinite values were found in a numeric input.
    #[error("non-finite values in {quantity}")]
    NonFiniteValues {
        /// Name of the offending input.
        quantity: &'static str,
    },

    /// Zero values were found where they are not allowed.
    #[error("zero values in {quantity}")]
    ZeroValues {
        /// Name of the offending input.
        quantity: &'static str,
    },

    /// Negative values were found where they are not allowed.
    #[error("negative values in {quantity}")]
    NegativeValues {
        /// Name of the offending input.
        quantity: &'static str,
    },

    /// An input container could not be normalized to a numeric array.
    #[error("{quantity} could not be converted to a numeric array: {reason}")]
    InvalidInput {
        /// Name of the offending input.
        quantity: &'static str,
        /// What went wrong during normalization.
        reason: String,
    },

    /// Two inputs that must agree in size do not.
    #[error("dimension mismatch: {detail}")]
    DimensionMismatch {
        /// Human-readable description of the mismatched sizes.
        detail: String,
    },
}
