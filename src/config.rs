//! Calibration configuration and its exhaustive validation.
//!
//! A [`Config`] collects everything the caller decides once per driver:
//! the calibration method, the optional bound multipliers, and the optional
//! penalty/costs pair. Validation happens in one place,
//! [`Config::resolve`], which either rejects the configuration or produces
//! the internal resolved form (a [`Metric`] carrying its bounds plus an
//! optional [`PenaltyTerm`]). After resolution no half-configured state can
//! exist: a bounded metric without bounds or a penalty without costs is
//! unrepresentable.

use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;
use crate::metric::Metric;

/// The four supported calibration methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationMethod {
    /// Chi-square distance, unbounded.
    Linear,
    /// Chi-square distance with mandatory bounds.
    TruncatedLinear,
    /// Relative-entropy (raking) distance.
    RakingRatio,
    /// Logistic-barrier distance with mandatory bounds.
    Logit,
}

impl CalibrationMethod {
    /// Canonical lowercase name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            CalibrationMethod::Linear => "linear",
            CalibrationMethod::TruncatedLinear => "truncated_linear",
            CalibrationMethod::RakingRatio => "raking_ratio",
            CalibrationMethod::Logit => "logit",
        }
    }

    /// Whether the method requires lower/upper bound multipliers.
    pub fn requires_bounds(&self) -> bool {
        matches!(
            self,
            CalibrationMethod::TruncatedLinear | CalibrationMethod::Logit
        )
    }
}

impl fmt::Display for CalibrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CalibrationMethod {
    type Err = CalibrationError;

    /// Parse a method name.
    ///
    /// Accepts the canonical names plus `"ranking_ratio"`, a historical
    /// alias for `"raking_ratio"` kept for compatibility with existing
    /// configurations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(CalibrationMethod::Linear),
            "truncated_linear" => Ok(CalibrationMethod::TruncatedLinear),
            "raking_ratio" | "ranking_ratio" => Ok(CalibrationMethod::RakingRatio),
            "logit" => Ok(CalibrationMethod::Logit),
            other => Err(CalibrationError::UnknownMethod(other.to_string())),
        }
    }
}

/// Quadratic penalty configuration for relaxed (soft-constraint)
/// calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyTerm {
    /// Scalar multiplier on the whole penalty term.
    pub penalty: f64,
    /// Per-margin cost weights, length p.
    pub costs: DVector<f64>,
}

/// User-facing calibration configuration.
///
/// Optional fields default to `None`; which ones are required depends on
/// the method and is checked exhaustively by [`Config::resolve`] before a
/// driver can be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Distance metric to minimize.
    pub method: CalibrationMethod,
    /// Lower bound multiplier on each design weight (required for bounded
    /// methods; must be strictly below 1).
    pub lower_bound: Option<f64>,
    /// Upper bound multiplier on each design weight (required for bounded
    /// methods; must be strictly above 1).
    pub upper_bound: Option<f64>,
    /// Penalty scalar for relaxed calibration; requires `costs`.
    pub penalty: Option<f64>,
    /// Per-margin cost weights for relaxed calibration; requires `penalty`.
    pub costs: Option<Vec<f64>>,
}

impl Config {
    /// Create a configuration for `method` with no bounds and no penalty.
    pub fn new(method: CalibrationMethod) -> Self {
        Self {
            method,
            lower_bound: None,
            upper_bound: None,
            penalty: None,
            costs: None,
        }
    }

    /// Set the bound multipliers.
    pub fn bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = Some(lower);
        self.upper_bound = Some(upper);
        self
    }

    /// Set the penalty scalar and per-margin costs, switching the driver to
    /// penalized (soft-constraint) calibration.
    pub fn penalized(mut self, penalty: f64, costs: Vec<f64>) -> Self {
        self.penalty = Some(penalty);
        self.costs = Some(costs);
        self
    }

    /// Validate the configuration and produce its resolved internal form.
    ///
    /// Checks, in order: bounds present and finite and straddling 1 when
    /// the method requires them; penalty and costs supplied together or
    /// not at all; penalty finite and non-negative; costs free of NaNs and
    /// negatives. The costs length is checked against the number of
    /// margins at calibration time, when p is known.
    pub(crate) fn resolve(&self) -> Result<Resolved, CalibrationError> {
        let metric = match self.method {
            CalibrationMethod::Linear => Metric::Linear,
            CalibrationMethod::RakingRatio => Metric::RakingRatio,
            CalibrationMethod::TruncatedLinear => {
                let (lower, upper) = self.checked_bounds()?;
                Metric::TruncatedLinear { lower, upper }
            }
            CalibrationMethod::Logit => {
                let (lower, upper) = self.checked_bounds()?;
                Metric::Logit { lower, upper }
            }
        };

        let penalty = match (&self.penalty, &self.costs) {
            (None, None) => None,
            (Some(penalty), Some(costs)) => {
                let penalty = *penalty;
                if !penalty.is_finite() || penalty < 0.0 {
                    return Err(CalibrationError::InvalidPenalty(penalty));
                }
                crate::validate::check_no_nans(costs, "costs")?;
                crate::validate::check_no_negatives(costs, "costs")?;
                Some(PenaltyTerm {
                    penalty,
                    costs: DVector::from_column_slice(costs),
                })
            }
            (Some(_), None) => {
                return Err(CalibrationError::IncompletePenalty {
                    supplied: "penalty",
                    missing: "costs",
                })
            }
            (None, Some(_)) => {
                return Err(CalibrationError::IncompletePenalty {
                    supplied: "costs",
                    missing: "penalty",
                })
            }
        };

        Ok(Resolved { metric, penalty })
    }

    fn checked_bounds(&self) -> Result<(f64, f64), CalibrationError> {
        let (lower, upper) = match (self.lower_bound, self.upper_bound) {
            (Some(l), Some(u)) => (l, u),
            _ => {
                return Err(CalibrationError::MissingBounds {
                    method: self.method.name(),
                })
            }
        };
        if !lower.is_finite() || !upper.is_finite() {
            return Err(CalibrationError::NonFiniteBounds { lower, upper });
        }
        if lower >= 1.0 || upper <= 1.0 {
            return Err(CalibrationError::BoundOrdering { lower, upper });
        }
        Ok((lower, upper))
    }
}

/// Validated configuration: the metric with its bounds baked in, plus the
/// optional penalty term.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolved {
    pub metric: Metric,
    pub penalty: Option<PenaltyTerm>,
}
