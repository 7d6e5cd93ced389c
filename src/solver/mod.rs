//! Constrained nonlinear solver seam.
//!
//! The calibration driver prepares an objective, its analytic gradient,
//! optional box bounds, and an optional equality constraint, then hands the
//! whole problem to a [`ConstrainedSolver`]. The trait is the boundary:
//! the driver never retries or reinterprets what comes back, it surfaces
//! the [`SolverReport`] verbatim.
//!
//! The crate ships one backend, [`AugmentedLagrangian`], which supports the
//! combination the calibration problem needs (box bounds plus a nonlinear
//! equality constraint). Alternative backends can be plugged in through
//! [`crate::MarginCalibration::calibrate_with`].

mod augmented_lagrangian;

pub use augmented_lagrangian::AugmentedLagrangian;

use nalgebra::{DMatrix, DVector};

/// An equality constraint `g(x) = 0` with its Jacobian.
pub struct Equality<'a> {
    /// Residual function; required to be the zero vector at the solution.
    pub residual: &'a dyn Fn(&DVector<f64>) -> DVector<f64>,
    /// Jacobian `∂g/∂x`, one row per constraint component.
    pub jacobian: &'a dyn Fn(&DVector<f64>) -> DMatrix<f64>,
}

/// A box-bounded, equality-constrained minimization problem.
pub struct Problem<'a> {
    /// Scalar objective to minimize.
    pub objective: &'a dyn Fn(&DVector<f64>) -> f64,
    /// Analytic gradient of the objective.
    pub gradient: &'a dyn Fn(&DVector<f64>) -> DVector<f64>,
    /// Initial point.
    pub x0: DVector<f64>,
    /// Per-component `(low, high)` bounds; infinities mark unbounded sides.
    pub bounds: Option<&'a [(f64, f64)]>,
    /// Equality constraint, if the problem has one.
    pub equality: Option<Equality<'a>>,
}

/// Tuning knobs for the default backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions {
    /// Maximum augmented-Lagrangian (outer) iterations.
    pub max_outer_iterations: usize,
    /// Maximum projected-gradient (inner) iterations per outer step.
    pub max_inner_iterations: usize,
    /// Infinity-norm tolerance on the constraint residual.
    pub constraint_tolerance: f64,
    /// Infinity-norm tolerance on the projected gradient.
    pub gradient_tolerance: f64,
    /// Initial quadratic penalty parameter of the outer loop.
    pub initial_penalty: f64,
    /// Multiplier applied to the penalty parameter when the constraint
    /// residual does not shrink fast enough.
    pub penalty_growth: f64,
    /// Hard cap on the penalty parameter.
    pub max_penalty: f64,
    /// Armijo sufficient-decrease constant for the line search.
    pub armijo_c1: f64,
    /// Maximum backtracking steps per line search.
    pub max_line_search: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_outer_iterations: 50,
            max_inner_iterations: 2_000,
            constraint_tolerance: 1e-8,
            gradient_tolerance: 1e-8,
            initial_penalty: 10.0,
            penalty_growth: 10.0,
            max_penalty: 1e10,
            armijo_c1: 1e-4,
            max_line_search: 40,
        }
    }
}

/// What the solver found, returned to the caller unmodified.
#[derive(Debug, Clone)]
pub struct SolverReport {
    /// Whether the backend reached its tolerances.
    pub success: bool,
    /// Final point (the calibrated weights).
    pub x: DVector<f64>,
    /// Total inner iterations spent.
    pub iterations: usize,
    /// Objective value at the final point.
    pub objective: f64,
    /// Infinity norm of the equality residual at the final point
    /// (zero when the problem had no equality constraint).
    pub constraint_violation: f64,
}

/// A minimizer able to handle box bounds combined with an equality
/// constraint.
pub trait ConstrainedSolver {
    /// Minimize the problem and report the outcome.
    ///
    /// Non-convergence is reported through [`SolverReport::success`], not
    /// as an error: the caller inspects the diagnostics.
    fn minimize(&self, problem: &Problem<'_>) -> SolverReport;
}
