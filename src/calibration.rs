//! The `MarginCalibration` driver: validate, assemble, solve.
//!
//! A driver is configured once (method, bounds, penalty) and can then run
//! any number of calibration calls. Each call builds an immutable request
//! from its own inputs and threads it through the pipeline, so concurrent
//! calls on separate drivers can never observe each other's in-flight
//! state. The driver itself holds no per-call data.
//!
//! Pipeline per call: normalize inputs, sanity-check them, derive design
//! weights, build bounds/objective/gradient/constraint, invoke the solver
//! with `x0` at the design weights, and return the solver's report
//! verbatim. Validation failures abort before the solver is ever invoked;
//! solver non-convergence is returned to the caller, never retried.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::bounds::build_bounds;
use crate::config::{Config, Resolved};
use crate::constraint::MarginConstraint;
use crate::error::CalibrationError;
use crate::input::{MatrixInput, VectorInput};
use crate::metric::Metric;
use crate::objective::Objective;
use crate::solver::{
    AugmentedLagrangian, ConstrainedSolver, Equality, Problem, SolverOptions,
};
use crate::validate::{check_all_finite, check_no_nans, check_no_negatives, check_no_zeros};
use crate::weights::design_weights;

/// Outcome of one calibration call.
///
/// Mirrors the solver report: non-convergence is part of the result, not
/// an error, so callers can inspect the diagnostics and decide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Whether the solver reached its tolerances.
    pub converged: bool,
    /// Calibrated weights, one per sampled unit.
    pub weights: Vec<f64>,
    /// Calibration factors `w_i / d_i`, the per-unit adjustment each
    /// design weight received.
    pub ratios: Vec<f64>,
    /// Total solver iterations.
    pub iterations: usize,
    /// Objective value at the returned weights.
    pub objective: f64,
    /// Infinity norm of `Xᵀw − target` at the returned weights.
    pub constraint_violation: f64,
}

/// Per-call request data, fixed for the duration of one calibration.
struct CalibrationRequest {
    design_weights: DVector<f64>,
    matrix: DMatrix<f64>,
    target: DVector<f64>,
}

/// Margin calibration driver.
///
/// # Example
///
/// ```
/// use margin_calibration::MarginCalibration;
///
/// // Four units sampled with probability 0.5 each; one auxiliary
/// // variable whose population total is known to be 8.
/// let driver = MarginCalibration::linear();
/// let result = driver
///     .calibrate(
///         vec![0.5, 0.5, 0.5, 0.5],
///         vec![1.0, 1.0, 1.0, 1.0],
///         vec![8.0],
///     )
///     .unwrap();
/// assert!(result.converged);
/// ```
#[derive(Debug, Clone)]
pub struct MarginCalibration {
    config: Config,
    resolved: Resolved,
    solver: AugmentedLagrangian,
}

impl MarginCalibration {
    /// Build a driver from a full configuration, validating it
    /// exhaustively.
    pub fn new(config: Config) -> Result<Self, CalibrationError> {
        let resolved = config.resolve()?;
        Ok(Self {
            config,
            resolved,
            solver: AugmentedLagrangian::new(),
        })
    }

    /// Driver for the unbounded linear (chi-square) method.
    pub fn linear() -> Self {
        Self {
            config: Config::new(crate::CalibrationMethod::Linear),
            resolved: Resolved {
                metric: Metric::Linear,
                penalty: None,
            },
            solver: AugmentedLagrangian::new(),
        }
    }

    /// Driver for the raking-ratio method.
    pub fn raking_ratio() -> Self {
        Self {
            config: Config::new(crate::CalibrationMethod::RakingRatio),
            resolved: Resolved {
                metric: Metric::RakingRatio,
                penalty: None,
            },
            solver: AugmentedLagrangian::new(),
        }
    }

    /// Driver for the truncated linear method with the given bound
    /// multipliers (`lower < 1 < upper`).
    pub fn truncated_linear(lower: f64, upper: f64) -> Result<Self, CalibrationError> {
        Self::new(Config::new(crate::CalibrationMethod::TruncatedLinear).bounds(lower, upper))
    }

    /// Driver for the logit method with the given bound multipliers
    /// (`lower < 1 < upper`).
    pub fn logit(lower: f64, upper: f64) -> Result<Self, CalibrationError> {
        Self::new(Config::new(crate::CalibrationMethod::Logit).bounds(lower, upper))
    }

    /// Switch to penalized calibration: the margin constraint becomes a
    /// quadratic cost `penalty·(Xᵀw−target)ᵀ·diag(costs)·(Xᵀw−target)` in
    /// the objective instead of a hard equality.
    pub fn penalized(self, penalty: f64, costs: Vec<f64>) -> Result<Self, CalibrationError> {
        Self::new(self.config.penalized(penalty, costs))
    }

    /// Replace the default solver options.
    pub fn solver_options(mut self, options: SolverOptions) -> Self {
        self.solver = AugmentedLagrangian::with_options(options);
        self
    }

    /// The validated configuration this driver was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one calibration with the built-in solver backend.
    ///
    /// Accepts any input containers that normalize to numeric arrays (see
    /// [`crate::input`]). Returns an error for invalid inputs, before any
    /// solver work happens; solver non-convergence is reported inside the
    /// `Ok` result.
    pub fn calibrate<V, M, T>(
        &self,
        sampling_probabilities: V,
        calibration_matrix: M,
        calibration_target: T,
    ) -> Result<CalibrationResult, CalibrationError>
    where
        V: VectorInput,
        M: MatrixInput,
        T: VectorInput,
    {
        let solver = self.solver.clone();
        self.calibrate_with(
            &solver,
            sampling_probabilities,
            calibration_matrix,
            calibration_target,
        )
    }

    /// Run one calibration with a caller-supplied solver backend.
    pub fn calibrate_with<S, V, M, T>(
        &self,
        solver: &S,
        sampling_probabilities: V,
        calibration_matrix: M,
        calibration_target: T,
    ) -> Result<CalibrationResult, CalibrationError>
    where
        S: ConstrainedSolver,
        V: VectorInput,
        M: MatrixInput,
        T: VectorInput,
    {
        let probabilities = sampling_probabilities.into_vector("sampling probabilities")?;
        let matrix = calibration_matrix.into_matrix("calibration matrix")?;
        let target = calibration_target.into_vector("calibration target")?;
        let request = self.validated_request(probabilities, matrix, target)?;

        let bounds = build_bounds(&self.resolved.metric, &request.design_weights);
        let objective = Objective::new(
            self.resolved.metric,
            &request.design_weights,
            &request.matrix,
            &request.target,
            self.resolved.penalty.as_ref(),
        );
        let objective_fn = |w: &DVector<f64>| objective.value(w);
        let gradient_fn = |w: &DVector<f64>| objective.gradient(w);

        let constraint = MarginConstraint::new(&request.matrix, &request.target);
        let residual_fn = |w: &DVector<f64>| constraint.residual(w);
        let jacobian_fn = |_: &DVector<f64>| constraint.jacobian();
        // Penalized mode folds the margins into the objective; only hard
        // mode hands the solver an equality constraint.
        let equality = if self.resolved.penalty.is_none() {
            Some(Equality {
                residual: &residual_fn,
                jacobian: &jacobian_fn,
            })
        } else {
            None
        };

        debug!(
            "calibrating {} units against {} margins with method '{}'",
            request.design_weights.len(),
            request.target.len(),
            self.config.method
        );

        let report = solver.minimize(&Problem {
            objective: &objective_fn,
            gradient: &gradient_fn,
            x0: request.design_weights.clone(),
            bounds: bounds.as_deref(),
            equality,
        });

        // Calibrated weights must stay non-negative; the bounds already
        // enforce this for every method that can go negative, so a
        // violation here points at a misbehaving external backend.
        if report.x.iter().any(|&w| w < 0.0) {
            warn!("solver returned negative calibrated weights");
        }

        let ratios = report
            .x
            .iter()
            .zip(request.design_weights.iter())
            .map(|(w, d)| w / d)
            .collect();

        Ok(CalibrationResult {
            converged: report.success,
            weights: report.x.as_slice().to_vec(),
            ratios,
            iterations: report.iterations,
            objective: report.objective,
            constraint_violation: report.constraint_violation,
        })
    }

    /// Sanity-check the normalized inputs and assemble the per-call
    /// request. Fails before any solver invocation.
    fn validated_request(
        &self,
        probabilities: DVector<f64>,
        matrix: DMatrix<f64>,
        target: DVector<f64>,
    ) -> Result<CalibrationRequest, CalibrationError> {
        check_no_nans(probabilities.as_slice(), "sampling probabilities")?;
        check_all_finite(probabilities.as_slice(), "sampling probabilities")?;
        check_no_zeros(probabilities.as_slice(), "sampling probabilities")?;
        check_no_negatives(probabilities.as_slice(), "sampling probabilities")?;
        check_no_nans(matrix.as_slice(), "calibration matrix")?;
        check_no_nans(target.as_slice(), "calibration target")?;

        if matrix.nrows() != probabilities.len() {
            return Err(CalibrationError::DimensionMismatch {
                detail: format!(
                    "calibration matrix has {} rows but sampling probabilities has {} entries",
                    matrix.nrows(),
                    probabilities.len()
                ),
            });
        }
        if matrix.ncols() != target.len() {
            return Err(CalibrationError::DimensionMismatch {
                detail: format!(
                    "calibration matrix has {} columns but calibration target has {} entries",
                    matrix.ncols(),
                    target.len()
                ),
            });
        }
        if let Some(term) = &self.resolved.penalty {
            if term.costs.len() != target.len() {
                return Err(CalibrationError::DimensionMismatch {
                    detail: format!(
                        "costs has {} entries but calibration target has {}",
                        term.costs.len(),
                        target.len()
                    ),
                });
            }
        }

        Ok(CalibrationRequest {
            design_weights: design_weights(&probabilities),
            matrix,
            target,
        })
    }
}
