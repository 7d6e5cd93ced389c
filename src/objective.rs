//! Objective composition: aggregate distance plus optional penalty.
//!
//! The objective is `f(w) = Σ_k d_k·distance(w_k, d_k)` in hard-constraint
//! mode. In penalized mode the margin-matching requirement is folded into
//! the objective as a soft quadratic cost,
//!
//! ```text
//! f(w) + penalty · (Xᵀw − target)ᵀ · diag(costs) · (Xᵀw − target)
//! ```
//!
//! and no equality constraint is handed to the solver. The penalty
//! gradient is derived by the chain rule on that quadratic form:
//!
//! ```text
//! ∇ penalty·(Xᵀw − t)ᵀ diag(c) (Xᵀw − t)  =  2·penalty · X·diag(c)·(Xᵀw − t)
//! ```
//!
//! which the tests verify against central finite differences.

use nalgebra::{DMatrix, DVector};

use crate::config::PenaltyTerm;
use crate::metric::Metric;

/// The composed objective and its analytic gradient for one calibration
/// run.
///
/// Borrows the per-call request data; nothing here outlives the
/// calibration call or mutates shared state.
#[derive(Debug, Clone)]
pub struct Objective<'a> {
    metric: Metric,
    design_weights: &'a DVector<f64>,
    matrix: &'a DMatrix<f64>,
    target: &'a DVector<f64>,
    penalty: Option<&'a PenaltyTerm>,
}

impl<'a> Objective<'a> {
    /// Compose the objective for `metric` over the given request data.
    ///
    /// `penalty` of `None` selects hard-constraint mode; `Some` selects
    /// penalized mode (the caller then passes no equality constraint to
    /// the solver).
    pub fn new(
        metric: Metric,
        design_weights: &'a DVector<f64>,
        matrix: &'a DMatrix<f64>,
        target: &'a DVector<f64>,
        penalty: Option<&'a PenaltyTerm>,
    ) -> Self {
        Self {
            metric,
            design_weights,
            matrix,
            target,
            penalty,
        }
    }

    /// Scalar objective value at the trial weights `w`.
    pub fn value(&self, w: &DVector<f64>) -> f64 {
        let mut total = 0.0;
        for (w_k, d_k) in w.iter().zip(self.design_weights.iter()) {
            total += d_k * self.metric.distance(w_k / d_k);
        }
        if let Some(term) = self.penalty {
            let residual = self.matrix.tr_mul(w) - self.target;
            let weighted: f64 = residual
                .iter()
                .zip(term.costs.iter())
                .map(|(g, c)| c * g * g)
                .sum();
            total += term.penalty * weighted;
        }
        total
    }

    /// Analytic gradient of the objective at `w`.
    pub fn gradient(&self, w: &DVector<f64>) -> DVector<f64> {
        let mut grad = DVector::from_fn(w.len(), |k, _| {
            self.metric.gradient(w[k] / self.design_weights[k])
        });
        if let Some(term) = self.penalty {
            let residual = self.matrix.tr_mul(w) - self.target;
            let scaled = residual.component_mul(&term.costs) * (2.0 * term.penalty);
            grad += self.matrix * scaled;
        }
        grad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (DVector<f64>, DMatrix<f64>, DVector<f64>) {
        let design = DVector::from_vec(vec![2.0, 4.0, 2.5, 3.0]);
        let matrix =
            DMatrix::from_row_slice(4, 2, &[1.0, 0.5, 1.0, 1.5, 1.0, 2.0, 1.0, 0.0]);
        let target = DVector::from_vec(vec![10.0, 12.0]);
        (design, matrix, target)
    }

    #[test]
    fn objective_is_zero_at_design_weights() {
        let (design, matrix, target) = fixture();
        for metric in [
            Metric::Linear,
            Metric::RakingRatio,
            Metric::TruncatedLinear {
                lower: 0.5,
                upper: 1.5,
            },
            Metric::Logit {
                lower: 0.5,
                upper: 1.5,
            },
        ] {
            let objective = Objective::new(metric, &design, &matrix, &target, None);
            assert_eq!(
                objective.value(&design),
                0.0,
                "{:?} should cost nothing at w = d",
                metric
            );
        }
    }

    #[test]
    fn penalized_objective_adds_weighted_residual_cost() {
        let (design, matrix, target) = fixture();
        let term = PenaltyTerm {
            penalty: 3.0,
            costs: DVector::from_vec(vec![1.0, 0.5]),
        };
        let hard = Objective::new(Metric::Linear, &design, &matrix, &target, None);
        let soft = Objective::new(Metric::Linear, &design, &matrix, &target, Some(&term));

        let w = &design * 1.1;
        let residual = matrix.tr_mul(&w) - &target;
        let expected =
            3.0 * (residual[0] * residual[0] + 0.5 * residual[1] * residual[1]);
        assert!((soft.value(&w) - hard.value(&w) - expected).abs() < 1e-10);
    }

    #[test]
    fn gradient_matches_finite_differences_hard_mode() {
        let (design, matrix, target) = fixture();
        for metric in [
            Metric::Linear,
            Metric::RakingRatio,
            Metric::Logit {
                lower: 0.6,
                upper: 1.6,
            },
        ] {
            let objective = Objective::new(metric, &design, &matrix, &target, None);
            let w = &design * 1.08;
            assert_gradient_matches_fd(&objective, &w);
        }
    }

    #[test]
    fn gradient_matches_finite_differences_penalized_mode() {
        let (design, matrix, target) = fixture();
        let term = PenaltyTerm {
            penalty: 5.0,
            costs: DVector::from_vec(vec![1.0, 2.0]),
        };
        let objective = Objective::new(Metric::Linear, &design, &matrix, &target, Some(&term));
        let w = &design * 0.93;
        assert_gradient_matches_fd(&objective, &w);
    }

    fn assert_gradient_matches_fd(objective: &Objective<'_>, w: &DVector<f64>) {
        let h = 1e-6;
        let analytic = objective.gradient(w);
        for k in 0..w.len() {
            let mut plus = w.clone();
            let mut minus = w.clone();
            plus[k] += h;
            minus[k] -= h;
            let fd = (objective.value(&plus) - objective.value(&minus)) / (2.0 * h);
            assert!(
                (fd - analytic[k]).abs() < 1e-4,
                "component {}: fd={} analytic={}",
                k,
                fd,
                analytic[k]
            );
        }
    }
}
