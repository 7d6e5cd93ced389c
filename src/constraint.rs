//! Equality constraint tying weighted column sums to the target margins.
//!
//! Active only in hard-constraint mode; in penalized mode the same residual
//! feeds the quadratic penalty term of the objective instead and no
//! constraint is handed to the solver.

use nalgebra::{DMatrix, DVector};

/// The margin-matching equality constraint `g(w) = Xᵀw − target = 0`.
#[derive(Debug, Clone)]
pub struct MarginConstraint<'a> {
    matrix: &'a DMatrix<f64>,
    target: &'a DVector<f64>,
}

impl<'a> MarginConstraint<'a> {
    /// Build the constraint from the calibration matrix and target margins.
    ///
    /// Dimensions have been checked by the driver: `matrix` is n×p and
    /// `target` has length p.
    pub fn new(matrix: &'a DMatrix<f64>, target: &'a DVector<f64>) -> Self {
        Self { matrix, target }
    }

    /// Residual `Xᵀw − target`; zero at any exactly calibrated solution.
    pub fn residual(&self, w: &DVector<f64>) -> DVector<f64> {
        self.matrix.tr_mul(w) - self.target
    }

    /// Constraint Jacobian `∂g/∂w = Xᵀ` (constant: the constraint is
    /// linear in the weights).
    pub fn jacobian(&self) -> DMatrix<f64> {
        self.matrix.transpose()
    }
}
