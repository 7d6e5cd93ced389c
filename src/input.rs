//! Input normalization for heterogeneous numeric containers.
//!
//! The calibration entry point accepts anything that can be turned into a
//! plain numeric vector or matrix: slices, `Vec`s, `nalgebra` types, or
//! row-nested `Vec<Vec<f64>>` tables. The traits here perform that
//! conversion up front so the rest of the pipeline only ever sees
//! `DVector`/`DMatrix`, and unsupported shapes fail with an input error
//! naming the offending quantity.

use nalgebra::{DMatrix, DVector};

use crate::error::CalibrationError;

/// Types that normalize into a plain numeric column vector.
pub trait VectorInput {
    /// Convert into a `DVector`, reporting failures against `quantity`.
    fn into_vector(self, quantity: &'static str) -> Result<DVector<f64>, CalibrationError>;
}

impl VectorInput for DVector<f64> {
    fn into_vector(self, _quantity: &'static str) -> Result<DVector<f64>, CalibrationError> {
        Ok(self)
    }
}

impl VectorInput for &DVector<f64> {
    fn into_vector(self, _quantity: &'static str) -> Result<DVector<f64>, CalibrationError> {
        Ok(self.clone())
    }
}

impl VectorInput for Vec<f64> {
    fn into_vector(self, _quantity: &'static str) -> Result<DVector<f64>, CalibrationError> {
        Ok(DVector::from_vec(self))
    }
}

impl VectorInput for &[f64] {
    fn into_vector(self, _quantity: &'static str) -> Result<DVector<f64>, CalibrationError> {
        Ok(DVector::from_column_slice(self))
    }
}

impl<const N: usize> VectorInput for [f64; N] {
    fn into_vector(self, _quantity: &'static str) -> Result<DVector<f64>, CalibrationError> {
        Ok(DVector::from_column_slice(&self))
    }
}

/// Types that normalize into a plain numeric matrix.
///
/// A single-column input may also be supplied as a flat vector; it is
/// interpreted as an n×1 matrix.
pub trait MatrixInput {
    /// Convert into a `DMatrix`, reporting failures against `quantity`.
    fn into_matrix(self, quantity: &'static str) -> Result<DMatrix<f64>, CalibrationError>;
}

impl MatrixInput for DMatrix<f64> {
    fn into_matrix(self, _quantity: &'static str) -> Result<DMatrix<f64>, CalibrationError> {
        Ok(self)
    }
}

impl MatrixInput for &DMatrix<f64> {
    fn into_matrix(self, _quantity: &'static str) -> Result<DMatrix<f64>, CalibrationError> {
        Ok(self.clone())
    }
}

impl MatrixInput for Vec<f64> {
    fn into_matrix(self, _quantity: &'static str) -> Result<DMatrix<f64>, CalibrationError> {
        let n = self.len();
        Ok(DMatrix::from_vec(n, 1, self))
    }
}

impl MatrixInput for Vec<Vec<f64>> {
    fn into_matrix(self, quantity: &'static str) -> Result<DMatrix<f64>, CalibrationError> {
        self.as_slice().into_matrix(quantity)
    }
}

impl MatrixInput for &[Vec<f64>] {
    fn into_matrix(self, quantity: &'static str) -> Result<DMatrix<f64>, CalibrationError> {
        if self.is_empty() {
            return Err(CalibrationError::InvalidInput {
                quantity,
                reason: "table has no rows".to_string(),
            });
        }
        let ncols = self[0].len();
        for (i, row) in self.iter().enumerate() {
            if row.len() != ncols {
                return Err(CalibrationError::InvalidInput {
                    quantity,
                    reason: format!(
                        "ragged table: row 0 has {} columns but row {} has {}",
                        ncols,
                        i,
                        row.len()
                    ),
                });
            }
        }
        Ok(DMatrix::from_fn(self.len(), ncols, |i, j| self[i][j]))
    }
}
