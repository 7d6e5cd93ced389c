//! Input sanity checks.
//!
//! These checks cover every precondition the calibration pipeline places on
//! its numeric inputs: no NaNs anywhere, finite sampling probabilities, and
//! no zero or negative sampling probabilities. Each check is a no-op on
//! clean data and fails with an error naming the offending quantity
//! otherwise. They run before any solver invocation, so a bad input can
//! never reach the optimizer.

use crate::error::CalibrationError;

/// Fail if `values` contains any NaN.
pub fn check_no_nans(values: &[f64], quantity: &'static str) -> Result<(), CalibrationError> {
    if values.iter().any(|v| v.is_nan()) {
        return Err(CalibrationError::NanValues { quantity });
    }
    Ok(())
}

/// Fail if `values` contains any infinity.
///
/// Reported separately from NaN: an infinite probability is a different
/// caller mistake than a propagated NaN, and an infinite probability would
/// otherwise slip through as a zero design weight.
pub fn check_all_finite(values: &[f64], quantity: &'static str) -> Result<(), CalibrationError> {
    if values.iter().any(|v| v.is_infinite()) {
        return Err(CalibrationError::NonFiniteValues { quantity });
    }
    Ok(())
}

/// Fail if `values` contains any exact zero.
pub fn check_no_zeros(values: &[f64], quantity: &'static str) -> Result<(), CalibrationError> {
    if values.iter().any(|&v| v == 0.0) {
        return Err(CalibrationError::ZeroValues { quantity });
    }
    Ok(())
}

/// Fail if `values` contains any negative value.
pub fn check_no_negatives(values: &[f64], quantity: &'static str) -> Result<(), CalibrationError> {
    if values.iter().any(|&v| v < 0.0) {
        return Err(CalibrationError::NegativeValues { quantity });
    }
    Ok(())
}
