//! Design-weight initialization from sampling probabilities.

use nalgebra::DVector;

/// Compute design weights as the elementwise reciprocal of the sampling
/// probabilities.
///
/// This is a pure function of the current probabilities; it is recomputed
/// on every calibration call and never cached, so a re-supplied probability
/// vector can never observe stale weights. The caller is responsible for
/// having validated the probabilities (finite, strictly positive) first.
pub fn design_weights(probabilities: &DVector<f64>) -> DVector<f64> {
    probabilities.map(|p| 1.0 / p)
}
