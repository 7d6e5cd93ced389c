//! # margin-calibration
//!
//! Calibrated survey weights: adjust design weights (inverse sampling
//! probabilities) so that weighted totals of auxiliary variables match
//! known population margins, while staying as close as possible to the
//! original weights under a chosen distance metric.
//!
//! This is the classic calibration estimator setup (Deville & Särndal
//! 1992): given sampling probabilities `p`, an n×p calibration matrix `X`
//! and target margins `t`, find weights `w` minimizing
//!
//! ```text
//! Σ_k d_k · G(w_k, d_k)      with d_k = 1/p_k
//! ```
//!
//! subject to `Xᵀw = t`, where `G` is one of four pseudo-distances:
//! `linear`, `truncated_linear`, `raking_ratio`, or `logit`. The equality
//! constraint can alternatively be relaxed into a quadratic penalty term
//! (penalized calibration), trading exact margin matching for robustness
//! when the margins are infeasible or noisy.
//!
//! ## Quick start
//!
//! ```
//! use margin_calibration::MarginCalibration;
//!
//! // Four units sampled with probability 0.5; calibrate their weights so
//! // the estimated population size matches the known total of 4.
//! let result = MarginCalibration::raking_ratio()
//!     .calibrate(
//!         vec![0.5, 0.5, 0.5, 0.5],
//!         vec![1.0, 1.0, 1.0, 1.0],
//!         vec![4.0],
//!     )
//!     .unwrap();
//!
//! assert!(result.converged);
//! let total: f64 = result.weights.iter().sum();
//! assert!((total - 4.0).abs() < 1e-4);
//! ```
//!
//! ## Methods and bounds
//!
//! `truncated_linear` and `logit` require multiplicative bound factors
//! `lower < 1 < upper`; each calibrated weight is then confined to
//! `[lower·d_i, upper·d_i]`. `raking_ratio` keeps weights non-negative;
//! `linear` is unbounded.
//!
//! ## Solving
//!
//! The crate prepares the objective, its analytic gradient, the bounds and
//! the constraint, and hands them to a [`solver::ConstrainedSolver`]. The
//! built-in backend is an augmented-Lagrangian method; callers can plug in
//! their own backend through [`MarginCalibration::calibrate_with`].
//! Solver non-convergence is reported in the result, never raised as an
//! error and never retried.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod calibration;
mod config;
mod error;

// Functional modules
pub mod bounds;
pub mod constraint;
pub mod input;
pub mod metric;
pub mod objective;
pub mod output;
pub mod solver;
pub mod validate;
pub mod weights;

// Re-exports for the public API
pub use calibration::{CalibrationResult, MarginCalibration};
pub use config::{CalibrationMethod, Config, PenaltyTerm};
pub use error::CalibrationError;
pub use metric::{Metric, EPS};
pub use solver::{ConstrainedSolver, SolverOptions, SolverReport};
