//! Augmented-Lagrangian backend with a projected-gradient inner loop.
//!
//! The outer loop handles the equality constraint the classic way: minimize
//!
//! ```text
//! L(x; λ, μ) = f(x) + λᵀg(x) + (μ/2)·‖g(x)‖²
//! ```
//!
//! over the box, update the multipliers `λ ← λ + μ·g(x)`, and grow `μ`
//! whenever the residual stalls. The inner minimization is spectral
//! projected gradient: Barzilai-Borwein step lengths with Armijo
//! backtracking, projecting onto the box after every trial step. Both
//! pieces only ever call the objective, the gradient, the residual, and
//! the constraint Jacobian supplied in the [`Problem`].

use log::{debug, trace};
use nalgebra::DVector;

use super::{ConstrainedSolver, Problem, SolverOptions, SolverReport};

/// Default solver backend.
#[derive(Debug, Clone, Default)]
pub struct AugmentedLagrangian {
    options: SolverOptions,
}

impl AugmentedLagrangian {
    /// Create a backend with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with custom options.
    pub fn with_options(options: SolverOptions) -> Self {
        Self { options }
    }

    /// The backend's current options.
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Clamp `x` into the box, componentwise. Infinite sides are no-ops.
    fn project(x: &mut DVector<f64>, bounds: Option<&[(f64, f64)]>) {
        if let Some(bounds) = bounds {
            for (x_i, &(low, high)) in x.iter_mut().zip(bounds.iter()) {
                *x_i = x_i.clamp(low, high);
            }
        }
    }

    /// Spectral projected gradient on a smooth function over the box.
    ///
    /// Returns the final point, the iterations spent, and whether the
    /// projected-gradient stationarity tolerance was met.
    fn inner_solve<F, G>(
        &self,
        f: F,
        g: G,
        mut x: DVector<f64>,
        bounds: Option<&[(f64, f64)]>,
    ) -> (DVector<f64>, usize, bool)
    where
        F: Fn(&DVector<f64>) -> f64,
        G: Fn(&DVector<f64>) -> DVector<f64>,
    {
        let opts = &self.options;
        Self::project(&mut x, bounds);
        let mut fx = f(&x);
        let mut grad = g(&x);
        let mut step: f64 = 1.0;

        for iter in 0..opts.max_inner_iterations {
            // Stationarity: distance moved by a unit projected gradient step.
            let mut stationary = &x - &grad;
            Self::project(&mut stationary, bounds);
            let pg_norm = (&x - &stationary).amax();
            if pg_norm < opts.gradient_tolerance {
                return (x, iter, true);
            }

            // Backtracking line search from the Barzilai-Borwein step.
            let mut alpha = step.clamp(1e-12, 1e12);
            let mut accepted = None;
            for _ in 0..opts.max_line_search {
                let mut trial = &x - &grad * alpha;
                Self::project(&mut trial, bounds);
                let f_trial = f(&trial);
                // Projection-aware Armijo: decrease proportional to
                // gradᵀ(x - trial), which is non-negative for any step.
                let decrease = grad.dot(&(&x - &trial));
                if f_trial <= fx - opts.armijo_c1 * decrease && decrease > 0.0 {
                    accepted = Some((trial, f_trial));
                    break;
                }
                alpha *= 0.5;
            }

            let (x_new, f_new) = match accepted {
                Some(pair) => pair,
                // Line search exhausted: no further progress possible at
                // this scale.
                None => return (x, iter, pg_norm < opts.gradient_tolerance.sqrt()),
            };

            let grad_new = g(&x_new);
            let s = &x_new - &x;
            let y = &grad_new - &grad;
            let sy = s.dot(&y);
            step = if sy > 1e-16 {
                s.norm_squared() / sy
            } else {
                alpha * 2.0
            };

            x = x_new;
            fx = f_new;
            grad = grad_new;
            trace!("inner iter {}: f={:.6e} pg={:.3e}", iter, fx, pg_norm);
        }

        (x, opts.max_inner_iterations, false)
    }
}

impl ConstrainedSolver for AugmentedLagrangian {
    fn minimize(&self, problem: &Problem<'_>) -> SolverReport {
        let opts = &self.options;

        let equality = match &problem.equality {
            None => {
                // Pure box-constrained minimization; one inner solve.
                let (x, iterations, success) = self.inner_solve(
                    |w: &DVector<f64>| (problem.objective)(w),
                    |w: &DVector<f64>| (problem.gradient)(w),
                    problem.x0.clone(),
                    problem.bounds,
                );
                let objective = (problem.objective)(&x);
                debug!(
                    "unconstrained solve: success={} iterations={} objective={:.6e}",
                    success, iterations, objective
                );
                return SolverReport {
                    success,
                    x,
                    iterations,
                    objective,
                    constraint_violation: 0.0,
                };
            }
            Some(eq) => eq,
        };

        let mut x = problem.x0.clone();
        Self::project(&mut x, problem.bounds);
        let mut lambda = DVector::zeros((equality.residual)(&x).len());
        let mut mu = opts.initial_penalty;
        let mut violation = f64::INFINITY;
        let mut stationary = false;
        let mut total_iterations = 0;

        for outer in 0..opts.max_outer_iterations {
            let lam = lambda.clone();
            let penalty = mu;
            let f = |w: &DVector<f64>| {
                let c = (equality.residual)(w);
                (problem.objective)(w) + lam.dot(&c) + 0.5 * penalty * c.norm_squared()
            };
            let g = |w: &DVector<f64>| {
                let c = (equality.residual)(w);
                let jac = (equality.jacobian)(w);
                (problem.gradient)(w) + jac.tr_mul(&(&lam + &c * penalty))
            };

            let (x_new, iterations, inner_ok) =
                self.inner_solve(f, g, x, problem.bounds);
            x = x_new;
            total_iterations += iterations;

            let residual = (equality.residual)(&x);
            let new_violation = residual.amax();
            debug!(
                "outer iter {}: violation={:.3e} mu={:.1e} inner_iters={} inner_ok={}",
                outer, new_violation, mu, iterations, inner_ok
            );

            stationary = inner_ok;
            if new_violation < opts.constraint_tolerance && inner_ok {
                violation = new_violation;
                break;
            }

            lambda += &residual * mu;
            if new_violation > 0.25 * violation {
                mu = (mu * opts.penalty_growth).min(opts.max_penalty);
            }
            violation = new_violation;
        }

        let objective = (problem.objective)(&x);
        let success = stationary && violation <= opts.constraint_tolerance;
        SolverReport {
            success,
            x,
            iterations: total_iterations,
            objective,
            constraint_violation: violation,
        }
    }
}
