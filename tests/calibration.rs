//! End-to-end calibration scenarios.
//!
//! These tests drive the public API the way a survey pipeline would:
//! configure a method, hand in probabilities/matrix/target, and check the
//! statistical properties of the returned weights (margin matching, bound
//! respect, penalty trade-off). Solver internals are covered by unit
//! tests; here only the contract matters.

use margin_calibration::{CalibrationError, CalibrationMethod, Config, MarginCalibration};

/// Four units sampled with probability one half: design weights all 2.0.
fn half_sample() -> (Vec<f64>, Vec<Vec<f64>>, f64) {
    let probabilities = vec![0.5; 4];
    let matrix = vec![vec![1.0]; 4];
    let design_total = 8.0;
    (probabilities, matrix, design_total)
}

fn margin_residual(matrix: &[Vec<f64>], weights: &[f64], target: &[f64]) -> f64 {
    let p = target.len();
    (0..p)
        .map(|j| {
            let total: f64 = matrix
                .iter()
                .zip(weights.iter())
                .map(|(row, w)| row[j] * w)
                .sum();
            (total - target[j]).abs()
        })
        .fold(0.0, f64::max)
}

#[test]
fn design_weights_already_calibrated_are_returned_unchanged() {
    let (probabilities, matrix, design_total) = half_sample();
    for driver in [
        MarginCalibration::linear(),
        MarginCalibration::raking_ratio(),
        MarginCalibration::truncated_linear(0.5, 1.5).unwrap(),
        MarginCalibration::logit(0.5, 1.5).unwrap(),
    ] {
        let result = driver
            .calibrate(probabilities.clone(), matrix.clone(), vec![design_total])
            .unwrap();
        assert!(result.converged);
        assert!(result.objective.abs() < 1e-10);
        for w in &result.weights {
            assert!(
                (w - 2.0).abs() < 1e-6,
                "weight {} should stay at its design value",
                w
            );
        }
    }
}

#[test]
fn linear_calibration_scales_weights_to_the_target_total() {
    // Target total 2.0 with design total 8.0: the optimal linear
    // adjustment is uniform, scaling every weight by 1/4.
    let (probabilities, matrix, _) = half_sample();
    let result = MarginCalibration::linear()
        .calibrate(probabilities, matrix.clone(), vec![2.0])
        .unwrap();
    assert!(result.converged);
    let total: f64 = result.weights.iter().sum();
    assert!((total - 2.0).abs() < 1e-5, "total was {}", total);
    for w in &result.weights {
        assert!((w - 0.5).abs() < 1e-4, "weight was {}", w);
    }
}

#[test]
fn hard_constraint_mode_matches_margins_tightly() {
    // Six units, two margins: the population size and a domain count.
    let probabilities = vec![0.5, 0.5, 0.5, 0.25, 0.25, 0.2];
    let matrix = vec![
        vec![1.0, 1.0],
        vec![1.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![1.0, 0.0],
    ];
    let target = vec![20.0, 8.5];

    for driver in [MarginCalibration::linear(), MarginCalibration::raking_ratio()] {
        let result = driver
            .calibrate(probabilities.clone(), matrix.clone(), target.clone())
            .unwrap();
        assert!(result.converged, "result: {:?}", result);
        let residual = margin_residual(&matrix, &result.weights, &target);
        assert!(residual < 1e-4, "residual was {}", residual);
        assert!(result.constraint_violation < 1e-4);
    }
}

#[test]
fn raking_ratio_weights_stay_nonnegative() {
    // A target far below the design total pushes weights toward zero;
    // raking must not let them cross it.
    let (probabilities, matrix, _) = half_sample();
    let result = MarginCalibration::raking_ratio()
        .calibrate(probabilities, matrix, vec![0.5])
        .unwrap();
    for w in &result.weights {
        assert!(*w >= -1e-10, "weight {} went negative", w);
    }
}

#[test]
fn truncated_linear_respects_per_unit_boxes() {
    let (probabilities, matrix, _) = half_sample();
    let result = MarginCalibration::truncated_linear(0.9, 1.1)
        .unwrap()
        .calibrate(probabilities, matrix.clone(), vec![8.4])
        .unwrap();
    assert!(result.converged);
    // Design weights are 2.0, so the box is [1.8, 2.2] per unit.
    for w in &result.weights {
        assert!(*w >= 1.8 - 1e-8 && *w <= 2.2 + 1e-8, "weight {} out of box", w);
    }
    let total: f64 = result.weights.iter().sum();
    assert!((total - 8.4).abs() < 1e-4);
}

#[test]
fn logit_solution_stays_within_bounds() {
    let (probabilities, matrix, _) = half_sample();
    let result = MarginCalibration::logit(0.5, 1.5)
        .unwrap()
        .calibrate(probabilities, matrix, vec![10.0])
        .unwrap();
    assert!(result.converged, "result: {:?}", result);
    for r in &result.ratios {
        assert!(*r >= 0.5 - 1e-8 && *r <= 1.5 + 1e-8, "ratio {} out of bounds", r);
    }
    let total: f64 = result.weights.iter().sum();
    assert!((total - 10.0).abs() < 1e-4);
}

#[test]
fn infeasible_margins_surface_as_non_convergence() {
    // The box caps the achievable total at 8.8, so a target of 20 cannot
    // be met; the driver must return the solver's verdict, not an error.
    let (probabilities, matrix, _) = half_sample();
    let result = MarginCalibration::truncated_linear(0.9, 1.1)
        .unwrap()
        .calibrate(probabilities, matrix, vec![20.0])
        .unwrap();
    assert!(!result.converged);
    assert!(result.constraint_violation > 1.0);
}

#[test]
fn increasing_penalty_shrinks_the_margin_residual() {
    let (probabilities, matrix, _) = half_sample();
    let target = vec![10.0];
    let mut previous = f64::INFINITY;
    for penalty in [0.1, 1.0, 10.0, 100.0] {
        let result = MarginCalibration::linear()
            .penalized(penalty, vec![1.0])
            .unwrap()
            .calibrate(probabilities.clone(), matrix.clone(), target.clone())
            .unwrap();
        assert!(result.converged, "penalty {}: {:?}", penalty, result);
        let residual = margin_residual(&matrix, &result.weights, &target);
        assert!(
            residual <= previous + 1e-6,
            "residual {} at penalty {} exceeds previous {}",
            residual,
            penalty,
            previous
        );
        previous = residual;
    }
    // At the strongest penalty the margins are nearly met.
    assert!(previous < 0.1, "final residual was {}", previous);
}

#[test]
fn penalized_mode_reports_its_residual() {
    let (probabilities, matrix, _) = half_sample();
    let result = MarginCalibration::linear()
        .penalized(5.0, vec![1.0])
        .unwrap()
        .calibrate(probabilities, matrix, vec![10.0])
        .unwrap();
    // No equality constraint was handed to the solver in penalized mode.
    assert_eq!(result.constraint_violation, 0.0);
}

#[test]
fn unknown_method_name_fails_before_any_solving() {
    let err = "bogus".parse::<CalibrationMethod>().unwrap_err();
    assert!(matches!(err, CalibrationError::UnknownMethod(_)));
}

#[test]
fn bounded_method_without_bounds_fails_at_construction() {
    let err = MarginCalibration::new(Config::new(CalibrationMethod::TruncatedLinear)).unwrap_err();
    assert!(matches!(err, CalibrationError::MissingBounds { .. }));

    let err = MarginCalibration::logit(1.2, 1.5).unwrap_err();
    assert!(matches!(err, CalibrationError::BoundOrdering { .. }));
}

#[test]
fn one_sided_penalty_configuration_is_rejected() {
    let mut config = Config::new(CalibrationMethod::Linear);
    config.penalty = Some(10.0);
    assert!(matches!(
        MarginCalibration::new(config).unwrap_err(),
        CalibrationError::IncompletePenalty { .. }
    ));
}

#[test]
fn repeated_calls_are_independent() {
    // The driver holds no per-call state: calibrating twice with the same
    // inputs gives identical results, and interleaving a different target
    // does not disturb them.
    let (probabilities, matrix, design_total) = half_sample();
    let driver = MarginCalibration::linear();

    let first = driver
        .calibrate(probabilities.clone(), matrix.clone(), vec![design_total])
        .unwrap();
    let _other = driver
        .calibrate(probabilities.clone(), matrix.clone(), vec![2.0])
        .unwrap();
    let second = driver
        .calibrate(probabilities, matrix, vec![design_total])
        .unwrap();

    assert_eq!(first.weights, second.weights);
}
