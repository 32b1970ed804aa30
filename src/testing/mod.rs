//! Testing utilities for lgbm-leaves.
//!
//! Assertion helpers and test-case loaders shared by unit and integration
//! tests.
//!
//! ```ignore
//! use lgbm_leaves::testing::{assert_predictions_eq, DEFAULT_TOLERANCE};
//! ```

mod cases;

pub use cases::{TestExpected, TestInput};

use crate::inference::common::PredictionOutput;
use approx::AbsDiffEq;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f64 values are approximately equal.
///
/// Uses absolute difference comparison with the given tolerance.
///
/// # Examples
///
/// ```
/// # use lgbm_leaves::assert_approx_eq_f64;
/// assert_approx_eq_f64!(1.0f64, 1.0001f64, 0.001);
/// ```
#[macro_export]
macro_rules! assert_approx_eq_f64 {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f64 = $left;
        let right_val: f64 = $right;
        let tol: f64 = $tolerance;
        let diff = (left_val - right_val).abs();
        if diff > tol {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

/// Assert that two f64 slices are approximately equal element-wise.
///
/// # Panics
///
/// Panics if lengths differ or any element differs by more than tolerance.
pub fn assert_slice_approx_eq_f64(actual: &[f64], expected: &[f64], tolerance: f64, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let diff = (a - e).abs();
        assert!(
            diff <= tolerance,
            "{context}[{i}]: {a} ≠ {e} (diff={diff}, tolerance={tolerance})"
        );
    }
}

// =============================================================================
// Prediction Assertions
// =============================================================================

/// Render the rows that differ as `-` (expected) and `+` (actual) lines.
fn diff_predictions(actual: &PredictionOutput, expected: &PredictionOutput, epsilon: f64) -> String {
    let mut result = String::new();
    let (rows, cols) = actual.shape();

    result.push_str(&format!("Shape: ({rows}, {cols})\n"));
    result.push_str(&format!("Epsilon: {epsilon:.0e}\n\n"));

    for (i, (act_row, exp_row)) in actual.rows().zip(expected.rows()).enumerate() {
        let row_differs = act_row
            .iter()
            .zip(exp_row.iter())
            .any(|(a, e)| !a.abs_diff_eq(e, epsilon));
        if !row_differs {
            continue;
        }

        result.push_str(&format!("[{i:3}] -"));
        for val in exp_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (expected)\n      +");
        for val in act_row {
            result.push_str(&format!(" {val:>12.6}"));
        }
        result.push_str("  (actual)\n");
    }

    result
}

/// Assert that two [`PredictionOutput`]s are approximately equal.
///
/// On failure, shows a diff of the differing rows.
pub fn assert_predictions_eq(actual: &PredictionOutput, expected: &PredictionOutput, context: &str) {
    assert_predictions_eq_eps(actual, expected, DEFAULT_TOLERANCE, context);
}

/// Assert that two [`PredictionOutput`]s are approximately equal with custom epsilon.
///
/// # Panics
///
/// Panics if shapes differ or if any value differs by more than epsilon.
pub fn assert_predictions_eq_eps(
    actual: &PredictionOutput,
    expected: &PredictionOutput,
    epsilon: f64,
    context: &str,
) {
    if actual.shape() != expected.shape() {
        panic!(
            "\n{context}: shape mismatch\n- {:?}  (expected)\n+ {:?}  (actual)\n",
            expected.shape(),
            actual.shape()
        );
    }

    if !actual.abs_diff_eq(expected, epsilon) {
        let diff_count = actual
            .as_slice()
            .iter()
            .zip(expected.as_slice().iter())
            .filter(|(a, e)| !a.abs_diff_eq(e, epsilon))
            .count();
        let total = actual.as_slice().len();
        let diff_output = diff_predictions(actual, expected, epsilon);

        panic!("\n{context}: {diff_count}/{total} values differ\n\n{diff_output}");
    }
}

/// Assert that a prediction output matches nested expected rows.
pub fn assert_batch_predictions_match(
    actual: &PredictionOutput,
    expected: &[Vec<f64>],
    tolerance: f64,
    context: &str,
) {
    let num_cols = expected.first().map_or(actual.num_groups(), Vec::len);
    let flat: Vec<f64> = expected.iter().flatten().copied().collect();
    let expected_output = PredictionOutput::new(flat, expected.len(), num_cols);
    assert_predictions_eq_eps(actual, &expected_output, tolerance, context);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_macro() {
        assert_approx_eq_f64!(1.0, 1.0001, 0.001);
        assert_approx_eq_f64!(-1.5, -1.5001, 0.001, "with message {}", 1);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn approx_eq_macro_fails() {
        assert_approx_eq_f64!(1.0, 2.0, 0.1);
    }

    #[test]
    fn slice_approx_eq() {
        assert_slice_approx_eq_f64(&[1.0, 2.0], &[1.0 + 1e-12, 2.0], 1e-9, "test");
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn slice_length_mismatch() {
        assert_slice_approx_eq_f64(&[1.0], &[1.0, 2.0], 1e-9, "test");
    }

    #[test]
    fn predictions_eq() {
        let a = PredictionOutput::new(vec![1.0, 2.0, 3.0], 3, 1);
        let b = PredictionOutput::new(vec![1.0, 2.0, 3.0 + 1e-12], 3, 1);
        assert_predictions_eq(&a, &b, "test");
    }

    #[test]
    #[should_panic(expected = "1/4 values differ")]
    fn predictions_eq_reports_diff() {
        let a = PredictionOutput::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let b = PredictionOutput::new(vec![1.0, 2.0, 3.0, 5.0], 2, 2);
        assert_predictions_eq(&a, &b, "test");
    }

    #[test]
    #[should_panic(expected = "shape mismatch")]
    fn predictions_shape_mismatch() {
        let a = PredictionOutput::new(vec![1.0, 2.0], 2, 1);
        let b = PredictionOutput::new(vec![1.0, 2.0], 1, 2);
        assert_predictions_eq(&a, &b, "test");
    }

    #[test]
    fn batch_predictions_match() {
        let actual = PredictionOutput::new(vec![0.1, 0.9, 0.3, 0.7], 2, 2);
        assert_batch_predictions_match(
            &actual,
            &[vec![0.1, 0.9], vec![0.3, 0.7]],
            1e-12,
            "batch",
        );
    }
}
