//! Output transformation for inference.
//!
//! The [`OutputTransform`] enum defines how raw model outputs (margins)
//! are converted to final predictions. It is derived from the model's
//! objective string when the model is loaded.
//!
//! # Variants
//!
//! - [`Identity`](OutputTransform::Identity): No transformation (regression, raw margins)
//! - [`Sigmoid`](OutputTransform::Sigmoid): Scaled logistic sigmoid for binary classification
//! - [`Softmax`](OutputTransform::Softmax): Softmax for multiclass classification
//! - [`SigmoidPerClass`](OutputTransform::SigmoidPerClass): Independent sigmoid per class (one-vs-all)
//! - [`Exp`](OutputTransform::Exp): Exponential for log-link regression (poisson, gamma, tweedie)
//! - [`SignedSquare`](OutputTransform::SignedSquare): Undoes a square-root label transform
//! - [`Softplus`](OutputTransform::Softplus): `log(1 + exp(x))` for cross-entropy with lambda

use serde::{Deserialize, Serialize};

/// Inference-time output transformation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTransform {
    /// No transformation; output = margin.
    #[default]
    Identity,

    /// Logistic sigmoid: output = 1 / (1 + exp(-scale * margin)).
    Sigmoid { scale: f64 },

    /// Softmax: output_i = exp(margin_i) / sum(exp(margin_j)).
    Softmax,

    /// Sigmoid applied to every class independently.
    SigmoidPerClass { scale: f64 },

    /// Exponential: output = exp(margin).
    Exp,

    /// output = sign(margin) * margin^2.
    SignedSquare,

    /// output = ln(1 + exp(margin)).
    Softplus,
}

impl OutputTransform {
    /// Apply the transformation in-place to a row-major predictions buffer.
    ///
    /// # Arguments
    ///
    /// * `predictions` - Mutable slice of predictions, shape `(n_rows, n_outputs)` in row-major order.
    /// * `n_outputs` - Number of output columns (1 for regression/binary, n_classes for multiclass).
    ///
    /// # Numerical Stability
    ///
    /// - Sigmoid clamps the scaled input to [-500, 500] to avoid overflow.
    /// - Softmax subtracts the max per row before exponentiating.
    ///
    /// # Panics
    ///
    /// Panics if `predictions.len()` is not divisible by `n_outputs` or if `n_outputs` is 0.
    #[inline]
    pub fn transform_inplace(&self, predictions: &mut [f64], n_outputs: usize) {
        assert!(n_outputs > 0, "n_outputs must be > 0");
        assert!(
            predictions.len() % n_outputs == 0,
            "predictions.len() must be divisible by n_outputs"
        );

        match *self {
            OutputTransform::Identity => {}
            OutputTransform::Sigmoid { scale } | OutputTransform::SigmoidPerClass { scale } => {
                for x in predictions.iter_mut() {
                    *x = sigmoid(scale * *x);
                }
            }
            OutputTransform::Softmax => {
                for row in predictions.chunks_exact_mut(n_outputs) {
                    softmax_inplace(row);
                }
            }
            OutputTransform::Exp => {
                for x in predictions.iter_mut() {
                    *x = x.exp();
                }
            }
            OutputTransform::SignedSquare => {
                for x in predictions.iter_mut() {
                    *x = x.signum() * *x * *x;
                }
            }
            OutputTransform::Softplus => {
                for x in predictions.iter_mut() {
                    *x = softplus(*x);
                }
            }
        }
    }
}

/// Numerically stable sigmoid.
#[inline]
fn sigmoid(x: f64) -> f64 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + exp(x))` without overflow for large `x`.
#[inline]
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Numerically stable softmax in-place.
#[inline]
fn softmax_inplace(row: &mut [f64]) {
    if row.is_empty() {
        return;
    }

    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut sum = 0.0;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }

    if sum > 0.0 {
        for x in row.iter_mut() {
            *x /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_is_noop() {
        let mut preds = vec![1.0, -2.0, 3.5, 0.0];
        let original = preds.clone();
        OutputTransform::Identity.transform_inplace(&mut preds, 1);
        assert_eq!(preds, original);
    }

    #[test]
    fn sigmoid_zero_is_half() {
        let mut preds = vec![0.0];
        OutputTransform::Sigmoid { scale: 1.0 }.transform_inplace(&mut preds, 1);
        assert_abs_diff_eq!(preds[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_scale() {
        let mut scaled = vec![1.0];
        let mut doubled = vec![2.0];
        OutputTransform::Sigmoid { scale: 2.0 }.transform_inplace(&mut scaled, 1);
        OutputTransform::Sigmoid { scale: 1.0 }.transform_inplace(&mut doubled, 1);
        assert_abs_diff_eq!(scaled[0], doubled[0], epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[0], 1.0 / (1.0 + (-2.0f64).exp()), epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_large_values_stable() {
        let mut preds = vec![-1e6, 1e6, f64::NEG_INFINITY, f64::INFINITY];
        OutputTransform::Sigmoid { scale: 1.0 }.transform_inplace(&mut preds, 1);
        assert!(preds[0] < 1e-6 && preds[2] < 1e-6);
        assert!(preds[1] > 1.0 - 1e-6 && preds[3] > 1.0 - 1e-6);
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let mut preds = vec![
            1.0, 2.0, 3.0, // row 0
            0.0, 0.0, 0.0, // row 1 (uniform)
        ];
        OutputTransform::Softmax.transform_inplace(&mut preds, 3);

        assert_abs_diff_eq!(preds[0..3].iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(preds[0] < preds[1] && preds[1] < preds[2]);
        assert_abs_diff_eq!(preds[3], 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn softmax_large_values_stable() {
        let mut preds = vec![1000.0, 2000.0, 3000.0];
        OutputTransform::Softmax.transform_inplace(&mut preds, 3);
        assert_abs_diff_eq!(preds[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_per_class_is_independent() {
        let mut preds = vec![0.0, 0.0, 0.0];
        OutputTransform::SigmoidPerClass { scale: 1.0 }.transform_inplace(&mut preds, 3);
        assert_eq!(preds, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn exp_transform() {
        let mut preds = vec![0.0, 1.0];
        OutputTransform::Exp.transform_inplace(&mut preds, 1);
        assert_abs_diff_eq!(preds[0], 1.0);
        assert_abs_diff_eq!(preds[1], std::f64::consts::E, epsilon = 1e-12);
    }

    #[test]
    fn signed_square_keeps_sign() {
        let mut preds = vec![-3.0, 0.0, 1.5];
        OutputTransform::SignedSquare.transform_inplace(&mut preds, 1);
        assert_eq!(preds, vec![-9.0, 0.0, 2.25]);
    }

    #[test]
    fn softplus_transform() {
        let mut preds = vec![0.0, 1.0, -1.0, 1000.0];
        OutputTransform::Softplus.transform_inplace(&mut preds, 1);
        assert_abs_diff_eq!(preds[0], std::f64::consts::LN_2, epsilon = 1e-12);
        assert_abs_diff_eq!(preds[1], (1.0 + 1f64.exp()).ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(preds[2], (1.0 + (-1f64).exp()).ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(preds[3], 1000.0, epsilon = 1e-9);
    }

    #[test]
    #[should_panic(expected = "n_outputs must be > 0")]
    fn panics_on_zero_n_outputs() {
        let mut preds = vec![];
        OutputTransform::Identity.transform_inplace(&mut preds, 0);
    }

    #[test]
    #[should_panic(expected = "predictions.len() must be divisible by n_outputs")]
    fn panics_on_mismatched_length() {
        let mut preds = vec![1.0, 2.0, 3.0];
        OutputTransform::Softmax.transform_inplace(&mut preds, 2);
    }
}
