//! Property-based tests for leaf-index prediction.
//!
//! Models are generated as LightGBM text with complete trees, random split
//! features, thresholds and missing-value handling.

use std::fmt::Write;
use std::num::NonZeroUsize;

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use lgbm_leaves::{GbdtModel, PredictConfig, Predictor};

// =============================================================================
// Arbitrary Model Generators
// =============================================================================

/// One split: feature, threshold, decision_type.
type Split = (usize, f64, u8);

#[derive(Debug, Clone)]
struct GeneratedModel {
    text: String,
    splits: Vec<Vec<Split>>,
    leaf_values: Vec<Vec<f64>>,
    rows: Vec<Vec<f64>>,
}

/// Render complete trees in LightGBM's text layout.
///
/// Internal node `i` has children `2i + 1` and `2i + 2`; children past the
/// last internal node are leaves numbered left to right.
fn render(splits: &[Vec<Split>], leaf_values: &[Vec<f64>], n_features: usize) -> String {
    let mut out = String::new();
    writeln!(out, "tree\nversion=v4\nnum_class=1\nnum_tree_per_iteration=1").unwrap();
    writeln!(out, "max_feature_idx={}\nobjective=regression\n", n_features - 1).unwrap();

    for (t, (tree_splits, values)) in splits.iter().zip(leaf_values).enumerate() {
        let n_splits = tree_splits.len();
        let child = |c: usize| -> i64 {
            if c < n_splits {
                c as i64
            } else {
                -((c - n_splits) as i64) - 1
            }
        };
        let join = |items: Vec<String>| items.join(" ");

        writeln!(out, "Tree={t}\nnum_leaves={}\nnum_cat=0", values.len()).unwrap();
        writeln!(out, "split_feature={}", join(tree_splits.iter().map(|s| s.0.to_string()).collect())).unwrap();
        writeln!(out, "threshold={}", join(tree_splits.iter().map(|s| s.1.to_string()).collect())).unwrap();
        writeln!(out, "decision_type={}", join(tree_splits.iter().map(|s| s.2.to_string()).collect())).unwrap();
        writeln!(out, "left_child={}", join((0..n_splits).map(|i| child(2 * i + 1).to_string()).collect())).unwrap();
        writeln!(out, "right_child={}", join((0..n_splits).map(|i| child(2 * i + 2).to_string()).collect())).unwrap();
        writeln!(out, "leaf_value={}\nshrinkage=1\n", join(values.iter().map(f64::to_string).collect())).unwrap();
    }
    out.push_str("end of trees\n");
    out
}

fn arb_feature_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        6 => -4.0f64..4.0,
        1 => Just(f64::NAN),
        1 => Just(0.0),
    ]
}

fn arb_model() -> impl Strategy<Value = GeneratedModel> {
    (1usize..6, 1u32..5, 1usize..6).prop_flat_map(|(n_trees, depth, n_features)| {
        let n_splits = (1usize << depth) - 1;
        let split = (
            0..n_features,
            -3.0f64..3.0,
            prop::sample::select(vec![0u8, 2, 4, 6, 8, 10]),
        );
        (
            prop_vec(prop_vec(split, n_splits), n_trees),
            prop_vec(prop_vec(-1.0f64..1.0, n_splits + 1), n_trees),
            prop_vec(prop_vec(arb_feature_value(), n_features), 1..40),
            Just(n_features),
        )
            .prop_map(|(splits, leaf_values, rows, n_features)| GeneratedModel {
                text: render(&splits, &leaf_values, n_features),
                splits,
                leaf_values,
                rows,
            })
    })
}

/// Walk a complete tree node by node with LightGBM's numeric decision rule.
fn reference_leaf(splits: &[Split], row: &[f64]) -> u32 {
    let n_splits = splits.len();
    let mut node = 0;
    while node < n_splits {
        let (feature, threshold, decision_type) = splits[node];
        let default_left = decision_type & 2 != 0;
        let missing_type = (decision_type >> 2) & 3;

        let mut value = row[feature];
        if value.is_nan() && missing_type != 2 {
            value = 0.0;
        }
        let go_left = if (missing_type == 1 && value.abs() <= 1e-35)
            || (missing_type == 2 && value.is_nan())
        {
            default_left
        } else {
            value <= threshold
        };
        node = if go_left { 2 * node + 1 } else { 2 * node + 2 };
    }
    (node - n_splits) as u32
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every full-length row reaches the leaf a direct walk of the tree reaches.
    #[test]
    fn every_row_reaches_the_expected_leaf(generated in arb_model()) {
        let model = GbdtModel::from_lightgbm_str(&generated.text).unwrap();
        let leaves = model.predict_leaf_indices(&generated.rows).unwrap();

        prop_assert_eq!(leaves.num_rows(), generated.rows.len());
        for (row, leaf_row) in generated.rows.iter().zip(leaves.rows()) {
            prop_assert_eq!(leaf_row.len(), generated.splits.len());
            for (tree, &leaf) in leaf_row.iter().enumerate() {
                prop_assert!((leaf as usize) < generated.leaf_values[tree].len());
                prop_assert_eq!(
                    leaf,
                    reference_leaf(&generated.splits[tree], row),
                    "tree {} row {:?}",
                    tree,
                    row
                );
            }
        }
    }

    /// Loading the same text twice gives identical leaf indices.
    #[test]
    fn prediction_is_deterministic(generated in arb_model()) {
        let first = GbdtModel::from_lightgbm_str(&generated.text).unwrap();
        let second = GbdtModel::from_lightgbm_str(&generated.text).unwrap();

        let a = first.predict_leaf_indices(&generated.rows).unwrap();
        let b = second.predict_leaf_indices(&generated.rows).unwrap();
        let c = first.predict_leaf_indices(&generated.rows).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&a, &c);
    }

    /// Raw scores are the sum of the reached leaves' values.
    #[test]
    fn raw_score_sums_reached_leaves(generated in arb_model()) {
        let model = GbdtModel::from_lightgbm_str(&generated.text).unwrap();
        let predictor = model.predictor();
        let leaves = predictor.predict_leaf_indices(&generated.rows).unwrap();
        let raw = predictor.predict_raw(&generated.rows).unwrap();

        for (leaf_row, score_row) in leaves.rows().zip(raw.rows()) {
            let expected: f64 = leaf_row
                .iter()
                .enumerate()
                .map(|(tree, &leaf)| generated.leaf_values[tree][leaf as usize])
                .sum();
            prop_assert!((score_row[0] - expected).abs() < 1e-9);
        }
    }

    /// Thread count and block size never change the output.
    #[test]
    fn parallel_matches_sequential(generated in arb_model(), block_size in 1usize..8) {
        let model = GbdtModel::from_lightgbm_str(&generated.text).unwrap();
        let sequential = model.predict_leaf_indices(&generated.rows).unwrap();

        let config = PredictConfig::builder()
            .n_threads(NonZeroUsize::new(3).unwrap())
            .block_size(block_size)
            .build()
            .unwrap();
        let parallel = Predictor::for_model(&model)
            .with_config(config)
            .predict_leaf_indices(&generated.rows)
            .unwrap();
        prop_assert_eq!(parallel, sequential);
    }
}
