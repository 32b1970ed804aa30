//! Shared utilities for benchmarks.

#![allow(dead_code)]

use std::fmt::Write;

use rand::prelude::*;

/// Generate random dense row-major input in `[-5, 5)`.
pub fn generate_random_input(num_rows: usize, num_features: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_rows * num_features)
        .map(|_| rng.gen::<f64>() * 10.0 - 5.0)
        .collect()
}

/// Build a LightGBM text model of `n_trees` complete trees of the given depth.
///
/// Internal node `i` has children `2i + 1` and `2i + 2`; children past the
/// last internal node are leaves.
pub fn synthetic_lightgbm_model(n_trees: usize, depth: u32, num_features: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_splits = (1usize << depth) - 1;
    let n_leaves = n_splits + 1;

    let mut out = String::new();
    let _ = writeln!(out, "tree\nversion=v4\nnum_class=1\nnum_tree_per_iteration=1");
    let _ = writeln!(out, "label_index=0\nmax_feature_idx={}", num_features - 1);
    let _ = writeln!(out, "objective=regression\n");

    let child = |c: usize| -> i64 {
        if c < n_splits {
            c as i64
        } else {
            -((c - n_splits) as i64) - 1
        }
    };
    let join = |values: Vec<String>| values.join(" ");

    for t in 0..n_trees {
        let features: Vec<String> = (0..n_splits)
            .map(|_| rng.gen_range(0..num_features).to_string())
            .collect();
        let thresholds: Vec<String> = (0..n_splits)
            .map(|_| format!("{:.6}", rng.gen::<f64>() * 10.0 - 5.0))
            .collect();
        let leaf_values: Vec<String> = (0..n_leaves)
            .map(|_| format!("{:.6}", rng.gen::<f64>() - 0.5))
            .collect();

        let _ = writeln!(out, "Tree={t}\nnum_leaves={n_leaves}\nnum_cat=0");
        let _ = writeln!(out, "split_feature={}", join(features));
        let _ = writeln!(out, "threshold={}", join(thresholds));
        let _ = writeln!(out, "decision_type={}", join(vec!["2".to_string(); n_splits]));
        let _ = writeln!(
            out,
            "left_child={}",
            join((0..n_splits).map(|i| child(2 * i + 1).to_string()).collect())
        );
        let _ = writeln!(
            out,
            "right_child={}",
            join((0..n_splits).map(|i| child(2 * i + 2).to_string()).collect())
        );
        let _ = writeln!(out, "leaf_value={}\nshrinkage=0.1\n", join(leaf_values));
    }
    out.push_str("end of trees\n");
    out
}
