//! Root-to-leaf traversal.
//!
//! [`traverse_to_leaf`] is the single decision routine used by every
//! prediction path. It follows LightGBM's decision rules:
//!
//! - Numeric split, missing type `NaN`: NaN takes the default direction.
//! - Numeric split, missing type `Zero`: NaN is read as 0.0, and values within
//!   [`ZERO_THRESHOLD`](crate::repr::gbdt::ZERO_THRESHOLD) of zero take the
//!   default direction.
//! - Numeric split, missing type `None`: NaN is read as 0.0.
//! - Otherwise the node's [`Comparison`](crate::repr::gbdt::Comparison) decides.
//! - Categorical split: NaN and negative categories go right; categories in
//!   the node's bitset go left; everything else goes right.

use crate::repr::gbdt::{is_zero, MissingType, NodeId, SplitType, Tree};

/// A row is too short for a feature index a visited node reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("row {row} has {row_len} features, but tree {tree} splits on feature {feature}")]
pub struct IndexError {
    /// Row position in the batch (0 for single-row calls).
    pub row: usize,
    /// Tree position in the forest.
    pub tree: usize,
    /// Feature index the node reads.
    pub feature: usize,
    /// Length of the offending row.
    pub row_len: usize,
}

impl IndexError {
    pub(crate) fn new(feature: usize, row_len: usize) -> Self {
        Self {
            row: 0,
            tree: 0,
            feature,
            row_len,
        }
    }

    /// Attach the tree position.
    #[inline]
    pub fn in_tree(mut self, tree: usize) -> Self {
        self.tree = tree;
        self
    }

    /// Attach the row position.
    #[inline]
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }
}

/// Walk `tree` from the root and return the leaf node reached by `row`.
///
/// Terminates in at most `max_depth` steps for trees that pass
/// [`Tree::validate`]. Only the features on the visited path must be present.
#[inline]
pub fn traverse_to_leaf(tree: &Tree, row: &[f64]) -> Result<NodeId, IndexError> {
    let mut idx: NodeId = 0;

    while !tree.is_leaf(idx) {
        let feature = tree.split_index(idx) as usize;
        let fvalue = *row
            .get(feature)
            .ok_or_else(|| IndexError::new(feature, row.len()))?;

        idx = if goes_left(tree, idx, fvalue) {
            tree.left_child(idx)
        } else {
            tree.right_child(idx)
        };
    }

    Ok(idx)
}

#[inline]
fn goes_left(tree: &Tree, node: NodeId, fvalue: f64) -> bool {
    match tree.split_type(node) {
        SplitType::Numeric => numerical_goes_left(tree, node, fvalue),
        SplitType::Categorical => categorical_goes_left(tree, node, fvalue),
    }
}

#[inline]
fn numerical_goes_left(tree: &Tree, node: NodeId, fvalue: f64) -> bool {
    let missing = tree.missing_type(node);
    let fvalue = if fvalue.is_nan() && missing != MissingType::NaN {
        0.0
    } else {
        fvalue
    };

    let is_missing = match missing {
        MissingType::None => false,
        MissingType::Zero => is_zero(fvalue),
        MissingType::NaN => fvalue.is_nan(),
    };

    if is_missing {
        tree.default_left(node)
    } else {
        tree.comparison(node)
            .goes_left(fvalue, tree.split_threshold(node))
    }
}

#[inline]
fn categorical_goes_left(tree: &Tree, node: NodeId, fvalue: f64) -> bool {
    if fvalue.is_nan() {
        return false;
    }
    // Truncation toward zero, like a C integer cast: -0.5 is category 0.
    let category = fvalue as i64;
    if category < 0 || category > u32::MAX as i64 {
        return false;
    }
    tree.categories().category_goes_left(node, category as u32)
}
