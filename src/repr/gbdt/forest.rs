//! Canonical forest representation (collection of trees).

use super::{Tree, TreeValidationError};
use crate::inference::gbdt::IndexError;

/// Forest of decision trees.
///
/// Tree order is significant: the tree index is the column index of leaf
/// outputs. Each tree is assigned to an output group (class) for raw scores.
///
/// Every tree is validated on insertion, so traversal always terminates.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    n_groups: u32,
}

impl Forest {
    /// Create a new forest with the given number of groups.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups,
        }
    }

    /// Create a forest with a single output group.
    pub fn for_regression() -> Self {
        Self::new(1)
    }

    /// Add a tree to the forest.
    ///
    /// # Errors
    ///
    /// The tree is rejected if [`Tree::validate`] fails (cycles, shared or
    /// unreachable nodes, dangling children, duplicate leaf indices).
    pub fn push_tree(&mut self, tree: Tree, group: u32) -> Result<(), TreeValidationError> {
        debug_assert!(group < self.n_groups, "group out of range");
        tree.validate()?;
        self.trees.push(tree);
        self.tree_groups.push(group);
        Ok(())
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Get the group assignment for a tree.
    #[inline]
    pub fn tree_group(&self, idx: usize) -> u32 {
        self.tree_groups[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Iterate over trees with their group assignments.
    pub fn trees_with_groups(&self) -> impl Iterator<Item = (&Tree, u32)> {
        self.trees
            .iter()
            .zip(self.tree_groups.iter())
            .map(|(t, &g)| (t, g))
    }

    /// Minimum row length that can never raise an [`IndexError`]:
    /// one past the largest feature index any node reads.
    pub fn required_features(&self) -> usize {
        self.trees
            .iter()
            .filter_map(Tree::max_feature_index)
            .max()
            .map_or(0, |f| f as usize + 1)
    }

    /// Leaf index reached in every tree, in tree order.
    pub fn predict_leaf_indices(&self, row: &[f64]) -> Result<Vec<u32>, IndexError> {
        self.trees
            .iter()
            .enumerate()
            .map(|(idx, tree)| tree.predict_leaf_index(row).map_err(|e| e.in_tree(idx)))
            .collect()
    }

    /// Raw score for a single row: the summed leaf values of each group's trees.
    pub fn predict_row(&self, row: &[f64]) -> Result<Vec<f64>, IndexError> {
        let mut output = vec![0.0; self.n_groups as usize];
        for (idx, (tree, group)) in self.trees_with_groups().enumerate() {
            output[group as usize] += tree.predict_row(row).map_err(|e| e.in_tree(idx))?;
        }
        Ok(output)
    }
}
