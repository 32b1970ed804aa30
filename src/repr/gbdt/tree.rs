//! Canonical tree representation (SoA) and mutable construction API.
//!
//! This module provides:
//! - [`Tree`]: Immutable SoA tree storage for efficient traversal
//! - [`MutableTree`]: Builder used by model loaders and tests
//!
//! Nodes are addressed by [`NodeId`] (index into the SoA arrays, 0 = root).
//! Children are owned by the tree: a node refers to them by index only, and
//! [`Tree::validate`] checks that every node is reached exactly once from the
//! root.

// Conversion code sets every field of a split in one call.
#![allow(clippy::too_many_arguments)]

use super::categories::CategoriesStorage;
use super::node::{Comparison, MissingType, SplitCondition, SplitType};
use super::NodeId;
use crate::inference::gbdt::{traverse_to_leaf, IndexError};

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node {node}: {side} child {child} is out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
    #[error("leaf index {leaf_index} is used by more than one leaf (node {node})")]
    DuplicateLeafIndex { node: NodeId, leaf_index: u32 },
    #[error("category segments cover {segments_len} nodes, tree has {n_nodes}")]
    CategoricalSegmentsLenMismatch {
        segments_len: usize,
        n_nodes: usize,
    },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage for efficient traversal.
///
/// Stores tree nodes in flat arrays for cache-friendly traversal.
/// Child indices are local to this tree (0 = root). Leaves carry the
/// leaf index assigned by the model file and the leaf's output value.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f64]>,
    comparisons: Box<[Comparison]>,
    missing_types: Box<[MissingType]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_indices: Box<[u32]>,
    leaf_values: Box<[f64]>,
    split_types: Box<[SplitType]>,
    categories: CategoriesStorage,
}

impl Tree {
    /// Number of nodes in this tree (internal nodes and leaves).
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    /// Check if a node is a leaf.
    #[inline]
    pub fn is_leaf(&self, node_idx: NodeId) -> bool {
        self.is_leaf[node_idx as usize]
    }

    /// Get split feature index for a node.
    #[inline]
    pub fn split_index(&self, node_idx: NodeId) -> u32 {
        self.split_indices[node_idx as usize]
    }

    /// Get split threshold for a node.
    #[inline]
    pub fn split_threshold(&self, node_idx: NodeId) -> f64 {
        self.split_thresholds[node_idx as usize]
    }

    /// Get the comparison direction for a numeric split.
    #[inline]
    pub fn comparison(&self, node_idx: NodeId) -> Comparison {
        self.comparisons[node_idx as usize]
    }

    /// Get the missing value handling of a split.
    #[inline]
    pub fn missing_type(&self, node_idx: NodeId) -> MissingType {
        self.missing_types[node_idx as usize]
    }

    /// Get left child index.
    #[inline]
    pub fn left_child(&self, node_idx: NodeId) -> NodeId {
        self.left_children[node_idx as usize]
    }

    /// Get right child index.
    #[inline]
    pub fn right_child(&self, node_idx: NodeId) -> NodeId {
        self.right_children[node_idx as usize]
    }

    /// Get default direction for missing values.
    #[inline]
    pub fn default_left(&self, node_idx: NodeId) -> bool {
        self.default_left[node_idx as usize]
    }

    /// Get split type for a node.
    #[inline]
    pub fn split_type(&self, node_idx: NodeId) -> SplitType {
        self.split_types[node_idx as usize]
    }

    /// Leaf index of a leaf node.
    #[inline]
    pub fn leaf_index(&self, node_idx: NodeId) -> u32 {
        self.leaf_indices[node_idx as usize]
    }

    /// Output value of a leaf node.
    #[inline]
    pub fn leaf_value(&self, node_idx: NodeId) -> f64 {
        self.leaf_values[node_idx as usize]
    }

    /// Get reference to categories storage.
    #[inline]
    pub fn categories(&self) -> &CategoriesStorage {
        &self.categories
    }

    /// Split condition of an internal node, `None` for leaves.
    pub fn split_condition(&self, node_idx: NodeId) -> Option<SplitCondition> {
        if self.is_leaf(node_idx) {
            return None;
        }
        Some(SplitCondition {
            feature: self.split_index(node_idx),
            threshold: self.split_threshold(node_idx),
            comparison: self.comparison(node_idx),
            split_type: self.split_type(node_idx),
            missing: self.missing_type(node_idx),
            default_left: self.default_left(node_idx),
        })
    }

    /// Largest feature index read by any internal node.
    pub fn max_feature_index(&self) -> Option<u32> {
        self.split_indices
            .iter()
            .zip(self.is_leaf.iter())
            .filter(|(_, &leaf)| !leaf)
            .map(|(&feature, _)| feature)
            .max()
    }

    /// Depth of the deepest leaf (a single-leaf tree has depth 0).
    ///
    /// Only meaningful for trees that pass [`validate`](Self::validate).
    pub fn max_depth(&self) -> usize {
        if self.n_nodes() == 0 {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack: Vec<(NodeId, usize)> = vec![(0, 0)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    /// Traverse the tree and return the leaf index reached by `row`.
    pub fn predict_leaf_index(&self, row: &[f64]) -> Result<u32, IndexError> {
        traverse_to_leaf(self, row).map(|leaf| self.leaf_index(leaf))
    }

    /// Traverse the tree and return the output value of the leaf reached by `row`.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, IndexError> {
        traverse_to_leaf(self, row).map(|leaf| self.leaf_value(leaf))
    }

    /// Validate structural invariants: every internal node has two in-bounds
    /// children, every node is reached exactly once from the root, and leaf
    /// indices are unique.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let has_cat_split = self
            .split_types
            .iter()
            .zip(self.is_leaf.iter())
            .any(|(t, &leaf)| !leaf && matches!(t, SplitType::Categorical));
        if has_cat_split {
            let segments_len = self.categories.segments().len();
            if segments_len != n_nodes {
                return Err(TreeValidationError::CategoricalSegmentsLenMismatch {
                    segments_len,
                    n_nodes,
                });
            }
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, u8)> = vec![(0, 0)];

        while let Some((node, phase)) = stack.pop() {
            let node_usize = node as usize;

            if phase == 1 {
                color[node_usize] = 2;
                continue;
            }

            match color[node_usize] {
                0 => {}
                1 => return Err(TreeValidationError::CycleDetected { node }),
                _ => return Err(TreeValidationError::DuplicateVisit { node }),
            }

            color[node_usize] = 1;
            stack.push((node, 1));

            if self.is_leaf(node) {
                continue;
            }

            let left = self.left_child(node);
            let right = self.right_child(node);
            if left == node || right == node {
                return Err(TreeValidationError::SelfLoop { node });
            }
            for (side, child) in [("left", left), ("right", right)] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
            }

            stack.push((right, 0));
            stack.push((left, 0));
        }

        if let Some(node) = color.iter().position(|&c| c == 0) {
            return Err(TreeValidationError::UnreachableNode { node: node as NodeId });
        }

        let mut seen = std::collections::HashSet::new();
        for node in (0..n_nodes as NodeId).filter(|&n| self.is_leaf(n)) {
            let leaf_index = self.leaf_index(node);
            if !seen.insert(leaf_index) {
                return Err(TreeValidationError::DuplicateLeafIndex { node, leaf_index });
            }
        }

        Ok(())
    }
}

// =============================================================================
// MutableTree
// =============================================================================

/// Mutable tree used while constructing a [`Tree`].
///
/// Supports two patterns: allocate nodes on demand with the `apply_*` methods,
/// or pre-allocate all nodes with [`init_root_with_num_nodes`](Self::init_root_with_num_nodes)
/// and fill them in with the `set_*` methods (model loaders, where child
/// indices are already known).
#[derive(Debug, Clone)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f64>,
    comparisons: Vec<Comparison>,
    missing_types: Vec<MissingType>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_indices: Vec<u32>,
    leaf_values: Vec<f64>,
    split_types: Vec<SplitType>,
    /// Categorical data: (node_idx, category_bitset)
    categorical_nodes: Vec<(NodeId, Vec<u32>)>,
    next_id: NodeId,
}

impl Default for MutableTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MutableTree {
    /// Create a new mutable tree.
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// Create a tree with capacity hint.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            split_indices: Vec::with_capacity(capacity),
            split_thresholds: Vec::with_capacity(capacity),
            comparisons: Vec::with_capacity(capacity),
            missing_types: Vec::with_capacity(capacity),
            left_children: Vec::with_capacity(capacity),
            right_children: Vec::with_capacity(capacity),
            default_left: Vec::with_capacity(capacity),
            is_leaf: Vec::with_capacity(capacity),
            leaf_indices: Vec::with_capacity(capacity),
            leaf_values: Vec::with_capacity(capacity),
            split_types: Vec::with_capacity(capacity),
            categorical_nodes: Vec::new(),
            next_id: 0,
        }
    }

    /// Initialize the root node as a placeholder.
    ///
    /// Returns the root node ID (always 0).
    pub fn init_root(&mut self) -> NodeId {
        self.reset();
        self.allocate_node();
        0
    }

    /// Initialize the tree with a fixed number of placeholder nodes.
    ///
    /// Returns the root node ID (0).
    pub fn init_root_with_num_nodes(&mut self, num_nodes: usize) -> NodeId {
        self.reset();
        for _ in 0..num_nodes {
            self.allocate_node();
        }
        0
    }

    /// Apply a numeric split to a node, allocating child nodes.
    ///
    /// Returns `(left_id, right_id)`.
    pub fn apply_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f64,
        comparison: Comparison,
        missing: MissingType,
        default_left: bool,
    ) -> (NodeId, NodeId) {
        let left_id = self.allocate_node();
        let right_id = self.allocate_node();
        self.set_numeric_split(
            node,
            feature,
            threshold,
            comparison,
            missing,
            default_left,
            left_id,
            right_id,
        );
        (left_id, right_id)
    }

    /// Set a numeric split on an existing node, with explicit child indices.
    pub fn set_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f64,
        comparison: Comparison,
        missing: MissingType,
        default_left: bool,
        left_child: NodeId,
        right_child: NodeId,
    ) {
        let idx = node as usize;
        self.split_indices[idx] = feature;
        self.split_thresholds[idx] = threshold;
        self.comparisons[idx] = comparison;
        self.missing_types[idx] = missing;
        self.left_children[idx] = left_child;
        self.right_children[idx] = right_child;
        self.default_left[idx] = default_left;
        self.is_leaf[idx] = false;
        self.split_types[idx] = SplitType::Numeric;
        self.categorical_nodes.retain(|(n, _)| *n != node);
    }

    /// Apply a categorical split to a node, allocating child nodes.
    ///
    /// Categories in `category_bitset` go LEFT. Returns `(left_id, right_id)`.
    pub fn apply_categorical_split(
        &mut self,
        node: NodeId,
        feature: u32,
        category_bitset: Vec<u32>,
    ) -> (NodeId, NodeId) {
        let left_id = self.allocate_node();
        let right_id = self.allocate_node();
        self.set_categorical_split(node, feature, category_bitset, left_id, right_id);
        (left_id, right_id)
    }

    /// Set a categorical split on an existing node, with explicit child indices.
    pub fn set_categorical_split(
        &mut self,
        node: NodeId,
        feature: u32,
        category_bitset: Vec<u32>,
        left_child: NodeId,
        right_child: NodeId,
    ) {
        let idx = node as usize;
        self.split_indices[idx] = feature;
        self.split_thresholds[idx] = 0.0;
        self.missing_types[idx] = MissingType::None;
        self.left_children[idx] = left_child;
        self.right_children[idx] = right_child;
        self.default_left[idx] = false;
        self.is_leaf[idx] = false;
        self.split_types[idx] = SplitType::Categorical;

        self.categorical_nodes.retain(|(n, _)| *n != node);
        self.categorical_nodes.push((node, category_bitset));
    }

    /// Set a node as a leaf with the given leaf index and value.
    pub fn make_leaf(&mut self, node: NodeId, leaf_index: u32, value: f64) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_indices[idx] = leaf_index;
        self.leaf_values[idx] = value;
        self.categorical_nodes.retain(|(n, _)| *n != node);
    }

    /// Current number of allocated nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    /// Reset the tree for reuse.
    pub fn reset(&mut self) {
        self.split_indices.clear();
        self.split_thresholds.clear();
        self.comparisons.clear();
        self.missing_types.clear();
        self.left_children.clear();
        self.right_children.clear();
        self.default_left.clear();
        self.is_leaf.clear();
        self.leaf_indices.clear();
        self.leaf_values.clear();
        self.split_types.clear();
        self.categorical_nodes.clear();
        self.next_id = 0;
    }

    /// Finalize the tree and return immutable storage.
    pub fn freeze(self) -> Tree {
        let categories = if self.categorical_nodes.is_empty() {
            CategoriesStorage::empty()
        } else {
            let mut cat_nodes = self.categorical_nodes;
            cat_nodes.sort_by_key(|(idx, _)| *idx);

            let mut segments = vec![(0u32, 0u32); self.split_indices.len()];
            let mut bitsets = Vec::new();
            for (node_idx, bitset) in cat_nodes {
                let start = bitsets.len() as u32;
                segments[node_idx as usize] = (start, bitset.len() as u32);
                bitsets.extend(bitset);
            }

            CategoriesStorage::new(bitsets, segments)
        };

        Tree {
            split_indices: self.split_indices.into_boxed_slice(),
            split_thresholds: self.split_thresholds.into_boxed_slice(),
            comparisons: self.comparisons.into_boxed_slice(),
            missing_types: self.missing_types.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            default_left: self.default_left.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_indices: self.leaf_indices.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
            split_types: self.split_types.into_boxed_slice(),
            categories,
        }
    }

    fn allocate_node(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;

        self.split_indices.push(0);
        self.split_thresholds.push(0.0);
        self.comparisons.push(Comparison::default());
        self.missing_types.push(MissingType::None);
        self.left_children.push(0);
        self.right_children.push(0);
        self.default_left.push(false);
        self.is_leaf.push(false);
        self.leaf_indices.push(0);
        self.leaf_values.push(0.0);
        self.split_types.push(SplitType::Numeric);

        id
    }
}
