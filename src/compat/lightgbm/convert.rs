//! Conversion from LightGBM parsed types to native types.

use crate::model::{GbdtModel, ModelMeta, OutputTransform, TaskKind};
use crate::repr::gbdt::{Comparison, Forest, MutableTree, NodeId, Tree};

use super::text::{DecisionType, LgbModel, LgbTree, ParseError};

impl LgbModel {
    /// Convert to a native [`Forest`].
    ///
    /// Every tree is checked structurally: feature indices must lie in
    /// `0..=max_feature_idx`, child references must exist, and every node
    /// must be reached exactly once from the root.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let model = LgbModel::from_file("model.txt")?;
    /// let forest = model.to_forest()?;
    /// let leaves = forest.predict_leaf_indices(&features)?;
    /// ```
    pub fn to_forest(&self) -> Result<Forest, ParseError> {
        let n_groups = self.header.num_tree_per_iteration.max(1);
        let mut forest = Forest::new(n_groups as u32);

        let n_linear = self.trees.iter().filter(|t| t.is_linear).count();
        if n_linear > 0 {
            tracing::warn!(
                n_linear,
                "linear leaf models are ignored, leaves use their constant values"
            );
        }

        // Trees are laid out as tree[iteration * n_groups + group].
        for (tree_idx, lgb_tree) in self.trees.iter().enumerate() {
            let tree = convert_tree(lgb_tree, tree_idx, self.header.max_feature_idx)?;
            forest
                .push_tree(tree, (tree_idx % n_groups) as u32)
                .map_err(|source| ParseError::InvalidTree {
                    tree: tree_idx,
                    source,
                })?;
        }

        tracing::debug!(
            n_trees = forest.n_trees(),
            n_groups,
            "converted LightGBM trees"
        );

        Ok(forest)
    }

    /// Convert to a [`GbdtModel`] carrying the forest and model metadata.
    pub fn to_model(&self) -> Result<GbdtModel, ParseError> {
        let forest = self.to_forest()?;
        let header = &self.header;

        let (task, transform) = match &header.objective {
            Some(objective) => (objective.task(), objective.transform()),
            None => (TaskKind::Regression, OutputTransform::Identity),
        };

        let meta = ModelMeta {
            feature_names: (!header.feature_names.is_empty())
                .then(|| header.feature_names.clone()),
            n_features: self.num_features(),
            n_groups: forest.n_groups() as usize,
            trees_per_iteration: header.num_tree_per_iteration.max(1),
            task,
            transform,
            average_output: header.average_output,
            objective: header.objective_str.clone(),
        };

        Ok(GbdtModel::from_forest(forest, meta))
    }
}

/// Convert a single LightGBM tree to canonical [`Tree`].
///
/// LightGBM stores internal nodes `0..num_leaves-1` and refers to leaves
/// with negative child values (`leaf = !child`). Leaves are placed after the
/// internal nodes: leaf `k` becomes node `num_splits + k` with leaf index `k`.
fn convert_tree(
    lgb_tree: &LgbTree,
    tree_idx: usize,
    max_feature_idx: usize,
) -> Result<Tree, ParseError> {
    let num_splits = lgb_tree.num_splits();
    let total_nodes = num_splits + lgb_tree.num_leaves;

    let mut tree = MutableTree::with_capacity(total_nodes);
    tree.init_root_with_num_nodes(total_nodes);

    if num_splits == 0 {
        let value = lgb_tree.leaf_value.first().copied().unwrap_or(0.0);
        tree.make_leaf(0, 0, value);
        return Ok(tree.freeze());
    }

    for node_idx in 0..num_splits {
        let feature = feature_index(lgb_tree, tree_idx, node_idx, max_feature_idx)?;
        let child = |raw: i32| convert_child_ref(raw, lgb_tree, tree_idx, node_idx);
        let left = child(lgb_tree.left_child[node_idx])?;
        let right = child(lgb_tree.right_child[node_idx])?;
        let dt = DecisionType::from_i8(lgb_tree.decision_type[node_idx]);
        let threshold = lgb_tree.threshold[node_idx];

        if dt.is_categorical {
            let bitset = categorical_bitset(lgb_tree, threshold).ok_or_else(|| {
                ParseError::InvalidValue {
                    field: "cat_threshold",
                    message: format!(
                        "tree {tree_idx}: node {node_idx} refers to missing category slot {threshold}"
                    ),
                }
            })?;
            tree.set_categorical_split(node_idx as NodeId, feature, bitset, left, right);
        } else {
            tree.set_numeric_split(
                node_idx as NodeId,
                feature,
                threshold,
                Comparison::LessOrEqual,
                dt.missing_type,
                dt.default_left,
                left,
                right,
            );
        }
    }

    // Leaf values already include shrinkage.
    for (leaf_idx, &value) in lgb_tree.leaf_value.iter().enumerate() {
        tree.make_leaf((num_splits + leaf_idx) as NodeId, leaf_idx as u32, value);
    }

    Ok(tree.freeze())
}

fn feature_index(
    lgb_tree: &LgbTree,
    tree: usize,
    node: usize,
    max_feature_idx: usize,
) -> Result<u32, ParseError> {
    let raw = lgb_tree.split_feature[node];
    let feature = usize::try_from(raw).map_err(|_| ParseError::NegativeFeatureIndex {
        tree,
        node,
        feature: raw,
    })?;
    if feature > max_feature_idx {
        return Err(ParseError::FeatureOutOfRange {
            tree,
            node,
            feature,
            max_feature_idx,
        });
    }
    Ok(feature as u32)
}

/// Map a LightGBM child reference to a node id.
///
/// Internal nodes keep their index; leaf `!child` becomes `num_splits + !child`.
fn convert_child_ref(
    child: i32,
    lgb_tree: &LgbTree,
    tree: usize,
    node: usize,
) -> Result<NodeId, ParseError> {
    let num_splits = lgb_tree.num_splits();
    let target = if child < 0 {
        let leaf_idx = !child as usize;
        (leaf_idx < lgb_tree.num_leaves).then_some(num_splits + leaf_idx)
    } else {
        let idx = child as usize;
        (idx < num_splits).then_some(idx)
    };
    target
        .map(|t| t as NodeId)
        .ok_or(ParseError::InvalidChild { tree, node, child })
}

/// Bitset words for a categorical node whose threshold holds its slot index.
fn categorical_bitset(lgb_tree: &LgbTree, threshold: f64) -> Option<Vec<u32>> {
    if threshold < 0.0 || threshold.fract() != 0.0 {
        return None;
    }
    lgb_tree
        .categorical_bitset(threshold as usize)
        .map(<[u32]>::to_vec)
}
