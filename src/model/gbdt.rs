//! GBDT model: a forest plus the metadata needed to interpret its outputs.
//!
//! Access components via [`forest()`](GbdtModel::forest) and
//! [`meta()`](GbdtModel::meta). Prediction goes through
//! [`Predictor`](crate::inference::gbdt::Predictor).

use std::path::Path;

use crate::compat::lightgbm::{LgbModel, ParseError};
use crate::inference::common::LeafIndices;
use crate::inference::gbdt::{IndexError, Predictor};
use crate::repr::gbdt::Forest;

use super::ModelMeta;

/// A loaded gradient boosted tree ensemble.
///
/// Immutable once built; share it across threads by reference.
#[derive(Debug, Clone)]
pub struct GbdtModel {
    forest: Forest,
    meta: ModelMeta,
}

impl GbdtModel {
    /// Create a model from a forest and metadata.
    pub fn from_forest(forest: Forest, meta: ModelMeta) -> Self {
        Self { forest, meta }
    }

    /// Load a LightGBM text model file.
    ///
    /// # Errors
    ///
    /// [`ParseError`] if the file is unreadable, truncated or structurally
    /// inconsistent.
    pub fn from_lightgbm_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        LgbModel::from_file(path)?.to_model()
    }

    /// Parse a LightGBM text model from a string.
    pub fn from_lightgbm_str(content: &str) -> Result<Self, ParseError> {
        LgbModel::from_string(content)?.to_model()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get reference to the underlying forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Get reference to model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Number of trees.
    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    /// Number of boosting iterations (`n_trees / trees_per_iteration`).
    pub fn n_iterations(&self) -> usize {
        self.forest.n_trees() / self.meta.trees_per_iteration.max(1)
    }

    /// Predictor over this model with the default config.
    pub fn predictor(&self) -> Predictor<'_> {
        Predictor::for_model(self)
    }

    /// Leaf index reached in every tree, for every row.
    pub fn predict_leaf_indices<R>(&self, rows: &[R]) -> Result<LeafIndices, IndexError>
    where
        R: AsRef<[f64]> + Sync,
    {
        self.predictor().predict_leaf_indices(rows)
    }
}
