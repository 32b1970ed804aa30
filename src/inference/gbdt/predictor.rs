//! Batch predictor over a [`Forest`].
//!
//! Rows are split into blocks of [`PredictConfig::block_size`] rows. Blocks
//! are predicted independently, in parallel when the config asks for more
//! than one thread, and concatenated in row order.

use crate::inference::common::{LeafIndices, PredictKind, PredictionOutput, Predictions};
use crate::model::{GbdtModel, OutputTransform};
use crate::repr::gbdt::Forest;
use crate::utils::{run_with_threads, Parallelism};

use super::{IndexError, PredictConfig};

/// Predictor borrowing a forest for its lifetime.
///
/// # Example
///
/// ```
/// use lgbm_leaves::inference::gbdt::Predictor;
/// use lgbm_leaves::repr::gbdt::{Comparison, Forest, MissingType, MutableTree};
///
/// let mut tree = MutableTree::new();
/// let root = tree.init_root();
/// let (l, r) = tree.apply_numeric_split(root, 0, 0.5, Comparison::Less, MissingType::None, false);
/// tree.make_leaf(l, 0, -1.0);
/// tree.make_leaf(r, 1, 1.0);
///
/// let mut forest = Forest::for_regression();
/// forest.push_tree(tree.freeze(), 0).unwrap();
///
/// let leaves = Predictor::new(&forest)
///     .predict_leaf_indices(&[[0.0], [1.0]])
///     .unwrap();
/// assert_eq!(leaves.to_nested(), vec![vec![0], vec![1]]);
/// ```
#[derive(Debug, Clone)]
pub struct Predictor<'f> {
    forest: &'f Forest,
    transform: OutputTransform,
    trees_per_iteration: usize,
    average_output: bool,
    config: PredictConfig,
}

impl<'f> Predictor<'f> {
    /// Predictor over a bare forest: identity transform, one iteration per
    /// `n_groups` trees, default config.
    pub fn new(forest: &'f Forest) -> Self {
        Self {
            forest,
            transform: OutputTransform::Identity,
            trees_per_iteration: (forest.n_groups() as usize).max(1),
            average_output: false,
            config: PredictConfig::default(),
        }
    }

    /// Predictor over a loaded model, using its transform and iteration layout.
    pub fn for_model(model: &'f GbdtModel) -> Self {
        let meta = model.meta();
        Self {
            forest: model.forest(),
            transform: meta.transform,
            trees_per_iteration: meta.trees_per_iteration.max(1),
            average_output: meta.average_output,
            config: PredictConfig::default(),
        }
    }

    /// Replace the prediction config.
    pub fn with_config(mut self, config: PredictConfig) -> Self {
        self.config = config;
        self
    }

    /// The active config.
    pub fn config(&self) -> &PredictConfig {
        &self.config
    }

    /// The forest being predicted.
    pub fn forest(&self) -> &'f Forest {
        self.forest
    }

    /// Number of trees used per row after the iteration limit.
    pub fn n_trees_used(&self) -> usize {
        let n_trees = self.forest.n_trees();
        match self.config.n_iterations {
            Some(k) => k.saturating_mul(self.trees_per_iteration).min(n_trees),
            None => n_trees,
        }
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict according to [`PredictConfig::output`].
    pub fn predict<R>(&self, rows: &[R]) -> Result<Predictions, IndexError>
    where
        R: AsRef<[f64]> + Sync,
    {
        match self.config.output {
            PredictKind::Raw => self.predict_raw(rows).map(Predictions::Scores),
            PredictKind::Transformed => self.predict_transformed(rows).map(Predictions::Scores),
            PredictKind::LeafIndex => self.predict_leaf_indices(rows).map(Predictions::Leaves),
        }
    }

    /// Leaf index reached in each used tree, for every row.
    ///
    /// # Errors
    ///
    /// [`IndexError`] for the first row (in row order) that is too short for
    /// a node on its path.
    pub fn predict_leaf_indices<R>(&self, rows: &[R]) -> Result<LeafIndices, IndexError>
    where
        R: AsRef<[f64]> + Sync,
    {
        let n_trees = self.n_trees_used();
        let data = self.predict_blocks(rows, |row, out| self.fill_leaf_indices(row, n_trees, out))?;
        Ok(LeafIndices::new(data, rows.len(), n_trees))
    }

    /// Leaf indices for a single row.
    pub fn predict_row_leaf_indices(&self, row: &[f64]) -> Result<Vec<u32>, IndexError> {
        let n_trees = self.n_trees_used();
        let mut out = Vec::with_capacity(n_trees);
        self.fill_leaf_indices(row, n_trees, &mut out)?;
        Ok(out)
    }

    /// Raw margins: the sum of leaf values per group.
    pub fn predict_raw<R>(&self, rows: &[R]) -> Result<PredictionOutput, IndexError>
    where
        R: AsRef<[f64]> + Sync,
    {
        let n_groups = self.forest.n_groups() as usize;
        let n_trees = self.n_trees_used();
        let divisor = if self.average_output {
            n_trees.div_ceil(self.trees_per_iteration).max(1) as f64
        } else {
            1.0
        };

        let data = self.predict_blocks(rows, |row, out| {
            let start = out.len();
            out.resize(start + n_groups, 0.0);
            let scores = &mut out[start..];
            for (idx, (tree, group)) in self.forest.trees_with_groups().take(n_trees).enumerate() {
                scores[group as usize] += tree.predict_row(row).map_err(|e| e.in_tree(idx))?;
            }
            if divisor != 1.0 {
                scores.iter_mut().for_each(|s| *s /= divisor);
            }
            Ok(())
        })?;
        Ok(PredictionOutput::new(data, rows.len(), n_groups))
    }

    /// Raw margins passed through the output transform.
    pub fn predict_transformed<R>(&self, rows: &[R]) -> Result<PredictionOutput, IndexError>
    where
        R: AsRef<[f64]> + Sync,
    {
        let mut output = self.predict_raw(rows)?;
        let n_groups = output.num_groups();
        if n_groups > 0 {
            self.transform
                .transform_inplace(output.as_mut_slice(), n_groups);
        }
        Ok(output)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn fill_leaf_indices(
        &self,
        row: &[f64],
        n_trees: usize,
        out: &mut Vec<u32>,
    ) -> Result<(), IndexError> {
        for (idx, tree) in self.forest.trees().take(n_trees).enumerate() {
            out.push(tree.predict_leaf_index(row).map_err(|e| e.in_tree(idx))?);
        }
        Ok(())
    }

    /// Run `fill` over every row, block by block, and concatenate the outputs.
    fn predict_blocks<R, T, F>(&self, rows: &[R], fill: F) -> Result<Vec<T>, IndexError>
    where
        R: AsRef<[f64]> + Sync,
        T: Send,
        F: Fn(&[f64], &mut Vec<T>) -> Result<(), IndexError> + Sync,
    {
        let block_size = self.config.block_size.max(1);
        let n_threads = self.config.thread_count();

        let run = |parallelism: Parallelism| {
            tracing::trace!(
                n_rows = rows.len(),
                block_size,
                parallel = parallelism.is_parallel(),
                "predicting row blocks"
            );
            let blocks: Vec<(usize, &[R])> = rows.chunks(block_size).enumerate().collect();
            parallelism.maybe_par_map(blocks, |(block_idx, block)| {
                let mut out = Vec::new();
                for (offset, row) in block.iter().enumerate() {
                    fill(row.as_ref(), &mut out)
                        .map_err(|e| e.at_row(block_idx * block_size + offset))?;
                }
                Ok(out)
            })
        };

        let blocks: Vec<Result<Vec<T>, IndexError>> = match run_with_threads(n_threads, &run) {
            Ok(blocks) => blocks,
            Err(err) => {
                tracing::warn!(error = %err, n_threads, "thread pool unavailable, predicting sequentially");
                run(Parallelism::Sequential)
            }
        };

        let mut data = Vec::new();
        for block in blocks {
            data.extend(block?);
        }
        Ok(data)
    }
}

/// Leaf indices of every tree in `forest`, for every row.
///
/// Shorthand for `Predictor::new(forest).predict_leaf_indices(rows)`.
pub fn predict_leaf_indices<R>(forest: &Forest, rows: &[R]) -> Result<LeafIndices, IndexError>
where
    R: AsRef<[f64]> + Sync,
{
    Predictor::new(forest).predict_leaf_indices(rows)
}
