//! Prediction output types.

use approx::{AbsDiffEq, RelativeEq};
use serde::Serialize;

/// Prediction output: flat storage with shape metadata.
///
/// Stores predictions in row-major layout.
/// Each row contains `num_groups` values (1 for regression, K for K-class).
///
/// ```text
/// data[row * num_groups + group] = prediction for (row, group)
/// ```
///
/// # Example
///
/// ```
/// use lgbm_leaves::inference::common::PredictionOutput;
///
/// let output = PredictionOutput::new(vec![0.1, -0.2, 0.3, -0.4], 2, 2);
/// assert_eq!(output.row(0), &[0.1, -0.2]);
/// assert_eq!(output.row(1), &[0.3, -0.4]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutput {
    data: Vec<f64>,
    num_rows: usize,
    num_groups: usize,
}

impl PredictionOutput {
    /// Create a new prediction output.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_groups`.
    pub fn new(data: Vec<f64>, num_rows: usize, num_groups: usize) -> Self {
        assert_eq!(
            data.len(),
            num_rows * num_groups,
            "Data length {} does not match shape {}x{}",
            data.len(),
            num_rows,
            num_groups
        );
        Self {
            data,
            num_rows,
            num_groups,
        }
    }

    /// Number of rows (samples).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of groups (output dimensions).
    #[inline]
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// Shape as (rows, groups).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, self.num_groups)
    }

    /// Get prediction for a single row.
    ///
    /// # Panics
    ///
    /// Panics if `row_idx >= num_rows`.
    #[inline]
    pub fn row(&self, row_idx: usize) -> &[f64] {
        let start = row_idx * self.num_groups;
        &self.data[start..start + self.num_groups]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.num_groups.max(1)).take(self.num_rows)
    }

    /// Get raw flat data.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Get mutable raw flat data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consume and return raw data.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Convert to `Vec<Vec<f64>>` (allocates).
    pub fn to_nested(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }
}

impl AbsDiffEq for PredictionOutput {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for PredictionOutput {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

// =============================================================================
// LeafIndices
// =============================================================================

/// Leaf index output: one leaf index per tree per row, row-major.
///
/// ```text
/// data[row * num_trees + tree] = leaf index reached by `row` in `tree`
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafIndices {
    data: Vec<u32>,
    num_rows: usize,
    num_trees: usize,
}

impl LeafIndices {
    /// Create a new leaf index output.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_trees`.
    pub fn new(data: Vec<u32>, num_rows: usize, num_trees: usize) -> Self {
        assert_eq!(
            data.len(),
            num_rows * num_trees,
            "Data length {} does not match shape {}x{}",
            data.len(),
            num_rows,
            num_trees
        );
        Self {
            data,
            num_rows,
            num_trees,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of trees (columns).
    #[inline]
    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    /// Leaf indices of one row, in tree order.
    #[inline]
    pub fn row(&self, row_idx: usize) -> &[u32] {
        assert!(row_idx < self.num_rows, "row {row_idx} out of range");
        let start = row_idx * self.num_trees;
        &self.data[start..start + self.num_trees]
    }

    /// Iterate over rows. Yields `num_rows` slices, empty when there are no trees.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.num_rows).map(move |r| self.row(r))
    }

    /// Get raw flat data.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// Convert to `Vec<Vec<u32>>` (allocates).
    pub fn to_nested(&self) -> Vec<Vec<u32>> {
        self.rows().map(|r| r.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_output() {
        let output = PredictionOutput::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_eq!(output.shape(), (2, 2));
        assert_eq!(output.to_nested(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    #[should_panic(expected = "does not match shape")]
    fn shape_mismatch_panics() {
        PredictionOutput::new(vec![1.0, 2.0, 3.0], 2, 2);
    }

    #[test]
    fn approx_eq() {
        let a = PredictionOutput::new(vec![1.0, 2.0], 2, 1);
        let b = PredictionOutput::new(vec![1.0 + 1e-12, 2.0], 2, 1);
        let c = PredictionOutput::new(vec![1.0, 2.0], 1, 2);
        assert!(a.abs_diff_eq(&b, 1e-9));
        assert!(!a.abs_diff_eq(&c, 1e-9));
    }

    #[test]
    fn leaf_rows() {
        let leaves = LeafIndices::new(vec![5, 4, 1, 2, 3, 0], 2, 3);
        assert_eq!(leaves.row(0), &[5, 4, 1]);
        assert_eq!(leaves.row(1), &[2, 3, 0]);
        assert_eq!(leaves.to_nested(), vec![vec![5, 4, 1], vec![2, 3, 0]]);
    }

    #[test]
    fn leaf_rows_without_trees() {
        let leaves = LeafIndices::new(vec![], 3, 0);
        let rows: Vec<&[u32]> = leaves.rows().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.is_empty()));
    }
}
