//! Dense row-major feature matrix.

/// Dense row-major `f64` matrix.
///
/// Missing values are represented as `f64::NAN`.
///
/// # Example
///
/// ```
/// use lgbm_leaves::data::RowMatrix;
///
/// let m = RowMatrix::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
/// assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
/// assert_eq!(m.row_slices(), vec![&[1.0, 2.0, 3.0][..], &[4.0, 5.0, 6.0][..]]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RowMatrix {
    data: Box<[f64]>,
    num_rows: usize,
    num_cols: usize,
}

impl RowMatrix {
    /// Create a matrix from row-major data, taking ownership.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_cols`.
    pub fn from_vec(data: Vec<f64>, num_rows: usize, num_cols: usize) -> Self {
        assert_eq!(
            data.len(),
            num_rows * num_cols,
            "Data length {} does not match dimensions {}x{}",
            data.len(),
            num_rows,
            num_cols
        );
        Self {
            data: data.into_boxed_slice(),
            num_rows,
            num_cols,
        }
    }

    /// Create a matrix by copying equally long rows.
    ///
    /// Returns `None` if the rows differ in length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Option<Self> {
        let num_cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * num_cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != num_cols {
                return None;
            }
            data.extend_from_slice(row);
        }
        Some(Self::from_vec(data, rows.len(), num_cols))
    }

    /// Number of rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns (features).
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Get a row as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row >= num_rows`.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.num_rows, "row {row} out of range");
        let start = row * self.num_cols;
        &self.data[start..start + self.num_cols]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.num_rows).map(move |r| self.row(r))
    }

    /// Borrowed row slices, ready to pass to a predictor.
    pub fn row_slices(&self) -> Vec<&[f64]> {
        self.rows().collect()
    }

    /// Get the underlying row-major data.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_requires_equal_lengths() {
        let m = RowMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.num_cols(), 2);
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0]);

        assert!(RowMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_none());
    }

    #[test]
    fn empty_matrix() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let m = RowMatrix::from_rows(&rows).unwrap();
        assert_eq!(m.num_rows(), 0);
        assert!(m.row_slices().is_empty());
    }

    #[test]
    fn zero_width_rows() {
        let m = RowMatrix::from_vec(vec![], 3, 0);
        assert_eq!(m.rows().count(), 3);
        assert!(m.row(2).is_empty());
    }

    #[test]
    #[should_panic(expected = "does not match dimensions")]
    fn shape_mismatch_panics() {
        RowMatrix::from_vec(vec![1.0, 2.0, 3.0], 2, 2);
    }
}
