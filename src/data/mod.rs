//! Feature row inputs.
//!
//! Predictors accept any `&[R]` with `R: AsRef<[f64]>`, so `Vec<Vec<f64>>`,
//! arrays and borrowed slices all work directly. [`RowMatrix`] is a dense
//! row-major container for equally long rows; [`parse_row`] reads one
//! delimited text row.
//!
//! # Missing Values
//!
//! Missing values are represented as `f64::NAN`.

mod matrix;
mod text;

pub use matrix::RowMatrix;
pub use text::{parse_row, RowParseError};
