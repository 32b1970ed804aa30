//! lgbm-leaves: leaf-index inference for LightGBM tree ensembles.
//!
//! Loads a LightGBM text model and reports, for every input row, the index
//! of the leaf reached in each tree. Raw and transformed scores are available
//! from the same traversal.
//!
//! # Key Types
//!
//! - [`GbdtModel`] - Forest plus metadata, loaded from a LightGBM text file
//! - [`Predictor`] / [`PredictConfig`] - Batch prediction with optional parallelism
//! - [`LeafIndices`] / [`PredictionOutput`] - Row-major prediction buffers
//!
//! # Loading Models
//!
//! Use [`GbdtModel::from_lightgbm_file`], or [`compat::lightgbm::LgbModel`]
//! for access to the parsed file contents.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod compat;
pub mod data;
pub mod inference;
pub mod model;
pub mod repr;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use compat::lightgbm::ParseError;
pub use data::{RowMatrix, RowParseError};
pub use inference::gbdt::ConfigError;
pub use inference::{
    IndexError, LeafIndices, PredictConfig, PredictKind, PredictionOutput, Predictions, Predictor,
};
pub use model::{GbdtModel, ModelMeta, OutputTransform, TaskKind};
pub use repr::gbdt::{Forest, Tree};
pub use utils::{run_with_threads, Parallelism};

/// Any error the crate can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Row(#[from] RowParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load a LightGBM text model and compute leaf indices for `rows`.
///
/// Shorthand for [`GbdtModel::from_lightgbm_file`] followed by
/// [`GbdtModel::predict_leaf_indices`].
pub fn predict_leaves_from_file<R>(
    path: impl AsRef<std::path::Path>,
    rows: &[R],
) -> Result<LeafIndices, Error>
where
    R: AsRef<[f64]> + Sync,
{
    let model = GbdtModel::from_lightgbm_file(path)?;
    Ok(model.predict_leaf_indices(rows)?)
}
