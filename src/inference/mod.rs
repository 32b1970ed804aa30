//! Inference over loaded tree ensembles.
//!
//! # Module Structure
//!
//! - [`common`]: Shared output types (`PredictionOutput`, `LeafIndices`, `PredictKind`)
//! - [`gbdt`]: Traversal, predictor and its configuration
//!
//! # Quick Start
//!
//! ```no_run
//! use lgbm_leaves::inference::gbdt::Predictor;
//! use lgbm_leaves::model::GbdtModel;
//!
//! let model = GbdtModel::from_lightgbm_file("model.txt")?;
//! let leaves = Predictor::for_model(&model)
//!     .predict_leaf_indices(&[[0.0, 1.0, 63733.0, 1111.0, 36112.0, 0.0, 0.0, 1.0, 1.0]])?;
//! println!("{:?}", leaves.row(0));
//! # Ok::<(), lgbm_leaves::Error>(())
//! ```

pub mod common;
pub mod gbdt;

pub use common::{LeafIndices, PredictKind, PredictionOutput, Predictions};
pub use gbdt::{IndexError, PredictConfig, Predictor};
