//! GBDT (Gradient Boosted Decision Trees) inference.
//!
//! - [`traverse_to_leaf`]: root-to-leaf decision routine shared by every path
//! - [`Predictor`]: batch prediction of leaf indices, raw or transformed scores
//! - [`PredictConfig`]: output kind, iteration limit, threads, block size
//!
//! # Missing Values
//!
//! Numeric nodes follow their missing type: NaN inputs take the default
//! direction only under missing type `NaN`, otherwise they are read as 0.0.
//! Under missing type `Zero`, values within 1e-35 of zero take the default
//! direction.
//!
//! # Categorical Splits
//!
//! Categorical splits use bitset storage. A category goes LEFT if its bit is
//! set in the node's bitset, RIGHT otherwise. NaN and negative categories go
//! RIGHT.

mod config;
mod predictor;
mod traversal;

pub use config::{ConfigError, PredictConfig, DEFAULT_BLOCK_SIZE};
pub use predictor::{predict_leaf_indices, Predictor};
pub use traversal::{traverse_to_leaf, IndexError};
