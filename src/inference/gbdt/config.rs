//! Prediction configuration with builder pattern.
//!
//! [`PredictConfig`] uses the `bon` crate for builder generation with
//! validation at build time.
//!
//! # Example
//!
//! ```
//! use lgbm_leaves::inference::common::PredictKind;
//! use lgbm_leaves::inference::gbdt::PredictConfig;
//!
//! // All defaults: raw scores, all trees, sequential
//! let config = PredictConfig::builder().build().unwrap();
//!
//! // Leaf indices of the first 10 iterations, on 4 threads
//! let config = PredictConfig::builder()
//!     .output(PredictKind::LeafIndex)
//!     .n_iterations(10)
//!     .n_threads(std::num::NonZeroUsize::new(4).unwrap())
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;
use serde::Deserialize;

use crate::inference::common::PredictKind;

/// Default number of rows per parallel work block.
pub const DEFAULT_BLOCK_SIZE: usize = 64;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Iteration limit must be at least 1.
    #[error("n_iterations must be at least 1")]
    InvalidNIterations,
    /// Block size must be at least 1.
    #[error("block_size must be at least 1")]
    InvalidBlockSize,
}

// =============================================================================
// PredictConfig
// =============================================================================

/// Configuration for a [`Predictor`](super::Predictor).
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
#[serde(default, deny_unknown_fields)]
pub struct PredictConfig {
    /// What [`Predictor::predict`](super::Predictor::predict) returns. Default: raw scores.
    #[builder(default)]
    pub output: PredictKind,

    /// Use only the first `n` boosting iterations. `None` uses every tree.
    pub n_iterations: Option<usize>,

    /// Number of threads. `None` or 1 predicts on the calling thread.
    pub n_threads: Option<NonZeroUsize>,

    /// Rows per parallel work block. Default: 64.
    #[builder(default = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,
}

impl<S: predict_config_builder::IsComplete> PredictConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `n_iterations == Some(0)` or `block_size == 0`.
    pub fn build(self) -> Result<PredictConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl PredictConfig {
    /// Validate the configuration.
    ///
    /// Called by the builder; call it directly for configs read with serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_iterations == Some(0) {
            return Err(ConfigError::InvalidNIterations);
        }
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }
        Ok(())
    }

    /// Thread count for [`run_with_threads`](crate::utils::run_with_threads); 1 when unset.
    #[inline]
    pub(crate) fn thread_count(&self) -> usize {
        self.n_threads.map_or(1, NonZeroUsize::get)
    }
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            output: PredictKind::default(),
            n_iterations: None,
            n_threads: None,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}
