//! Shared inference types.
//!
//! - [`PredictionOutput`]: row-major score storage
//! - [`LeafIndices`]: row-major leaf index storage
//! - [`PredictKind`] / [`Predictions`]: what a prediction call produces

mod output;
mod predictions;

pub use output::{LeafIndices, PredictionOutput};
pub use predictions::{PredictKind, Predictions};
