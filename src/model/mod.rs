//! High-level model types.
//!
//! - [`GbdtModel`]: forest plus metadata, loaded from a LightGBM text file
//! - [`ModelMeta`] / [`TaskKind`]: what the model predicts and how
//! - [`OutputTransform`]: raw margin to prediction mapping

mod gbdt;
mod meta;
mod transform;

pub use gbdt::GbdtModel;
pub use meta::{ModelMeta, TaskKind};
pub use transform::OutputTransform;
