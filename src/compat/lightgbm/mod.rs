//! LightGBM text model loader.
//!
//! [`LgbModel`] mirrors the text file; [`LgbModel::to_forest`] and
//! [`LgbModel::to_model`] convert it to native types.

mod convert;
mod text;

pub use text::{DecisionType, LgbHeader, LgbModel, LgbObjective, LgbTree, ParseError};
