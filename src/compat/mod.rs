//! External format compatibility loaders.
//!
//! Loaders parse a framework's model file and convert it to native
//! [`repr`](crate::repr) types.

pub mod lightgbm;

pub use lightgbm::{LgbModel, ParseError};
