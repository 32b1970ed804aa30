//! Gradient-boosted decision tree (GBDT) canonical representations.

/// Canonical node identifier used by the GBDT representation.
///
/// Internally this is just an index into the tree's SoA arrays.
pub type NodeId = u32;

pub mod categories;
pub mod forest;
pub mod node;
pub mod tree;

pub use categories::{categories_to_bitset, CategoriesStorage};
pub use forest::Forest;
pub use node::{is_zero, Comparison, MissingType, SplitCondition, SplitType, ZERO_THRESHOLD};
pub use tree::{MutableTree, Tree, TreeValidationError};
