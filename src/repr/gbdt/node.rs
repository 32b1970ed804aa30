//! Tree node types: split kinds, comparison direction and missing-value handling.

/// Inputs with `|x| <= ZERO_THRESHOLD` count as zero for [`MissingType::Zero`].
///
/// Same constant LightGBM uses (`kZeroThreshold`).
pub const ZERO_THRESHOLD: f64 = 1e-35;

/// Type of split in a decision tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SplitType {
    /// Numeric split: the node's [`Comparison`] against its threshold.
    #[default]
    Numeric = 0,
    /// Categorical split: go left if the category is in the node's set.
    Categorical = 1,
}

/// Direction of a numeric comparison.
///
/// The comparison answers "does the row go left?" for a non-missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// `value < threshold` goes left; the threshold itself goes right.
    Less,
    /// `value <= threshold` goes left (LightGBM's rule).
    #[default]
    LessOrEqual,
}

impl Comparison {
    /// Returns `true` if `value` takes the left branch.
    #[inline]
    pub fn goes_left(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Less => value < threshold,
            Comparison::LessOrEqual => value <= threshold,
        }
    }
}

/// Missing value handling strategy of a numeric split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingType {
    /// No special handling: NaN is read as 0.0 and compared normally.
    #[default]
    None = 0,
    /// Zeros are missing (NaN is read as 0.0 first).
    Zero = 1,
    /// NaN is missing.
    NaN = 2,
}

impl MissingType {
    /// Decode the two missing-type bits of a LightGBM `decision_type`.
    pub fn from_bits(bits: u8) -> Self {
        match bits {
            1 => MissingType::Zero,
            2 => MissingType::NaN,
            _ => MissingType::None,
        }
    }
}

/// `true` if `value` counts as zero for [`MissingType::Zero`].
#[inline]
pub fn is_zero(value: f64) -> bool {
    (-ZERO_THRESHOLD..=ZERO_THRESHOLD).contains(&value)
}

/// Split condition of an internal node, as stored in the tree.
///
/// This is a read-only snapshot; traversal reads the SoA arrays directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCondition {
    /// Feature index the node reads.
    pub feature: u32,
    /// Numeric threshold (unused for categorical splits).
    pub threshold: f64,
    /// Comparison direction for numeric splits.
    pub comparison: Comparison,
    /// Numeric or categorical.
    pub split_type: SplitType,
    /// Missing value handling.
    pub missing: MissingType,
    /// Direction taken by missing values.
    pub default_left: bool,
}
