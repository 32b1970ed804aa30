//! LightGBM text model format parser.
//!
//! Parses LightGBM's text model format (`.txt` files saved via `save_model()`).
//! This is a line-based format with key=value pairs: a header, one block per
//! tree (`Tree=<n>`), then `end of trees`. Anything after `end of trees`
//! (feature importances, parameters) is ignored.

use std::collections::HashMap;
use std::iter::Peekable;
use std::path::Path;
use std::str::Lines;

use crate::model::{OutputTransform, TaskKind};
use crate::repr::gbdt::{MissingType, TreeValidationError};

const END_OF_TREES: &str = "end of trees";

// =============================================================================
// Error types
// =============================================================================

/// Error type for LightGBM model parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
    #[error("array size mismatch for {field}: expected {expected}, got {actual}")]
    ArraySizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEnd { context: &'static str },
    #[error("tree {tree}: node {node} splits on negative feature index {feature}")]
    NegativeFeatureIndex { tree: usize, node: usize, feature: i32 },
    #[error("tree {tree}: node {node} splits on feature {feature}, but max_feature_idx is {max_feature_idx}")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
        max_feature_idx: usize,
    },
    #[error("tree {tree}: node {node} references nonexistent child {child}")]
    InvalidChild { tree: usize, node: usize, child: i32 },
    #[error("tree {tree}: {source}")]
    InvalidTree {
        tree: usize,
        #[source]
        source: TreeValidationError,
    },
}

// =============================================================================
// Decision type bitfield
// =============================================================================

/// Parsed decision type from LightGBM's bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecisionType {
    /// True if this is a categorical split
    pub is_categorical: bool,
    /// True if missing values go left
    pub default_left: bool,
    /// Missing value handling mode
    pub missing_type: MissingType,
}

impl DecisionType {
    /// Parse from LightGBM's decision_type bitfield.
    ///
    /// Bit layout:
    /// - Bit 0: categorical flag (1 = categorical)
    /// - Bit 1: default_left flag (1 = left)
    /// - Bits 2-3: missing type (0=None, 1=Zero, 2=NaN)
    pub fn from_i8(value: i8) -> Self {
        let v = value as u8;
        DecisionType {
            is_categorical: (v & 1) != 0,
            default_left: (v & 2) != 0,
            missing_type: MissingType::from_bits((v >> 2) & 3),
        }
    }
}

// =============================================================================
// Parsed tree structure
// =============================================================================

/// A parsed LightGBM tree.
#[derive(Debug, Clone)]
pub struct LgbTree {
    /// Number of leaves in this tree
    pub num_leaves: usize,
    /// Number of categorical splits
    pub num_cat: usize,
    /// Feature index for each internal node (size: num_leaves - 1)
    pub split_feature: Vec<i32>,
    /// Threshold for each internal node; bitset slot for categorical nodes
    pub threshold: Vec<f64>,
    /// Decision type bitfield for each internal node (size: num_leaves - 1)
    pub decision_type: Vec<i8>,
    /// Left child index for each internal node (negative = leaf)
    pub left_child: Vec<i32>,
    /// Right child index for each internal node (negative = leaf)
    pub right_child: Vec<i32>,
    /// Output value for each leaf (size: num_leaves)
    pub leaf_value: Vec<f64>,
    /// Whether this tree has linear models at leaves
    pub is_linear: bool,
    /// Categorical split boundaries (size: num_cat + 1 if num_cat > 0)
    pub cat_boundaries: Vec<i32>,
    /// Categorical split threshold bitset words
    pub cat_threshold: Vec<u32>,
}

impl Default for LgbTree {
    fn default() -> Self {
        Self {
            num_leaves: 0,
            num_cat: 0,
            split_feature: Vec::new(),
            threshold: Vec::new(),
            decision_type: Vec::new(),
            left_child: Vec::new(),
            right_child: Vec::new(),
            leaf_value: Vec::new(),
            is_linear: false,
            cat_boundaries: Vec::new(),
            cat_threshold: Vec::new(),
        }
    }
}

impl LgbTree {
    /// Number of internal (split) nodes.
    pub fn num_splits(&self) -> usize {
        self.num_leaves.saturating_sub(1)
    }

    /// Bitset words of the categorical split stored in slot `cat_idx`.
    pub fn categorical_bitset(&self, cat_idx: usize) -> Option<&[u32]> {
        let start = usize::try_from(*self.cat_boundaries.get(cat_idx)?).ok()?;
        let end = usize::try_from(*self.cat_boundaries.get(cat_idx + 1)?).ok()?;
        self.cat_threshold.get(start..end)
    }
}

// =============================================================================
// Objective parsing
// =============================================================================

/// Parsed objective function information.
#[derive(Debug, Clone, PartialEq)]
pub enum LgbObjective {
    /// Identity-link regression (l2, l1, huber, fair, quantile, mape)
    Regression,
    /// Regression trained on `sqrt(label)`; predictions are squared back
    RegressionSqrt,
    /// Log-link regression (poisson, gamma, tweedie)
    LogLink,
    /// Binary classification with logloss
    Binary { sigmoid: f64 },
    /// Cross-entropy on probability labels
    CrossEntropy,
    /// Cross-entropy with the lambda parameterization
    CrossEntropyLambda,
    /// Multiclass classification with softmax
    Multiclass { num_class: usize },
    /// One-vs-all multiclass
    MulticlassOva { num_class: usize, sigmoid: f64 },
    /// Learning to rank
    Ranking,
    /// Unknown objective (raw string preserved)
    Unknown(String),
}

impl LgbObjective {
    /// Parse from LightGBM objective string.
    ///
    /// Examples:
    /// - "regression"
    /// - "regression sqrt"
    /// - "binary sigmoid:1"
    /// - "multiclass num_class:3"
    pub fn parse(s: &str) -> Self {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let name = parts.first().copied().unwrap_or("");
        let param = |key: &str| {
            parts
                .iter()
                .find_map(|p| p.strip_prefix(key)?.strip_prefix(':'))
        };
        let sigmoid = || param("sigmoid").and_then(|v| v.parse().ok()).unwrap_or(1.0);
        let num_class = || param("num_class").and_then(|v| v.parse().ok()).unwrap_or(2);
        let sqrt = parts.contains(&"sqrt");

        match name {
            "regression" | "regression_l1" | "huber" | "fair" | "quantile" | "mape" if sqrt => {
                LgbObjective::RegressionSqrt
            }
            "regression" | "regression_l1" | "huber" | "fair" | "quantile" | "mape" => {
                LgbObjective::Regression
            }
            "poisson" | "gamma" | "tweedie" => LgbObjective::LogLink,
            "binary" => LgbObjective::Binary { sigmoid: sigmoid() },
            "cross_entropy" | "xentropy" => LgbObjective::CrossEntropy,
            "cross_entropy_lambda" | "xentlambda" => LgbObjective::CrossEntropyLambda,
            "multiclass" | "softmax" => LgbObjective::Multiclass {
                num_class: num_class(),
            },
            "multiclassova" | "multiclass_ova" | "ova" | "ovr" => LgbObjective::MulticlassOva {
                num_class: num_class(),
                sigmoid: sigmoid(),
            },
            "lambdarank" | "rank_xendcg" => LgbObjective::Ranking,
            _ => LgbObjective::Unknown(s.to_string()),
        }
    }

    /// Transform from raw margins to predictions.
    pub fn transform(&self) -> OutputTransform {
        match *self {
            LgbObjective::Regression | LgbObjective::Ranking | LgbObjective::Unknown(_) => {
                OutputTransform::Identity
            }
            LgbObjective::RegressionSqrt => OutputTransform::SignedSquare,
            LgbObjective::LogLink => OutputTransform::Exp,
            LgbObjective::Binary { sigmoid } => OutputTransform::Sigmoid { scale: sigmoid },
            LgbObjective::CrossEntropy => OutputTransform::Sigmoid { scale: 1.0 },
            LgbObjective::CrossEntropyLambda => OutputTransform::Softplus,
            LgbObjective::Multiclass { .. } => OutputTransform::Softmax,
            LgbObjective::MulticlassOva { sigmoid, .. } => {
                OutputTransform::SigmoidPerClass { scale: sigmoid }
            }
        }
    }

    /// Task kind implied by the objective.
    pub fn task(&self) -> TaskKind {
        match *self {
            LgbObjective::Binary { .. } | LgbObjective::CrossEntropy => {
                TaskKind::BinaryClassification
            }
            LgbObjective::Multiclass { num_class }
            | LgbObjective::MulticlassOva { num_class, .. } => {
                TaskKind::MulticlassClassification {
                    n_classes: num_class,
                }
            }
            LgbObjective::Ranking => TaskKind::Ranking,
            LgbObjective::Regression
            | LgbObjective::RegressionSqrt
            | LgbObjective::LogLink
            | LgbObjective::CrossEntropyLambda
            | LgbObjective::Unknown(_) => TaskKind::Regression,
        }
    }
}

// =============================================================================
// Model header
// =============================================================================

/// Parsed LightGBM model header.
#[derive(Debug, Clone)]
pub struct LgbHeader {
    /// Number of classes (1 for regression and binary)
    pub num_class: usize,
    /// Number of trees per boosting iteration
    pub num_tree_per_iteration: usize,
    /// Maximum feature index used (0-based)
    pub max_feature_idx: usize,
    /// Objective function
    pub objective: Option<LgbObjective>,
    /// Objective line as written in the file
    pub objective_str: Option<String>,
    /// Whether to average output across iterations
    pub average_output: bool,
    /// Feature names
    pub feature_names: Vec<String>,
}

impl Default for LgbHeader {
    fn default() -> Self {
        Self {
            num_class: 1,
            num_tree_per_iteration: 1,
            max_feature_idx: 0,
            objective: None,
            objective_str: None,
            average_output: false,
            feature_names: Vec::new(),
        }
    }
}

// =============================================================================
// Full model
// =============================================================================

/// A parsed LightGBM model.
#[derive(Debug, Clone)]
pub struct LgbModel {
    /// Model header with metadata
    pub header: LgbHeader,
    /// All trees in the model
    pub trees: Vec<LgbTree>,
}

impl LgbModel {
    /// Load a model from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "read LightGBM model file");
        Self::from_string(&content)
    }

    /// Parse a model from a string.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnexpectedEnd`] if the input stops before `end of trees`;
    /// other variants for missing fields, unparsable values and mismatched
    /// array lengths.
    pub fn from_string(content: &str) -> Result<Self, ParseError> {
        let mut lines = content.lines().peekable();

        let header = parse_header(&mut lines)?;

        let mut trees = Vec::new();
        let mut terminated = false;
        while let Some(line) = lines.next() {
            let line = line.trim_end();
            if let Some(id) = line.strip_prefix("Tree=") {
                let id: usize = id.trim().parse().map_err(|_| ParseError::InvalidValue {
                    field: "Tree",
                    message: format!("invalid tree id: {id}"),
                })?;
                if id != trees.len() {
                    return Err(ParseError::InvalidValue {
                        field: "Tree",
                        message: format!("expected tree {}, found tree {id}", trees.len()),
                    });
                }
                trees.push(parse_tree(&mut lines)?);
            } else if line == END_OF_TREES {
                terminated = true;
                break;
            }
            // Other lines between trees (blank lines) are skipped.
        }

        if !terminated {
            return Err(ParseError::UnexpectedEnd {
                context: "tree section",
            });
        }

        tracing::debug!(
            n_trees = trees.len(),
            n_features = header.max_feature_idx + 1,
            objective = ?header.objective,
            "parsed LightGBM model"
        );

        Ok(LgbModel { header, trees })
    }

    /// Number of trees in the model.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of classes (1 for regression/binary, k for k-class multiclass).
    pub fn num_class(&self) -> usize {
        self.header.num_class
    }

    /// Number of output groups (1 for regression/binary, num_class for multiclass).
    pub fn num_groups(&self) -> usize {
        self.header.num_class.max(1)
    }

    /// Number of features.
    pub fn num_features(&self) -> usize {
        self.header.max_feature_idx + 1
    }
}

// =============================================================================
// Parsing helpers
// =============================================================================

/// Parse the header section, stopping before the first `Tree=` line.
fn parse_header(lines: &mut Peekable<Lines<'_>>) -> Result<LgbHeader, ParseError> {
    let mut header = LgbHeader::default();
    let mut kv = HashMap::new();

    // Model type line ("tree").
    match lines.next() {
        Some(line) => {
            if let Some((k, v)) = line.split_once('=') {
                kv.insert(k.trim().to_string(), v.trim().to_string());
            }
        }
        None => return Err(ParseError::UnexpectedEnd { context: "header" }),
    }

    while let Some(line) = lines.peek() {
        let line = line.trim_end();
        if line.starts_with("Tree=") || line == END_OF_TREES {
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            kv.insert(key.trim().to_string(), value.trim().to_string());
        } else if line == "average_output" {
            header.average_output = true;
        }
        lines.next();
    }

    header.num_class = parse_field(&kv, "num_class")?.ok_or(ParseError::MissingField("num_class"))?;

    header.num_tree_per_iteration =
        parse_field(&kv, "num_tree_per_iteration")?.unwrap_or(header.num_class.max(1));
    if header.num_tree_per_iteration == 0 {
        return Err(ParseError::InvalidValue {
            field: "num_tree_per_iteration",
            message: "must be at least 1".to_string(),
        });
    }

    header.max_feature_idx =
        parse_field(&kv, "max_feature_idx")?.ok_or(ParseError::MissingField("max_feature_idx"))?;
    if header.max_feature_idx.checked_add(1).is_none() {
        return Err(ParseError::InvalidValue {
            field: "max_feature_idx",
            message: format!("{} is too large", header.max_feature_idx),
        });
    }

    if let Some(obj) = kv.get("objective") {
        let objective = LgbObjective::parse(obj);
        if let LgbObjective::Unknown(name) = &objective {
            tracing::warn!(objective = %name, "unknown LightGBM objective, predictions are not transformed");
        }
        header.objective = Some(objective);
        header.objective_str = Some(obj.clone());
    }

    if let Some(names) = kv.get("feature_names") {
        header.feature_names = names.split_whitespace().map(str::to_string).collect();
    }

    Ok(header)
}

/// Parse a single tree section (the lines after `Tree=<n>`).
fn parse_tree(lines: &mut Peekable<Lines<'_>>) -> Result<LgbTree, ParseError> {
    let mut tree = LgbTree::default();
    let mut kv = HashMap::new();

    while let Some(line) = lines.peek() {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with("Tree=") || line == END_OF_TREES {
            break;
        }
        if let Some((key, value)) = line.split_once('=') {
            kv.insert(key.to_string(), value.to_string());
        }
        lines.next();
    }

    if lines.peek().is_none() {
        return Err(ParseError::UnexpectedEnd { context: "tree" });
    }

    tree.num_leaves = parse_field(&kv, "num_leaves")?.ok_or(ParseError::MissingField("num_leaves"))?;
    if tree.num_leaves == 0 {
        return Err(ParseError::InvalidValue {
            field: "num_leaves",
            message: "must be at least 1".to_string(),
        });
    }

    tree.num_cat = parse_field(&kv, "num_cat")?.unwrap_or(0);
    tree.is_linear = parse_field::<i32>(&kv, "is_linear")?.is_some_and(|v| v != 0);

    // Single-leaf tree has no splits.
    if tree.num_leaves == 1 {
        tree.leaf_value = parse_array(&kv, "leaf_value")?.unwrap_or_else(|| vec![0.0]);
        validate_array_size("leaf_value", &tree.leaf_value, 1)?;
        return Ok(tree);
    }

    let num_splits = tree.num_splits();

    tree.split_feature = required_array(&kv, "split_feature")?;
    validate_array_size("split_feature", &tree.split_feature, num_splits)?;

    tree.threshold = required_array(&kv, "threshold")?;
    validate_array_size("threshold", &tree.threshold, num_splits)?;

    tree.decision_type = parse_array(&kv, "decision_type")?.unwrap_or_else(|| vec![0; num_splits]);
    validate_array_size("decision_type", &tree.decision_type, num_splits)?;

    tree.left_child = required_array(&kv, "left_child")?;
    validate_array_size("left_child", &tree.left_child, num_splits)?;

    tree.right_child = required_array(&kv, "right_child")?;
    validate_array_size("right_child", &tree.right_child, num_splits)?;

    tree.leaf_value = required_array(&kv, "leaf_value")?;
    validate_array_size("leaf_value", &tree.leaf_value, tree.num_leaves)?;

    if tree.num_cat > 0 {
        let n_boundaries = tree.num_cat.checked_add(1).ok_or_else(|| ParseError::InvalidValue {
            field: "num_cat",
            message: format!("{} is too large", tree.num_cat),
        })?;
        tree.cat_boundaries = required_array(&kv, "cat_boundaries")?;
        validate_array_size("cat_boundaries", &tree.cat_boundaries, n_boundaries)?;
        tree.cat_threshold = required_array(&kv, "cat_threshold")?;
    }

    Ok(tree)
}

fn parse_field<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<T>, ParseError> {
    kv.get(field)
        .map(|v| {
            v.trim().parse().map_err(|_| ParseError::InvalidValue {
                field,
                message: format!("cannot parse {v:?}"),
            })
        })
        .transpose()
}

fn parse_array<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<Vec<T>>, ParseError> {
    kv.get(field)
        .map(|s| {
            s.split_whitespace()
                .map(|v| {
                    v.parse().map_err(|_| ParseError::InvalidValue {
                        field,
                        message: format!("invalid element: {v}"),
                    })
                })
                .collect()
        })
        .transpose()
}

fn required_array<T: std::str::FromStr>(
    kv: &HashMap<String, String>,
    field: &'static str,
) -> Result<Vec<T>, ParseError> {
    parse_array(kv, field)?.ok_or(ParseError::MissingField(field))
}

fn validate_array_size<T>(field: &'static str, arr: &[T], expected: usize) -> Result<(), ParseError> {
    if arr.len() != expected {
        return Err(ParseError::ArraySizeMismatch {
            field,
            expected,
            actual: arr.len(),
        });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
