//! Semantic prediction wrappers.

use serde::{Deserialize, Serialize};

use super::{LeafIndices, PredictionOutput};

/// What a prediction call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictKind {
    /// Raw margins: base score plus the sum of leaf values per output group.
    #[default]
    Raw,
    /// Raw margins passed through the model's output transform
    /// (sigmoid, softmax, ...).
    Transformed,
    /// The leaf index reached in every tree.
    LeafIndex,
}

/// Output of [`Predictor::predict`](crate::inference::gbdt::Predictor::predict).
#[derive(Debug, Clone, PartialEq)]
pub enum Predictions {
    /// Raw or transformed scores, shape `(rows, groups)`.
    Scores(PredictionOutput),
    /// Leaf indices, shape `(rows, trees)`.
    Leaves(LeafIndices),
}

impl Predictions {
    /// Number of rows predicted.
    pub fn num_rows(&self) -> usize {
        match self {
            Predictions::Scores(out) => out.num_rows(),
            Predictions::Leaves(out) => out.num_rows(),
        }
    }

    /// Scores, if this is a score prediction.
    pub fn as_scores(&self) -> Option<&PredictionOutput> {
        match self {
            Predictions::Scores(out) => Some(out),
            Predictions::Leaves(_) => None,
        }
    }

    /// Leaf indices, if this is a leaf prediction.
    pub fn as_leaves(&self) -> Option<&LeafIndices> {
        match self {
            Predictions::Leaves(out) => Some(out),
            Predictions::Scores(_) => None,
        }
    }

    /// One JSON array per row.
    pub fn to_json_rows(&self) -> Result<Vec<String>, serde_json::Error> {
        match self {
            Predictions::Scores(out) => out.rows().map(serde_json::to_string).collect(),
            Predictions::Leaves(out) => out.rows().map(serde_json::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_json() {
        let kind: PredictKind = serde_json::from_str("\"leaf_index\"").unwrap();
        assert_eq!(kind, PredictKind::LeafIndex);
        assert_eq!(PredictKind::default(), PredictKind::Raw);
    }

    #[test]
    fn json_rows() {
        let leaves = Predictions::Leaves(LeafIndices::new(vec![5, 4, 1, 2], 2, 2));
        assert_eq!(leaves.num_rows(), 2);
        assert!(leaves.as_scores().is_none());
        assert_eq!(leaves.to_json_rows().unwrap(), vec!["[5,4]", "[1,2]"]);

        let scores = Predictions::Scores(PredictionOutput::new(vec![0.5, 1.25], 2, 1));
        assert_eq!(scores.to_json_rows().unwrap(), vec!["[0.5]", "[1.25]"]);
    }
}
