//! Model metadata.

use serde::{Deserialize, Serialize};

use super::OutputTransform;

/// Type of machine learning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskKind {
    /// Regression (continuous target).
    #[default]
    Regression,
    /// Binary classification (2 classes).
    BinaryClassification,
    /// Multi-class classification (3+ classes).
    MulticlassClassification {
        /// Number of classes.
        n_classes: usize,
    },
    /// Ranking task.
    Ranking,
}

impl TaskKind {
    /// Returns the number of output groups for this task.
    pub fn n_groups(&self) -> usize {
        match self {
            Self::Regression => 1,
            Self::BinaryClassification => 1,
            Self::MulticlassClassification { n_classes } => *n_classes,
            Self::Ranking => 1,
        }
    }
}

/// Introspection data about a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature names, when the model file lists them.
    pub feature_names: Option<Vec<String>>,
    /// Number of features (`max_feature_idx + 1`).
    pub n_features: usize,
    /// Number of output groups.
    pub n_groups: usize,
    /// Trees added per boosting iteration.
    pub trees_per_iteration: usize,
    /// Task type.
    pub task: TaskKind,
    /// Transform from raw margins to final predictions.
    pub transform: OutputTransform,
    /// Raw scores are divided by the number of iterations (random forest mode).
    pub average_output: bool,
    /// Objective string as stored in the model file.
    pub objective: Option<String>,
}

impl Default for ModelMeta {
    fn default() -> Self {
        Self {
            feature_names: None,
            n_features: 0,
            n_groups: 1,
            trees_per_iteration: 1,
            task: TaskKind::default(),
            transform: OutputTransform::default(),
            average_output: false,
            objective: None,
        }
    }
}

impl ModelMeta {
    /// Create metadata for a regression task.
    pub fn for_regression(n_features: usize) -> Self {
        Self {
            n_features,
            ..Default::default()
        }
    }

    /// Create metadata for binary classification with a unit sigmoid.
    pub fn for_binary_classification(n_features: usize) -> Self {
        Self {
            n_features,
            task: TaskKind::BinaryClassification,
            transform: OutputTransform::Sigmoid { scale: 1.0 },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_kind_n_groups() {
        assert_eq!(TaskKind::Regression.n_groups(), 1);
        assert_eq!(TaskKind::BinaryClassification.n_groups(), 1);
        assert_eq!(
            TaskKind::MulticlassClassification { n_classes: 5 }.n_groups(),
            5
        );
    }

    #[test]
    fn meta_factories() {
        let reg = ModelMeta::for_regression(10);
        assert_eq!(reg.n_features, 10);
        assert_eq!(reg.n_groups, 1);
        assert_eq!(reg.transform, OutputTransform::Identity);

        let bin = ModelMeta::for_binary_classification(5);
        assert_eq!(bin.task, TaskKind::BinaryClassification);
        assert_eq!(bin.transform, OutputTransform::Sigmoid { scale: 1.0 });
    }

    #[test]
    fn meta_serde_roundtrip() {
        let meta = ModelMeta {
            feature_names: Some(vec!["a".into(), "b".into(), "c".into()]),
            n_groups: 3,
            trees_per_iteration: 3,
            task: TaskKind::MulticlassClassification { n_classes: 3 },
            transform: OutputTransform::Softmax,
            ..ModelMeta::for_regression(3)
        };

        let json = serde_json::to_string(&meta).unwrap();
        let restored: ModelMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, meta);
    }
}
