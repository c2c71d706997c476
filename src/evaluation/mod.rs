//! Model evaluation and selection
//!
//! - [`metrics`]: accuracy, precision, recall, F1, ROC-AUC, confusion matrix
//! - [`selector`]: per-model test scoring and (F1, ROC-AUC) selection
//! - [`importance`]: top-N feature importances of the winner

pub mod importance;
pub mod metrics;
pub mod selector;

pub use importance::{importance_measure, top_features, FeatureImportance};
pub use metrics::{
    min_max_normalize, probability_like, roc_auc, threshold_labels, ClassificationMetrics,
    ConfusionMatrix,
};
pub use selector::{
    best_index, evaluate_models, evaluate_pipeline, select_best, ModelEvaluation, SelectionKey,
    EVALUATION_THRESHOLD,
};
