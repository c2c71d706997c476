//! Test-set evaluation and best-model selection

use super::metrics::{probability_like, threshold_labels, ClassificationMetrics};
use crate::error::Result;
use crate::training::{FraudPipeline, ModelKind};
use ndarray::Array1;
use polars::prelude::*;
use std::cmp::Ordering;
use tracing::info;

/// Hard-label threshold used for evaluation (strictly greater than)
pub const EVALUATION_THRESHOLD: f64 = 0.5;

/// Ranking key: F1 first, then ROC-AUC. An undefined ROC-AUC ranks below
/// any defined value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionKey {
    pub f1: f64,
    pub roc_auc: Option<f64>,
}

impl SelectionKey {
    pub fn new(f1: f64, roc_auc: Option<f64>) -> Self {
        Self { f1, roc_auc }
    }

    pub fn from_metrics(metrics: &ClassificationMetrics) -> Self {
        Self::new(metrics.f1, metrics.roc_auc)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.f1.total_cmp(&other.f1).then_with(|| match (self.roc_auc, other.roc_auc) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        })
    }
}

/// Pick the candidate with the largest key; exact ties keep the earliest
pub fn select_best<K, I>(candidates: I) -> Option<K>
where
    I: IntoIterator<Item = (K, SelectionKey)>,
{
    let mut best: Option<(K, SelectionKey)> = None;
    for (candidate, key) in candidates {
        let replace = match &best {
            None => true,
            Some((_, best_key)) => key.compare(best_key) == Ordering::Greater,
        };
        if replace {
            best = Some((candidate, key));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Metrics for one trained pipeline
#[derive(Debug, Clone)]
pub struct ModelEvaluation {
    pub kind: ModelKind,
    pub metrics: ClassificationMetrics,
}

/// Score a single pipeline on the test features
pub fn evaluate_pipeline(
    pipeline: &FraudPipeline,
    x_test: &DataFrame,
    y_test: &Array1<f64>,
) -> Result<ModelEvaluation> {
    let scores = pipeline.scores(x_test)?;
    let proba = probability_like(&scores);
    let y_pred = threshold_labels(&proba, EVALUATION_THRESHOLD);
    let metrics = ClassificationMetrics::compute(y_test, &y_pred, &proba)?;

    info!(
        model = %pipeline.kind(),
        accuracy = metrics.accuracy,
        f1 = metrics.f1,
        roc_auc = ?metrics.roc_auc,
        "Evaluated model"
    );

    Ok(ModelEvaluation {
        kind: pipeline.kind(),
        metrics,
    })
}

/// Score every pipeline, preserving order
pub fn evaluate_models(
    pipelines: &[FraudPipeline],
    x_test: &DataFrame,
    y_test: &Array1<f64>,
) -> Result<Vec<ModelEvaluation>> {
    pipelines
        .iter()
        .map(|pipeline| evaluate_pipeline(pipeline, x_test, y_test))
        .collect()
}

/// Index of the best evaluation under the (F1, ROC-AUC) rule
pub fn best_index(evaluations: &[ModelEvaluation]) -> Option<usize> {
    select_best(
        evaluations
            .iter()
            .enumerate()
            .map(|(i, e)| (i, SelectionKey::from_metrics(&e.metrics))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f1_dominates() {
        let candidates = vec![
            ("A", SelectionKey::new(0.80, Some(0.90))),
            ("B", SelectionKey::new(0.80, Some(0.95))),
            ("C", SelectionKey::new(0.85, Some(0.10))),
        ];
        assert_eq!(select_best(candidates), Some("C"));
    }

    #[test]
    fn test_auc_breaks_f1_tie() {
        let candidates = vec![
            ("A", SelectionKey::new(0.80, Some(0.90))),
            ("B", SelectionKey::new(0.80, Some(0.95))),
        ];
        assert_eq!(select_best(candidates), Some("B"));
    }

    #[test]
    fn test_undefined_auc_ranks_lowest() {
        let candidates = vec![
            ("A", SelectionKey::new(0.5, None)),
            ("B", SelectionKey::new(0.5, Some(0.0))),
        ];
        assert_eq!(select_best(candidates), Some("B"));
    }

    #[test]
    fn test_exact_tie_keeps_first() {
        let candidates = vec![
            (ModelKind::XGBoost, SelectionKey::new(0.7, None)),
            (ModelKind::RandomForest, SelectionKey::new(0.7, None)),
            (ModelKind::LogisticRegression, SelectionKey::new(0.7, None)),
        ];
        assert_eq!(select_best(candidates), Some(ModelKind::XGBoost));
    }

    #[test]
    fn test_empty() {
        assert_eq!(select_best(Vec::<(u8, SelectionKey)>::new()), None);
    }
}
