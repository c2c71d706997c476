//! Binary classification metrics

use crate::error::{FraudError, Result};
use crate::training::ClassScores;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// 2x2 confusion matrix laid out as [[TN, FP], [FN, TP]]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut cm = Self::default();
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            match (*t > 0.5, *p > 0.5) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        cm
    }

    pub fn as_array(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }
}

/// Test-set metrics for one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `None` when the test labels hold a single class
    pub roc_auc: Option<f64>,
    pub confusion_matrix: ConfusionMatrix,
}

impl ClassificationMetrics {
    /// Compute every metric from true labels, hard predictions and a
    /// probability-like score
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>, y_score: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() || y_true.len() != y_score.len() {
            return Err(FraudError::ShapeError {
                expected: format!("{} predictions and scores", y_true.len()),
                actual: format!("{} predictions, {} scores", y_pred.len(), y_score.len()),
            });
        }
        if y_true.is_empty() {
            return Err(FraudError::EvaluationError("Empty test set".to_string()));
        }

        let cm = ConfusionMatrix::from_labels(y_true, y_pred);
        let (tp, fp, fn_) = (cm.tp as f64, cm.fp as f64, cm.fn_ as f64);

        let accuracy = (cm.tp + cm.tn) as f64 / cm.total() as f64;
        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy,
            precision,
            recall,
            f1,
            roc_auc: roc_auc(y_true, y_score),
            confusion_matrix: cm,
        })
    }
}

/// Hard labels from probabilities: positive iff p > threshold
pub fn threshold_labels(proba: &Array1<f64>, threshold: f64) -> Array1<f64> {
    proba.mapv(|p| if p > threshold { 1.0 } else { 0.0 })
}

/// Rescale scores to [0, 1): (s - min) / (max - min + 1e-9)
pub fn min_max_normalize(scores: &Array1<f64>) -> Array1<f64> {
    if scores.is_empty() {
        return scores.clone();
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    scores.mapv(|s| (s - min) / (max - min + 1e-9))
}

/// Probability-like score for evaluation, whatever the classifier exposes
pub fn probability_like(scores: &ClassScores) -> Array1<f64> {
    match scores {
        ClassScores::Probability(p) => p.clone(),
        ClassScores::Decision(d) => min_max_normalize(d),
    }
}

/// Area under the ROC curve via the rank-sum statistic, averaging the
/// ranks of tied scores. `None` if either class is absent.
pub fn roc_auc(y_true: &Array1<f64>, y_score: &Array1<f64>) -> Option<f64> {
    let n = y_true.len();
    let n_pos = y_true.iter().filter(|&&t| t > 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| y_score[a].total_cmp(&y_score[b]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && y_score[order[j + 1]] == y_score[order[i]] {
            j += 1;
        }
        // ranks are 1-based; a tied run shares the mean of its positions
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg_rank;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = (0..n).filter(|&k| y_true[k] > 0.5).map(|k| ranks[k]).sum();
    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Some((pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_metrics() {
        let y_true = array![1.0, 0.0, 1.0, 1.0, 0.0];
        let y_pred = array![1.0, 0.0, 0.0, 1.0, 1.0];
        let y_score = array![0.9, 0.1, 0.4, 0.8, 0.6];

        let m = ClassificationMetrics::compute(&y_true, &y_pred, &y_score).unwrap();
        assert!((m.accuracy - 0.6).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(m.confusion_matrix.as_array(), [[1, 1], [1, 2]]);
        // positives outrank negatives in 5 of 6 pairs
        assert!((m.roc_auc.unwrap() - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_positives_no_error() {
        let y_true = array![0.0, 0.0, 0.0];
        let y_pred = array![0.0, 0.0, 0.0];
        let y_score = array![0.1, 0.2, 0.3];

        let m = ClassificationMetrics::compute(&y_true, &y_pred, &y_score).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.roc_auc, None);
    }

    #[test]
    fn test_roc_auc_ties_average() {
        let y_true = array![0.0, 1.0, 0.0, 1.0];
        let y_score = array![0.5, 0.5, 0.5, 0.5];
        assert_eq!(roc_auc(&y_true, &y_score), Some(0.5));

        let perfect = array![0.1, 0.9, 0.2, 0.8];
        assert_eq!(roc_auc(&y_true, &perfect), Some(1.0));
    }

    #[test]
    fn test_min_max_normalize() {
        let normalized = min_max_normalize(&array![-2.0, 0.0, 2.0]);
        assert_eq!(normalized[0], 0.0);
        assert!((normalized[1] - 0.5).abs() < 1e-9);
        assert!(normalized[2] < 1.0 && normalized[2] > 0.999);

        let constant = min_max_normalize(&array![3.0, 3.0]);
        assert_eq!(constant.to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_probability_like() {
        let p = ClassScores::Probability(array![0.2, 0.7]);
        assert_eq!(probability_like(&p), array![0.2, 0.7]);

        let d = ClassScores::Decision(array![-1.0, 1.0]);
        let scaled = probability_like(&d);
        assert_eq!(scaled[0], 0.0);
        assert!(scaled[1] > 0.99);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(threshold_labels(&array![0.5, 0.51, 0.49], 0.5), array![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let err = ClassificationMetrics::compute(&array![1.0], &array![1.0, 0.0], &array![0.5]).unwrap_err();
        assert!(matches!(err, FraudError::ShapeError { .. }));
    }
}
