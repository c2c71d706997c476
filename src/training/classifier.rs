//! Unified classifier over the candidate algorithms

use super::linear_models::LogisticRegression;
use super::random_forest::RandomForest;
use super::xgboost::XGBoostClassifier;
use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Per-row scores a classifier produces for the positive class
#[derive(Debug, Clone, PartialEq)]
pub enum ClassScores {
    /// Calibrated probabilities in [0, 1]
    Probability(Array1<f64>),
    /// Unbounded margins; larger means more likely positive
    Decision(Array1<f64>),
}

impl ClassScores {
    pub fn values(&self) -> &Array1<f64> {
        match self {
            ClassScores::Probability(v) | ClassScores::Decision(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

/// A fitted classifier of any supported family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedClassifier {
    XGBoost(XGBoostClassifier),
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl TrainedClassifier {
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            TrainedClassifier::XGBoost(m) => {
                m.fit(x, y)?;
            }
            TrainedClassifier::RandomForest(m) => {
                m.fit(x, y)?;
            }
            TrainedClassifier::LogisticRegression(m) => {
                m.fit(x, y)?;
            }
        }
        Ok(())
    }

    /// Positive-class probability per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedClassifier::XGBoost(m) => m.predict_proba(x),
            TrainedClassifier::RandomForest(m) => m.predict_proba(x),
            TrainedClassifier::LogisticRegression(m) => m.predict_proba(x),
        }
    }

    /// The richest score each family exposes. Every supported family
    /// produces probabilities.
    pub fn scores(&self, x: &Array2<f64>) -> Result<ClassScores> {
        self.predict_proba(x).map(ClassScores::Probability)
    }

    /// Importance per output feature, in matrix column order
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        match self {
            TrainedClassifier::XGBoost(m) => m.feature_importances(),
            TrainedClassifier::RandomForest(m) => m.feature_importances().cloned(),
            TrainedClassifier::LogisticRegression(m) => {
                m.coefficients.as_ref().map(|c| c.mapv(f64::abs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scores_are_probabilities() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut clf = TrainedClassifier::LogisticRegression(LogisticRegression::new());
        clf.fit(&x, &y).unwrap();

        match clf.scores(&x).unwrap() {
            ClassScores::Probability(p) => assert!(p.iter().all(|v| (0.0..=1.0).contains(v))),
            ClassScores::Decision(_) => panic!("expected probabilities"),
        }
    }

    #[test]
    fn test_forest_importances() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut clf = TrainedClassifier::RandomForest(RandomForest::new(5));
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.feature_importances().unwrap().len(), 1);
    }

    #[test]
    fn test_class_scores_values() {
        let scores = ClassScores::Decision(array![-1.0, 2.0]);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.values()[1], 2.0);
    }
}
