//! Preprocessor and classifier bundled as one fitted unit

use super::classifier::{ClassScores, TrainedClassifier};
use super::trainer::ModelKind;
use crate::config::TrainingConfig;
use crate::error::{FraudError, Result};
use crate::preprocessing::ColumnPreprocessor;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted pipeline: the unit of evaluation, persistence and inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudPipeline {
    kind: ModelKind,
    preprocessor: ColumnPreprocessor,
    classifier: TrainedClassifier,
}

impl FraudPipeline {
    /// Fit a fresh copy of `preprocessor` and a `kind` classifier on the
    /// training features
    pub fn fit(
        kind: ModelKind,
        preprocessor: &ColumnPreprocessor,
        x_train: &DataFrame,
        y_train: &Array1<f64>,
        config: &TrainingConfig,
    ) -> Result<Self> {
        if x_train.height() != y_train.len() {
            return Err(FraudError::ShapeError {
                expected: format!("{} labels", x_train.height()),
                actual: format!("{} labels", y_train.len()),
            });
        }

        let mut preprocessor = preprocessor.clone();
        let x = preprocessor.fit_transform(x_train)?;

        let mut classifier = kind.build(config);
        classifier.fit(&x, y_train)?;

        Ok(Self {
            kind,
            preprocessor,
            classifier,
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn preprocessor(&self) -> &ColumnPreprocessor {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &TrainedClassifier {
        &self.classifier
    }

    /// Model matrix for a frame that holds every input column
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        self.preprocessor.transform(df)
    }

    pub fn scores(&self, df: &DataFrame) -> Result<ClassScores> {
        self.classifier.scores(&self.transform(df)?)
    }

    /// Positive-class probability per row
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Array1<f64>> {
        self.classifier.predict_proba(&self.transform(df)?)
    }

    /// Hard 0/1 labels, positive iff probability > 0.5
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        Ok(self
            .predict_proba(df)?
            .mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    /// (output feature name, importance) pairs, highest first
    pub fn feature_importances(&self) -> Result<Vec<(String, f64)>> {
        let names = self.preprocessor.feature_names_out()?;
        let importances = self
            .classifier
            .feature_importances()
            .ok_or(FraudError::ModelNotFitted)?;

        if names.len() != importances.len() {
            return Err(FraudError::ShapeError {
                expected: format!("{} importances", names.len()),
                actual: format!("{} importances", importances.len()),
            });
        }

        let mut ranked: Vec<(String, f64)> = names.into_iter().zip(importances.iter().copied()).collect();
        // stable sort keeps column order among equal importances
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(ranked)
    }
}
