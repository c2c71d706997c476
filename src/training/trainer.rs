//! Candidate model construction and training

use super::classifier::TrainedClassifier;
use super::linear_models::LogisticRegression;
use super::pipeline::FraudPipeline;
use super::random_forest::{MaxFeatures, RandomForest};
use super::xgboost::{XGBoostClassifier, XGBoostConfig};
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::preprocessing::PreparedData;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::info;

/// Candidate model families, in training order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    XGBoost,
    RandomForest,
    LogisticRegression,
}

impl ModelKind {
    /// Every candidate, in the order they are trained and tie-broken
    pub const ALL: [ModelKind; 3] = [
        ModelKind::XGBoost,
        ModelKind::RandomForest,
        ModelKind::LogisticRegression,
    ];

    /// Unfitted classifier configured for this family
    pub fn build(self, config: &TrainingConfig) -> TrainedClassifier {
        match self {
            ModelKind::XGBoost => TrainedClassifier::XGBoost(XGBoostClassifier::new(
                XGBoostConfig::from_params(&config.boosting, config.random_state),
            )),
            ModelKind::RandomForest => TrainedClassifier::RandomForest(
                RandomForest::new(config.forest.n_estimators)
                    .with_max_depth(config.forest.max_depth)
                    .with_max_features(MaxFeatures::Sqrt)
                    .with_random_state(config.random_state),
            ),
            ModelKind::LogisticRegression => {
                TrainedClassifier::LogisticRegression(LogisticRegression::from_params(&config.logistic))
            }
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::XGBoost => "XGBoost",
            ModelKind::RandomForest => "RandomForest",
            ModelKind::LogisticRegression => "LogisticRegression",
        };
        write!(f, "{}", name)
    }
}

/// Trains every candidate on the same prepared data
pub struct Trainer {
    config: TrainingConfig,
    kinds: Vec<ModelKind>,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            kinds: ModelKind::ALL.to_vec(),
        }
    }

    /// Restrict training to a subset of families, keeping their given order
    pub fn with_kinds(mut self, kinds: &[ModelKind]) -> Self {
        self.kinds = kinds.to_vec();
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fit one pipeline per candidate, in order. `on_start` is called before
    /// each fit so callers can report progress.
    pub fn train_all<F>(&self, data: &PreparedData, mut on_start: F) -> Result<Vec<FraudPipeline>>
    where
        F: FnMut(ModelKind),
    {
        let mut pipelines = Vec::with_capacity(self.kinds.len());

        for &kind in &self.kinds {
            on_start(kind);
            let start = Instant::now();
            let pipeline = FraudPipeline::fit(
                kind,
                &data.preprocessor,
                &data.x_train,
                &data.y_train,
                &self.config,
            )?;
            info!(
                model = %kind,
                rows = data.x_train.height(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Trained model"
            );
            pipelines.push(pipeline);
        }

        Ok(pipelines)
    }
}
