//! End-to-end training run: load, prepare, train, evaluate, select, persist

use crate::config::PipelineConfig;
use crate::data::{load_datasets, Datasets};
use crate::error::{FraudError, Result};
use crate::evaluation::{best_index, evaluate_models, top_features, FeatureImportance, ModelEvaluation};
use crate::export::save_model;
use crate::preprocessing::prepare_features;
use crate::training::{FraudPipeline, ModelKind, Trainer};
use std::path::PathBuf;
use tracing::info;

/// Everything a training run produces
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Test metrics per candidate, in training order
    pub evaluations: Vec<ModelEvaluation>,
    /// The selected pipeline, as persisted
    pub best: FraudPipeline,
    pub top_features: Vec<FeatureImportance>,
    pub model_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

impl TrainingOutcome {
    pub fn best_kind(&self) -> ModelKind {
        self.best.kind()
    }

    pub fn best_evaluation(&self) -> Option<&ModelEvaluation> {
        self.evaluations.iter().find(|e| e.kind == self.best.kind())
    }
}

/// Run the full training workflow. `on_model` is called before each
/// candidate is fitted.
pub fn run_training<F>(config: &PipelineConfig, on_model: F) -> Result<TrainingOutcome>
where
    F: FnMut(ModelKind),
{
    let datasets = load_datasets(&config.datasets)?;
    train_on_datasets(config, datasets, on_model)
}

/// Training workflow on tables that are already loaded
pub fn train_on_datasets<F>(config: &PipelineConfig, datasets: Datasets, on_model: F) -> Result<TrainingOutcome>
where
    F: FnMut(ModelKind),
{
    let data = prepare_features(&datasets.train, &datasets.test, &config.datasets.target_column)?;

    let trainer = Trainer::new(config.training.clone());
    let mut pipelines = trainer.train_all(&data, on_model)?;

    let evaluations = evaluate_models(&pipelines, &data.x_test, &data.y_test)?;
    let best_idx = best_index(&evaluations)
        .ok_or_else(|| FraudError::EvaluationError("No candidate models were trained".to_string()))?;
    let best = pipelines.swap_remove(best_idx);

    info!(model = %best.kind(), "Selected best model");

    let top_features = top_features(&best, config.top_features)?;
    save_model(&best, &config.model_path)?;

    Ok(TrainingOutcome {
        evaluations,
        best,
        top_features,
        model_path: config.model_path.clone(),
        train_path: datasets.train_path,
        test_path: datasets.test_path,
    })
}
