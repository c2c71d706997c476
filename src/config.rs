//! Pipeline configuration
//!
//! Default file names, target column, artifact path and model
//! hyper-parameters. Everything is passed explicitly through call
//! signatures; the CLI overrides individual fields.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the binary fraud label column
pub const DEFAULT_TARGET_COLUMN: &str = "Is_Fraudulent";
/// Default location of the persisted pipeline
pub const DEFAULT_MODEL_PATH: &str = "fraud_model.json";
/// Seed shared by every stochastic component
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Where the labeled train/test tables live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub train_path: PathBuf,
    pub train_fallback: PathBuf,
    pub test_path: PathBuf,
    pub test_fallback: PathBuf,
    pub target_column: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("train_claims.csv"),
            train_fallback: PathBuf::from("training_data.csv"),
            test_path: PathBuf::from("test_claims.csv"),
            test_fallback: PathBuf::from("testting_data.csv"),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
        }
    }
}

impl DatasetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the primary training file
    pub fn with_train_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.train_path = path.into();
        self
    }

    /// Builder method to set the primary test file
    pub fn with_test_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.test_path = path.into();
        self
    }

    /// Builder method to set the label column
    pub fn with_target_column(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }
}

/// Gradient-boosted trees hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 250,
            max_depth: 6,
            learning_rate: 0.05,
            subsample: 0.9,
            colsample_bytree: 0.9,
        }
    }
}

/// Random forest hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure
    pub max_depth: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_depth: None,
        }
    }
}

/// Logistic regression hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticParams {
    pub max_iter: usize,
    /// Inverse L2 regularization strength
    pub c: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            c: 1.0,
        }
    }
}

/// Configuration for the three candidate models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub random_state: u64,
    pub boosting: BoostingParams,
    pub forest: ForestParams,
    pub logistic: LogisticParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            random_state: DEFAULT_RANDOM_STATE,
            boosting: BoostingParams::default(),
            forest: ForestParams::default(),
            logistic: LogisticParams::default(),
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the shared seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to shrink every ensemble, mostly for tests and benches
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.boosting.n_estimators = n_estimators;
        self.forest.n_estimators = n_estimators;
        self
    }
}

/// End-to-end training run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub datasets: DatasetConfig,
    pub training: TrainingConfig,
    pub model_path: PathBuf,
    /// How many features the importance report prints
    pub top_features: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            datasets: DatasetConfig::default(),
            training: TrainingConfig::default(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            top_features: 20,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_datasets(mut self, datasets: DatasetConfig) -> Self {
        self.datasets = datasets;
        self
    }

    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}
