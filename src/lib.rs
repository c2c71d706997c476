//! Fraud Claims - insurance-claim fraud classifier
//!
//! This crate trains and serves a binary classifier that flags fraudulent
//! insurance claims:
//! - Dataset loading with fallback file names and boolean-token normalization
//! - Train/test schema alignment and per-column-type preprocessing
//! - Three candidate models: XGBoost-style boosting, Random Forest, Logistic Regression
//! - Test-set evaluation, (F1, ROC-AUC) model selection and feature importances
//! - JSON model artifacts and single-record prediction
//!
//! # Modules
//!
//! ## Data
//! - [`data`] - CSV loading, boolean-like normalization
//! - [`preprocessing`] - Alignment, imputation, scaling, one-hot encoding
//!
//! ## Modeling
//! - [`training`] - Candidate classifiers and fitted pipelines
//! - [`evaluation`] - Metrics, selection, importance report
//!
//! ## Serving
//! - [`export`] - Model artifact persistence
//! - [`inference`] - Prediction on raw records
//! - [`workflow`] - The end-to-end training run
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Data
pub mod data;
pub mod preprocessing;

// Modeling
pub mod training;
pub mod evaluation;

// Serving
pub mod export;
pub mod inference;
pub mod workflow;
pub mod cli;

pub use error::{FraudError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{FraudError, Result};

    // Configuration
    pub use crate::config::{DatasetConfig, PipelineConfig, TrainingConfig};

    // Data
    pub use crate::data::{coerce_booleans, load_datasets, normalize_boolean_like, Datasets};

    // Preprocessing
    pub use crate::preprocessing::{align_features, prepare_features, ColumnPreprocessor, PreparedData};

    // Training
    pub use crate::training::{FraudPipeline, ModelKind, TrainedClassifier, Trainer};

    // Evaluation
    pub use crate::evaluation::{
        evaluate_models, select_best, top_features, ClassificationMetrics, FeatureImportance,
        ModelEvaluation, SelectionKey,
    };

    // Persistence and inference
    pub use crate::export::{load_model, save_model};
    pub use crate::inference::{Label, Prediction, Predictor};
    pub use crate::workflow::{run_training, train_on_datasets, TrainingOutcome};
}
