//! Model training module
//!
//! Provides the three candidate fraud classifiers and the pipeline that
//! bundles each with its own fitted preprocessor:
//! - XGBoost-style gradient-boosted trees
//! - Random Forest over CART trees
//! - Logistic regression

pub mod classifier;
pub mod decision_tree;
pub mod linear_models;
pub mod pipeline;
pub mod random_forest;
pub mod trainer;
pub mod xgboost;

pub use classifier::{ClassScores, TrainedClassifier};
pub use decision_tree::{DecisionTree, Node};
pub use linear_models::LogisticRegression;
pub use pipeline::FraudPipeline;
pub use random_forest::{MaxFeatures, RandomForest};
pub use trainer::{ModelKind, Trainer};
pub use xgboost::{XGBoostClassifier, XGBoostConfig};
