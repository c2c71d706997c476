//! Error types for the fraud classification pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, FraudError>;

/// Main error type for loading, training, persistence and prediction
#[derive(Error, Debug)]
pub enum FraudError {
    #[error("Dataset not found. Tried '{primary}' and '{fallback}'.")]
    DatasetNotFound { primary: String, fallback: String },

    #[error("Both datasets must contain target column '{0}'.")]
    MissingTargetColumn(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Evaluation error: {0}")]
    EvaluationError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Empty input payload")]
    EmptyPayload,

    #[error("{0}")]
    InvalidPayload(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for FraudError {
    fn from(err: polars::error::PolarsError) -> Self {
        FraudError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FraudError {
    fn from(err: serde_json::Error) -> Self {
        FraudError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for FraudError {
    fn from(err: ndarray::ShapeError) -> Self {
        FraudError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_not_found_message() {
        let err = FraudError::DatasetNotFound {
            primary: "train_claims.csv".to_string(),
            fallback: "training_data.csv".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Dataset not found. Tried 'train_claims.csv' and 'training_data.csv'."
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FraudError = io_err.into();
        assert!(matches!(err, FraudError::IoError(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FraudError = json_err.into();
        assert!(matches!(err, FraudError::SerializationError(_)));
    }
}
