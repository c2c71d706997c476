//! Single-record and batch fraud prediction from a persisted pipeline

use crate::data::{coerce_booleans, record_to_frame};
use crate::error::{FraudError, Result};
use crate::export::load_model;
use crate::training::FraudPipeline;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Probability at or above which a claim is flagged
pub const PREDICTION_THRESHOLD: f64 = 0.5;

/// Binary fraud verdict, serialized as "TRUE" / "FALSE"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
}

impl Label {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= PREDICTION_THRESHOLD {
            Label::True
        } else {
            Label::False
        }
    }

    pub fn is_fraud(self) -> bool {
        self == Label::True
    }
}

/// Prediction for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: Label,
    pub probability: f64,
}

impl Prediction {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            prediction: Label::from_probability(probability),
            probability,
        }
    }
}

/// Extract the record from a `{"instance": {...}}` document
pub fn parse_payload(input: &str) -> Result<Map<String, Value>> {
    if input.trim().is_empty() {
        return Err(FraudError::EmptyPayload);
    }

    let document: Value = serde_json::from_str(input)
        .map_err(|e| FraudError::InvalidPayload(format!("Invalid JSON payload: {}", e)))?;

    match document.get("instance") {
        Some(Value::Object(record)) => Ok(record.clone()),
        _ => Err(FraudError::InvalidPayload(
            "Payload must include 'instance' object".to_string(),
        )),
    }
}

/// Wraps a fitted pipeline for inference on raw records
#[derive(Debug, Clone)]
pub struct Predictor {
    pipeline: FraudPipeline,
}

impl Predictor {
    pub fn new(pipeline: FraudPipeline) -> Self {
        Self { pipeline }
    }

    /// Load the artifact written by training
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_model(path)?))
    }

    pub fn pipeline(&self) -> &FraudPipeline {
        &self.pipeline
    }

    /// Predict one JSON record. Columns the model never saw are dropped and
    /// absent ones are treated as missing.
    pub fn predict_record(&self, record: &Map<String, Value>) -> Result<Prediction> {
        let frame = coerce_booleans(&record_to_frame(record)?)?;
        let conformed = self.pipeline.preprocessor().conform_rows(&frame, 1)?;

        let proba = self.pipeline.predict_proba(&conformed)?;
        let probability = proba
            .get(0)
            .copied()
            .ok_or_else(|| FraudError::DataError("No prediction produced".to_string()))?;

        debug!(fields = record.len(), probability, "Predicted record");
        Ok(Prediction::from_probability(probability))
    }

    /// Predict every row of a frame
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Vec<Prediction>> {
        if df.height() == 0 {
            return Ok(Vec::new());
        }
        let frame = coerce_booleans(df)?;
        let conformed = self.pipeline.preprocessor().conform(&frame)?;
        let proba = self.pipeline.predict_proba(&conformed)?;
        Ok(proba.iter().map(|&p| Prediction::from_probability(p)).collect())
    }

    /// Parse a `{"instance": {...}}` document and predict it
    pub fn predict_payload(&self, input: &str) -> Result<Prediction> {
        self.predict_record(&parse_payload(input)?)
    }
}
