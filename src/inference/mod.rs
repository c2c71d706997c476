//! Prediction service
//!
//! Loads a persisted pipeline and scores raw claim records:
//! - JSON records (`{"instance": {...}}` payloads or bare objects)
//! - polars frames, one prediction per row
//! - Schema reconciliation: extra fields dropped, absent fields imputed
//! - Inclusive 0.5 probability threshold

mod predictor;

pub use predictor::{parse_payload, Label, Prediction, Predictor, PREDICTION_THRESHOLD};
