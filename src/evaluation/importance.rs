//! Top-N feature importance report for the selected pipeline

use crate::error::Result;
use crate::training::{FraudPipeline, ModelKind};
use serde::Serialize;

/// One ranked feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// What the importance values mean for each model family
pub fn importance_measure(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::XGBoost => "split count",
        ModelKind::RandomForest => "mean impurity decrease",
        ModelKind::LogisticRegression => "|coefficient|",
    }
}

/// The `top_n` most important output features, highest first
pub fn top_features(pipeline: &FraudPipeline, top_n: usize) -> Result<Vec<FeatureImportance>> {
    Ok(pipeline
        .feature_importances()?
        .into_iter()
        .take(top_n)
        .map(|(feature, importance)| FeatureImportance { feature, importance })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::preprocessing::ColumnPreprocessor;
    use ndarray::Array1;
    use polars::prelude::*;

    #[test]
    fn test_top_features_truncates_and_sorts() {
        let n = 20;
        let amount: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let noise: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64).collect();
        let region: Vec<&str> = (0..n).map(|i| ["a", "b"][i % 2]).collect();
        let y = Array1::from_iter((0..n).map(|i| if i >= 10 { 1.0 } else { 0.0 }));

        let df = df!("amount" => &amount, "noise" => &noise, "region" => &region).unwrap();
        let template = ColumnPreprocessor::from_schema(&df);
        let pipeline = FraudPipeline::fit(
            ModelKind::LogisticRegression,
            &template,
            &df,
            &y,
            &TrainingConfig::new(),
        )
        .unwrap();

        let top = top_features(&pipeline, 2).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].feature, "num__amount");
        assert!(top[0].importance >= top[1].importance);

        assert_eq!(top_features(&pipeline, 100).unwrap().len(), 4);
    }

    #[test]
    fn test_importance_measure() {
        assert_eq!(importance_measure(ModelKind::LogisticRegression), "|coefficient|");
    }
}
