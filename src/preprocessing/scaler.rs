//! Standard (z-score) feature scaling

use crate::error::{FraudError, Result};
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: f64,
    /// Population standard deviation, or 1.0 for a constant column
    pub scale: f64,
}

/// Standard scaler: (x - mean) / std
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on already-imputed columns, given as (name, values) pairs
    pub fn fit<'a, I>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [f64])>,
    {
        self.params.clear();
        for (name, values) in columns {
            self.params.push((name.to_string(), Self::compute_params(values)));
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale one column in place
    pub fn transform_column(&self, column: &str, values: &mut [f64]) -> Result<()> {
        let params = self.params(column)?;
        for v in values.iter_mut() {
            *v = (*v - params.mean) / params.scale;
        }
        Ok(())
    }

    /// Fitted parameters for `column`
    pub fn params(&self, column: &str) -> Result<&ScalerParams> {
        if !self.is_fitted {
            return Err(FraudError::ModelNotFitted);
        }
        self.params
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, params)| params)
            .ok_or_else(|| FraudError::FeatureNotFound(column.to_string()))
    }

    fn compute_params(values: &[f64]) -> ScalerParams {
        if values.is_empty() {
            return ScalerParams { mean: 0.0, scale: 1.0 };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        ScalerParams {
            mean,
            scale: if std == 0.0 { 1.0 } else { std },
        }
    }
}
