//! Column-wise preprocessing pipeline
//!
//! Numeric columns go through median imputation and standard scaling,
//! categorical columns through most-frequent imputation and one-hot
//! encoding. The output matrix holds the numeric block first, then the
//! categorical block, each in input column order.

use super::{
    encoder::OneHotEncoder,
    imputer::{ImputeStrategy, Imputer},
    numeric_values,
    scaler::StandardScaler,
    text_values, ColumnKind,
};
use crate::error::{FraudError, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NumericBranch {
    imputer: Imputer,
    scaler: StandardScaler,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CategoricalBranch {
    imputer: Imputer,
    encoder: OneHotEncoder,
}

/// Preprocessor fitted on the training features and reused, never re-fitted,
/// for evaluation and inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    columns: Vec<(String, ColumnKind)>,
    numeric: NumericBranch,
    categorical: CategoricalBranch,
    is_fitted: bool,
}

impl ColumnPreprocessor {
    /// Create an unfitted preprocessor over an explicit column schema
    pub fn new(columns: Vec<(String, ColumnKind)>) -> Self {
        Self {
            columns,
            numeric: NumericBranch {
                imputer: Imputer::new(ImputeStrategy::Median),
                scaler: StandardScaler::new(),
            },
            categorical: CategoricalBranch {
                imputer: Imputer::new(ImputeStrategy::MostFrequent),
                encoder: OneHotEncoder::new(),
            },
            is_fitted: false,
        }
    }

    /// Infer the schema from a frame's dtypes, in column order
    pub fn from_schema(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| (column.name().to_string(), ColumnKind::from_dtype(column.dtype())))
            .collect();
        Self::new(columns)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn columns_of(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Ordered input columns the preprocessor expects
    pub fn feature_names_in(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, kind)| *kind)
    }

    /// Fit both branches on the training features
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let start = Instant::now();
        self.check_columns(df)?;

        let numeric_cols = self.columns_of(ColumnKind::Numeric);
        let categorical_cols = self.columns_of(ColumnKind::Categorical);

        self.numeric.imputer.fit(df, &numeric_cols)?;
        let imputed_numeric = numeric_cols
            .iter()
            .map(|name| {
                self.numeric
                    .imputer
                    .transform_numeric(name, &numeric_values(df, name)?)
            })
            .collect::<Result<Vec<_>>>()?;
        self.numeric.scaler.fit(
            numeric_cols
                .iter()
                .zip(&imputed_numeric)
                .map(|(name, values)| (name.as_str(), values.as_slice())),
        )?;

        self.categorical.imputer.fit(df, &categorical_cols)?;
        let imputed_text = categorical_cols
            .iter()
            .map(|name| {
                self.categorical
                    .imputer
                    .transform_text(name, &text_values(df, name)?)
            })
            .collect::<Result<Vec<_>>>()?;
        self.categorical.encoder.fit(
            categorical_cols
                .iter()
                .zip(&imputed_text)
                .map(|(name, values)| (name.as_str(), values.as_slice())),
        )?;

        self.is_fitted = true;
        debug!(
            numeric = numeric_cols.len(),
            categorical = categorical_cols.len(),
            outputs = self.n_features_out(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fitted column preprocessor"
        );
        Ok(self)
    }

    /// Transform a frame holding every input column into the model matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(FraudError::ModelNotFitted);
        }
        self.check_columns(df)?;

        let n_rows = df.height();
        let mut outputs: Vec<Vec<f64>> = Vec::with_capacity(self.n_features_out());

        for name in self.columns_of(ColumnKind::Numeric) {
            let mut values = self
                .numeric
                .imputer
                .transform_numeric(&name, &numeric_values(df, &name)?)?;
            self.numeric.scaler.transform_column(&name, &mut values)?;
            outputs.push(values);
        }

        for name in self.columns_of(ColumnKind::Categorical) {
            let values = self
                .categorical
                .imputer
                .transform_text(&name, &text_values(df, &name)?)?;
            outputs.extend(self.categorical.encoder.transform_column(&name, &values)?);
        }

        Ok(Array2::from_shape_fn((n_rows, outputs.len()), |(i, j)| outputs[j][i]))
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output feature names: `num__<col>` then `cat__<col>_<category>`
    pub fn feature_names_out(&self) -> Result<Vec<String>> {
        if !self.is_fitted {
            return Err(FraudError::ModelNotFitted);
        }
        let mut names: Vec<String> = self
            .columns_of(ColumnKind::Numeric)
            .iter()
            .map(|name| format!("num__{}", name))
            .collect();
        for name in self.columns_of(ColumnKind::Categorical) {
            names.extend(
                self.categorical
                    .encoder
                    .feature_names(&name)?
                    .into_iter()
                    .map(|feature| format!("cat__{}", feature)),
            );
        }
        Ok(names)
    }

    pub fn n_features_out(&self) -> usize {
        self.columns_of(ColumnKind::Numeric).len() + self.categorical.encoder.n_outputs()
    }

    /// Project a frame onto the expected input columns, in order.
    ///
    /// Extra columns are dropped; missing ones are added as nulls (Float64
    /// for numeric columns, String for categorical ones).
    pub fn conform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.conform_rows(df, df.height())
    }

    /// Like [`conform`](Self::conform) with an explicit row count, for frames
    /// that have no columns and therefore report zero rows
    pub(crate) fn conform_rows(&self, df: &DataFrame, n_rows: usize) -> Result<DataFrame> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut missing = 0usize;
        let columns = self
            .columns
            .iter()
            .map(|(name, kind)| -> Result<Column> {
                if present.iter().any(|p| p == name) {
                    return Ok(df.column(name)?.clone());
                }
                missing += 1;
                let dtype = match kind {
                    ColumnKind::Numeric => DataType::Float64,
                    ColumnKind::Categorical => DataType::String,
                };
                Ok(Series::full_null(name.as_str().into(), n_rows, &dtype).into())
            })
            .collect::<Result<Vec<_>>>()?;

        if missing > 0 {
            debug!(missing, "Filled missing input columns with nulls");
        }
        Ok(DataFrame::new(columns)?)
    }

    fn check_columns(&self, df: &DataFrame) -> Result<()> {
        let names = df.get_column_names();
        for (column, _) in &self.columns {
            if !names.iter().any(|name| name.as_str() == column) {
                return Err(FraudError::FeatureNotFound(column.clone()));
            }
        }
        Ok(())
    }
}
