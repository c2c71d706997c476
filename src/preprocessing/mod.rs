//! Feature preprocessing
//!
//! Provides:
//! - Train/test feature alignment
//! - Missing value imputation (median, most frequent)
//! - Standard scaling
//! - One-hot encoding with unknown categories ignored
//! - A column-wise preprocessor bundling all of the above

pub mod align;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use align::{align_features, prepare_features, PreparedData};
pub use encoder::OneHotEncoder;
pub use imputer::{FillValue, ImputeStrategy, Imputer};
pub use pipeline::ColumnPreprocessor;
pub use scaler::{ScalerParams, StandardScaler};

use crate::data::is_numeric_dtype;
use crate::error::{FraudError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How a feature column is treated by the preprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Numeric dtypes are scaled, everything else is one-hot encoded
    pub fn from_dtype(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

fn series_of<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|column| column.as_materialized_series())
        .map_err(|_| FraudError::FeatureNotFound(name.to_string()))
}

/// Read a column as optional floats. Values that fail to parse become nulls.
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = series_of(df, name)?;
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

/// Read a column as optional strings.
///
/// Integral floats render without a fractional part, so a flag normalized to
/// 1.0 in a record matches the "1" category seen in training text.
pub(crate) fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = series_of(df, name)?;
    if matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
        let casted = series.cast(&DataType::Float64)?;
        return Ok(casted
            .f64()?
            .into_iter()
            .map(|value| {
                value.map(|v| {
                    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                        format!("{}", v as i64)
                    } else {
                        v.to_string()
                    }
                })
            })
            .collect());
    }
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}
