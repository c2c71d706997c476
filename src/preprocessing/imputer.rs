//! Missing value imputation strategies

use super::{numeric_values, text_values};
use crate::error::{FraudError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the median of the observed values (numeric only)
    Median,
    /// Replace with the most frequent observed value; ties go to the
    /// smallest value
    MostFrequent,
}

/// Fitted fill value for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Numeric(f64),
    Text(String),
}

/// Imputer for handling missing values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: Vec<(String, FillValue)>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Fit the imputer on the given columns.
    ///
    /// `Median` reads the columns as Float64; `MostFrequent` reads them as text.
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        self.fill_values.clear();

        for name in columns {
            let fill_value = match self.strategy {
                ImputeStrategy::Median => FillValue::Numeric(median(&numeric_values(df, name)?)),
                ImputeStrategy::MostFrequent => FillValue::Text(most_frequent(&text_values(df, name)?)),
            };
            self.fill_values.push((name.clone(), fill_value));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Fill value learned for `column`
    pub fn fill_value(&self, column: &str) -> Option<&FillValue> {
        self.fill_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Impute a numeric column
    pub fn transform_numeric(&self, column: &str, values: &[Option<f64>]) -> Result<Vec<f64>> {
        match self.lookup(column)? {
            FillValue::Numeric(fill) => Ok(values
                .iter()
                .map(|v| match v {
                    Some(x) if !x.is_nan() => *x,
                    _ => *fill,
                })
                .collect()),
            FillValue::Text(_) => Err(FraudError::PreprocessingError(format!(
                "column '{}' was fitted with a text fill value",
                column
            ))),
        }
    }

    /// Impute a text column
    pub fn transform_text(&self, column: &str, values: &[Option<String>]) -> Result<Vec<String>> {
        match self.lookup(column)? {
            FillValue::Text(fill) => Ok(values
                .iter()
                .map(|v| v.clone().unwrap_or_else(|| fill.clone()))
                .collect()),
            FillValue::Numeric(_) => Err(FraudError::PreprocessingError(format!(
                "column '{}' was fitted with a numeric fill value",
                column
            ))),
        }
    }

    fn lookup(&self, column: &str) -> Result<&FillValue> {
        if !self.is_fitted {
            return Err(FraudError::ModelNotFitted);
        }
        self.fill_value(column)
            .ok_or_else(|| FraudError::FeatureNotFound(column.to_string()))
    }
}

/// Median of the observed (non-null, non-NaN) values; 0.0 for an empty column
fn median(values: &[Option<f64>]) -> f64 {
    let mut observed: Vec<f64> = values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| !v.is_nan())
        .collect();
    if observed.is_empty() {
        return 0.0;
    }
    observed.sort_by(|a, b| a.total_cmp(b));

    let mid = observed.len() / 2;
    if observed.len() % 2 == 0 {
        (observed[mid - 1] + observed[mid]) / 2.0
    } else {
        observed[mid]
    }
}

/// Mode of the observed values; empty string for an empty column
fn most_frequent(values: &[Option<String>]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending key order, so keeping the first
    // strictly-greater count breaks ties towards the smallest value.
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }

    best.map(|(value, _)| value.to_string()).unwrap_or_default()
}
