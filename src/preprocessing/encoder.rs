//! One-hot categorical encoding

use crate::error::{FraudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder over the sorted categories seen during fit.
///
/// Categories not seen during fit encode as all zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // column name -> sorted categories
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit on already-imputed columns, given as (name, values) pairs
    pub fn fit<'a, I>(&mut self, columns: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        self.categories.clear();
        for (name, values) in columns {
            let unique: BTreeSet<&str> = values.iter().map(|v| v.as_str()).collect();
            self.categories.push((
                name.to_string(),
                unique.into_iter().map(str::to_string).collect(),
            ));
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Categories learned for `column`, in output order
    pub fn categories(&self, column: &str) -> Result<&[String]> {
        if !self.is_fitted {
            return Err(FraudError::ModelNotFitted);
        }
        self.categories
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cats)| cats.as_slice())
            .ok_or_else(|| FraudError::FeatureNotFound(column.to_string()))
    }

    /// Encode one column into one indicator vector per category
    pub fn transform_column(&self, column: &str, values: &[String]) -> Result<Vec<Vec<f64>>> {
        let categories = self.categories(column)?;
        let mut indicators = vec![vec![0.0; values.len()]; categories.len()];

        for (row, value) in values.iter().enumerate() {
            if let Ok(pos) = categories.binary_search_by(|c| c.as_str().cmp(value.as_str())) {
                indicators[pos][row] = 1.0;
            }
        }

        Ok(indicators)
    }

    /// Output feature names, `<column>_<category>`
    pub fn feature_names(&self, column: &str) -> Result<Vec<String>> {
        Ok(self
            .categories(column)?
            .iter()
            .map(|category| format!("{}_{}", column, category))
            .collect())
    }

    /// Total number of indicator columns
    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(|(_, cats)| cats.len()).sum()
    }
}
