//! Train/test feature alignment

use super::ColumnPreprocessor;
use crate::data::{coerce_booleans, normalize_labels};
use crate::error::{FraudError, Result};
use ndarray::Array1;
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Features and labels ready for model fitting
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub x_train: DataFrame,
    pub y_train: Array1<f64>,
    pub x_test: DataFrame,
    pub y_test: Array1<f64>,
    /// Unfitted preprocessor over the aligned training schema
    pub preprocessor: ColumnPreprocessor,
}

/// Outer-join the two tables on column names.
///
/// Both outputs share the same columns in ascending name order. A column
/// missing from one table is added to it as nulls, typed like the column in
/// the other table.
pub fn align_features(train: &DataFrame, test: &DataFrame) -> Result<(DataFrame, DataFrame)> {
    let names: BTreeSet<String> = train
        .get_column_names()
        .into_iter()
        .chain(test.get_column_names())
        .map(|name| name.to_string())
        .collect();

    let pick = |own: &DataFrame, other: &DataFrame, name: &str| -> Result<Column> {
        match own.column(name) {
            Ok(column) => Ok(column.clone()),
            Err(_) => {
                let dtype = other.column(name)?.dtype().clone();
                debug!(column = name, ?dtype, "Padding absent column with nulls");
                Ok(Series::full_null(name.into(), own.height(), &dtype).into())
            }
        }
    };

    let mut train_columns = Vec::with_capacity(names.len());
    let mut test_columns = Vec::with_capacity(names.len());
    for name in &names {
        train_columns.push(pick(train, test, name)?);
        test_columns.push(pick(test, train, name)?);
    }

    Ok((DataFrame::new(train_columns)?, DataFrame::new(test_columns)?))
}

fn split_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Array1<f64>)> {
    let column = df
        .column(target)
        .map_err(|_| FraudError::MissingTargetColumn(target.to_string()))?;
    let labels = normalize_labels(column.as_materialized_series())?;
    Ok((df.drop(target)?, labels))
}

/// Normalize booleans, split off labels, align features and build the
/// preprocessor schema from the aligned training table
pub fn prepare_features(train: &DataFrame, test: &DataFrame, target: &str) -> Result<PreparedData> {
    let train = coerce_booleans(train)?;
    let test = coerce_booleans(test)?;

    let (train_features, y_train) = split_target(&train, target)?;
    let (test_features, y_test) = split_target(&test, target)?;

    let (x_train, x_test) = align_features(&train_features, &test_features)?;
    let preprocessor = ColumnPreprocessor::from_schema(&x_train);

    debug!(
        features = x_train.width(),
        train_positives = y_train.sum(),
        test_positives = y_test.sum(),
        "Prepared features"
    );

    Ok(PreparedData {
        x_train,
        y_train,
        x_test,
        y_test,
        preprocessor,
    })
}
