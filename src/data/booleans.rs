//! Boolean-like value normalization
//!
//! Claim exports encode flags inconsistently ("Y", "yes", "TRUE", "1", ...).
//! Non-numeric columns whose values are all flag tokens become Float64 0/1
//! columns; columns mixing flag tokens with other text keep their string
//! storage with the tokens rewritten to "1"/"0".

use super::is_numeric_dtype;
use crate::error::Result;
use ndarray::Array1;
use polars::prelude::*;
use serde_json::{Map, Value};

const TRUE_TOKENS: [&str; 5] = ["TRUE", "T", "YES", "Y", "1"];
const FALSE_TOKENS: [&str; 5] = ["FALSE", "F", "NO", "N", "0"];

/// Map a flag token to 1/0; `None` for any other text
pub fn normalize_boolean_like(value: &str) -> Option<u8> {
    let normalized = value.trim().to_uppercase();
    if TRUE_TOKENS.contains(&normalized.as_str()) {
        Some(1)
    } else if FALSE_TOKENS.contains(&normalized.as_str()) {
        Some(0)
    } else {
        None
    }
}

/// Normalize one column. Numeric columns are returned untouched (`None`).
fn normalize_column(series: &Series) -> Result<Option<Series>> {
    if is_numeric_dtype(series.dtype()) {
        return Ok(None);
    }

    let text = series.cast(&DataType::String)?;
    let values = text.str()?;

    let mut flags: Vec<Option<f64>> = Vec::with_capacity(values.len());
    let mut all_flags = true;
    let mut non_null = 0usize;

    for value in values.into_iter() {
        match value {
            None => flags.push(None),
            Some(raw) => {
                non_null += 1;
                match normalize_boolean_like(raw) {
                    Some(flag) => flags.push(Some(flag as f64)),
                    None => {
                        all_flags = false;
                        break;
                    }
                }
            }
        }
    }

    if all_flags && non_null > 0 {
        return Ok(Some(Series::new(series.name().clone(), flags)));
    }

    let rewritten: Vec<Option<String>> = values
        .into_iter()
        .map(|value| {
            value.map(|raw| match normalize_boolean_like(raw) {
                Some(flag) => flag.to_string(),
                None => raw.to_string(),
            })
        })
        .collect();

    Ok(Some(Series::new(series.name().clone(), rewritten)))
}

/// Normalize boolean-like values in every non-numeric column
pub fn coerce_booleans(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();

    for column in df.get_columns() {
        if let Some(normalized) = normalize_column(column.as_materialized_series())? {
            result.with_column(normalized)?;
        }
    }

    Ok(result)
}

/// Convert a label column to 0/1.
///
/// Flag tokens map directly, a numeric value equal to 1 maps to 1, and
/// everything else (including nulls) maps to 0.
pub fn normalize_labels(series: &Series) -> Result<Array1<f64>> {
    let text = series.cast(&DataType::String)?;
    let labels = text
        .str()?
        .into_iter()
        .map(|value| match value {
            None => 0.0,
            Some(raw) => match normalize_boolean_like(raw) {
                Some(flag) => flag as f64,
                None => match raw.trim().parse::<f64>() {
                    Ok(v) if v == 1.0 => 1.0,
                    _ => 0.0,
                },
            },
        })
        .collect();
    Ok(labels)
}

/// Build a one-row frame from a JSON record.
///
/// Numbers become Float64, strings String, booleans Boolean, nulls a null
/// string cell, and nested values their JSON text.
pub fn record_to_frame(record: &Map<String, Value>) -> Result<DataFrame> {
    let columns: Vec<Column> = record
        .iter()
        .map(|(name, value)| {
            let name = PlSmallStr::from(name.as_str());
            let series = match value {
                Value::Null => Series::new(name, vec![None::<String>]),
                Value::Bool(flag) => Series::new(name, vec![*flag]),
                Value::Number(number) => Series::new(name, vec![number.as_f64()]),
                Value::String(text) => Series::new(name, vec![text.clone()]),
                nested => Series::new(name, vec![nested.to_string()]),
            };
            series.into()
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}
