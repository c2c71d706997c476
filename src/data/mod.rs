//! Dataset loading and value normalization
//!
//! - [`loader`] resolves dataset paths (with fallback names) and reads CSVs
//! - [`booleans`] maps truthy/falsy tokens to 0/1 and builds record frames

pub mod booleans;
pub mod loader;

pub use booleans::{coerce_booleans, normalize_boolean_like, normalize_labels, record_to_frame};
pub use loader::{load_csv, load_datasets, resolve_dataset_path, Datasets};

use polars::prelude::DataType;

/// Whether a polars dtype stores numbers (booleans and strings do not)
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}
