//! Dataset path resolution and CSV loading

use crate::config::DatasetConfig;
use crate::error::{FraudError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Labeled training and test tables, as read from disk
#[derive(Debug, Clone)]
pub struct Datasets {
    pub train: DataFrame,
    pub test: DataFrame,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Return `primary` if it exists, else `fallback`, else fail naming both
pub fn resolve_dataset_path(primary: &Path, fallback: &Path) -> Result<PathBuf> {
    if primary.exists() {
        return Ok(primary.to_path_buf());
    }
    if fallback.exists() {
        warn!(
            primary = %primary.display(),
            fallback = %fallback.display(),
            "Primary dataset missing, using fallback"
        );
        return Ok(fallback.to_path_buf());
    }
    Err(FraudError::DatasetNotFound {
        primary: primary.display().to_string(),
        fallback: fallback.display().to_string(),
    })
}

/// Load a CSV file with a header row
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Resolve, read and validate both datasets
pub fn load_datasets(config: &DatasetConfig) -> Result<Datasets> {
    let train_path = resolve_dataset_path(&config.train_path, &config.train_fallback)?;
    let test_path = resolve_dataset_path(&config.test_path, &config.test_fallback)?;

    let train = load_csv(&train_path)?;
    let test = load_csv(&test_path)?;

    let has_target = |df: &DataFrame| {
        df.get_column_names()
            .iter()
            .any(|name| name.as_str() == config.target_column)
    };
    if !has_target(&train) || !has_target(&test) {
        return Err(FraudError::MissingTargetColumn(config.target_column.clone()));
    }

    info!(
        train = %train_path.display(),
        train_rows = train.height(),
        test = %test_path.display(),
        test_rows = test.height(),
        "Loaded datasets"
    );

    Ok(Datasets {
        train,
        test,
        train_path,
        test_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_resolve_prefers_primary() {
        let dir = TempDir::new().unwrap();
        let primary = write_csv(&dir, "a.csv", &["x"]);
        let fallback = write_csv(&dir, "b.csv", &["x"]);
        assert_eq!(resolve_dataset_path(&primary, &fallback).unwrap(), primary);
    }

    #[test]
    fn test_resolve_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let fallback = write_csv(&dir, "b.csv", &["x"]);
        let primary = dir.path().join("missing.csv");
        assert_eq!(resolve_dataset_path(&primary, &fallback).unwrap(), fallback);
    }

    #[test]
    fn test_resolve_neither_exists() {
        let dir = TempDir::new().unwrap();
        let err = resolve_dataset_path(&dir.path().join("a.csv"), &dir.path().join("b.csv"))
            .unwrap_err();
        assert!(matches!(err, FraudError::DatasetNotFound { .. }));
        assert!(err.to_string().contains("a.csv"));
        assert!(err.to_string().contains("b.csv"));
    }

    #[test]
    fn test_load_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "t.csv", &["a,b,c", "1,x,TRUE", "2,y,FALSE"]);
        let df = load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_load_datasets_requires_target() {
        let dir = TempDir::new().unwrap();
        let train = write_csv(&dir, "train.csv", &["a,Is_Fraudulent", "1,TRUE"]);
        let test = write_csv(&dir, "test.csv", &["a", "1"]);
        let config = DatasetConfig::new().with_train_path(&train).with_test_path(&test);

        let err = load_datasets(&config).unwrap_err();
        assert!(matches!(err, FraudError::MissingTargetColumn(_)));
    }

    #[test]
    fn test_load_datasets_ok() {
        let dir = TempDir::new().unwrap();
        let train = write_csv(&dir, "train.csv", &["a,Is_Fraudulent", "1,TRUE", "2,FALSE"]);
        let test = write_csv(&dir, "test.csv", &["a,Is_Fraudulent", "3,TRUE"]);
        let config = DatasetConfig::new().with_train_path(&train).with_test_path(&test);

        let datasets = load_datasets(&config).unwrap();
        assert_eq!(datasets.train.height(), 2);
        assert_eq!(datasets.test.height(), 1);
        assert_eq!(datasets.train_path, train);
    }
}
