//! Integration tests for data processing: loading, flag normalization, alignment

use fraud_claims::config::DatasetConfig;
use fraud_claims::data::{coerce_booleans, load_datasets, normalize_boolean_like, resolve_dataset_path};
use fraud_claims::error::FraudError;
use fraud_claims::preprocessing::{align_features, prepare_features};
use polars::prelude::*;
use std::fs;
use tempfile::tempdir;

const TRAIN_CSV: &str = "\
Claim_Amount,Is_Suspicious,Region,Is_Fraudulent
1200,Y,north,TRUE
300,N,south,FALSE
450,no,south,FALSE
9800,yes,north,TRUE
";

const TEST_CSV: &str = "\
Claim_Amount,Policy_Type,Is_Fraudulent
800,gold,FALSE
7000,silver,TRUE
";

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_primary_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("train_claims.csv"), TRAIN_CSV).unwrap();
    fs::write(dir.path().join("test_claims.csv"), TEST_CSV).unwrap();

    let config = DatasetConfig::new()
        .with_train_path(dir.path().join("train_claims.csv"))
        .with_test_path(dir.path().join("test_claims.csv"));
    let datasets = load_datasets(&config).unwrap();

    assert_eq!(datasets.train.height(), 4);
    assert_eq!(datasets.test.height(), 2);
    assert_eq!(datasets.train_path, dir.path().join("train_claims.csv"));
}

#[test]
fn test_fallback_path_used_when_primary_missing() {
    let dir = tempdir().unwrap();
    let fallback = dir.path().join("training_data.csv");
    fs::write(&fallback, TRAIN_CSV).unwrap();

    let resolved = resolve_dataset_path(&dir.path().join("train_claims.csv"), &fallback).unwrap();
    assert_eq!(resolved, fallback);
}

#[test]
fn test_missing_both_paths_names_them() {
    let dir = tempdir().unwrap();
    let err = resolve_dataset_path(&dir.path().join("a.csv"), &dir.path().join("b.csv")).unwrap_err();

    match &err {
        FraudError::DatasetNotFound { primary, fallback } => {
            assert!(primary.ends_with("a.csv"));
            assert!(fallback.ends_with("b.csv"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("a.csv"));
}

#[test]
fn test_missing_target_column() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("train.csv"), TRAIN_CSV).unwrap();
    fs::write(dir.path().join("test.csv"), "Claim_Amount\n5\n").unwrap();

    let config = DatasetConfig::new()
        .with_train_path(dir.path().join("train.csv"))
        .with_test_path(dir.path().join("test.csv"));
    let err = load_datasets(&config).unwrap_err();

    assert!(matches!(err, FraudError::MissingTargetColumn(ref t) if t == "Is_Fraudulent"));
}

// ============================================================================
// Flag normalization
// ============================================================================

#[test]
fn test_flag_tokens() {
    for token in ["TRUE", "t", " yes ", "Y", "1"] {
        assert_eq!(normalize_boolean_like(token), Some(1), "{token}");
    }
    for token in ["false", "F", "No", "n", "0"] {
        assert_eq!(normalize_boolean_like(token), Some(0), "{token}");
    }
    assert_eq!(normalize_boolean_like("maybe"), None);
    assert_eq!(normalize_boolean_like(""), None);
}

#[test]
fn test_coerce_booleans_mixed_column_keeps_text() {
    let df = df!(
        "flag" => &["Y", "N", "yes"],
        "mixed" => &["Y", "unknown", "N"],
        "amount" => &[1.0, 2.0, 3.0]
    )
    .unwrap();

    let out = coerce_booleans(&df).unwrap();

    let flag: Vec<Option<f64>> = out.column("flag").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(flag, vec![Some(1.0), Some(0.0), Some(1.0)]);

    let mixed: Vec<Option<&str>> = out.column("mixed").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(mixed, vec![Some("1"), Some("unknown"), Some("0")]);

    assert_eq!(out.column("amount").unwrap().dtype(), &DataType::Float64);
}

// ============================================================================
// Alignment
// ============================================================================

#[test]
fn test_alignment_unions_columns() {
    let train = df!("a" => &[1.0, 2.0], "b" => &["x", "y"]).unwrap();
    let test = df!("a" => &[3.0], "c" => &[5.0]).unwrap();

    let (train_aligned, test_aligned) = align_features(&train, &test).unwrap();

    let names: Vec<&str> = train_aligned.get_column_names().iter().map(|n| n.as_str()).collect();
    let test_names: Vec<&str> = test_aligned.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, test_names);
    assert_eq!(names.len(), 3);
    assert_eq!(train_aligned.column("c").unwrap().null_count(), 2);
    assert_eq!(test_aligned.column("b").unwrap().null_count(), 1);
}

#[test]
fn test_prepare_features_labels_and_shapes() {
    let train = df!(
        "Claim_Amount" => &[1200.0, 300.0, 450.0, 9800.0],
        "Region" => &["north", "south", "south", "north"],
        "Is_Fraudulent" => &["TRUE", "FALSE", "N", "Y"]
    )
    .unwrap();
    let test = df!(
        "Claim_Amount" => &[800.0, 7000.0],
        "Policy_Type" => &["gold", "silver"],
        "Is_Fraudulent" => &[0i64, 1]
    )
    .unwrap();

    let data = prepare_features(&train, &test, "Is_Fraudulent").unwrap();

    assert_eq!(data.y_train.to_vec(), vec![1.0, 0.0, 0.0, 1.0]);
    assert_eq!(data.y_test.to_vec(), vec![0.0, 1.0]);
    assert_eq!(data.x_train.width(), 3);
    assert_eq!(data.x_test.width(), 3);
    assert!(data.x_train.column("Is_Fraudulent").is_err());
}
