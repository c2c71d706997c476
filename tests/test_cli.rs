//! Integration tests for the `fraud-claims predict` command at the process boundary

use fraud_claims::config::TrainingConfig;
use fraud_claims::export::save_model;
use fraud_claims::preprocessing::prepare_features;
use fraud_claims::training::{FraudPipeline, ModelKind};
use polars::prelude::*;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::{tempdir, TempDir};

fn trained_model() -> (TempDir, PathBuf) {
    let n = 40;
    let amount: Vec<f64> = (0..n)
        .map(|i| if i % 4 == 0 { 8000.0 + i as f64 } else { 300.0 + i as f64 })
        .collect();
    let suspicious: Vec<&str> = (0..n).map(|i| if i % 4 == 0 { "Y" } else { "N" }).collect();
    let label: Vec<&str> = (0..n).map(|i| if i % 4 == 0 { "TRUE" } else { "FALSE" }).collect();
    let train = df!(
        "Claim_Amount" => &amount,
        "Is_Suspicious" => &suspicious,
        "Is_Fraudulent" => &label
    )
    .unwrap();

    let data = prepare_features(&train, &train, "Is_Fraudulent").unwrap();
    let pipeline = FraudPipeline::fit(
        ModelKind::LogisticRegression,
        &data.preprocessor,
        &data.x_train,
        &data.y_train,
        &TrainingConfig::new(),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("fraud_model.json");
    save_model(&pipeline, &path).unwrap();
    (dir, path)
}

fn run_predict(model: &Path, input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fraud-claims"))
        .args(["predict", "--model"])
        .arg(model)
        .env_remove("FRAUD_MODEL_PATH")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_predict_valid_instance() {
    let (_dir, model) = trained_model();
    let output = run_predict(&model, r#"{"instance": {"Claim_Amount": 5000, "Is_Suspicious": "Y"}}"#);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let response: Value = serde_json::from_str(stdout.trim()).unwrap();
    let prediction = response["prediction"].as_str().unwrap();
    let probability = response["probability"].as_f64().unwrap();

    assert!(prediction == "TRUE" || prediction == "FALSE");
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(prediction == "TRUE", probability >= 0.5);
}

#[test]
fn test_predict_rejects_bad_payloads() {
    let (_dir, model) = trained_model();

    for input in ["{}", "", "{oops", r#"{"instance": 3}"#] {
        let output = run_predict(&model, input);

        assert_eq!(output.status.code(), Some(1), "input {:?}", input);
        assert!(output.stdout.is_empty(), "input {:?}", input);
        assert!(!output.stderr.is_empty(), "input {:?}", input);
    }
}

#[test]
fn test_predict_missing_instance_message() {
    let (_dir, model) = trained_model();
    let output = run_predict(&model, "{}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Payload must include 'instance' object"), "stderr: {}", stderr);
}

#[test]
fn test_predict_missing_model() {
    let dir = tempdir().unwrap();
    let output = run_predict(&dir.path().join("absent.json"), r#"{"instance": {}}"#);

    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}
