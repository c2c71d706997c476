//! Fraud classifier CLI module
//!
//! `train` runs the full training workflow and prints a report; `predict`
//! scores one JSON record read from stdin.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{PipelineConfig, DEFAULT_MODEL_PATH};
use crate::data::load_datasets;
use crate::evaluation::{importance_measure, ModelEvaluation};
use crate::inference::Predictor;
use crate::workflow::{train_on_datasets, TrainingOutcome};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn fmt_auc(auc: Option<f64>) -> String {
    auc.map_or_else(|| "undefined".to_string(), |v| format!("{:.4}", v))
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fraud-claims")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve an insurance-claim fraud classifier")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the candidate models, select the best and save it
    Train(TrainArgs),

    /// Score one `{"instance": {...}}` JSON document read from stdin
    Predict {
        /// Trained model file
        #[arg(short, long, env = "FRAUD_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },
}

/// Overrides for the default training configuration
#[derive(Args, Debug, Clone, Default)]
pub struct TrainArgs {
    /// Primary training CSV (falls back to training_data.csv)
    #[arg(long)]
    pub train: Option<PathBuf>,

    /// Primary test CSV (falls back to testting_data.csv)
    #[arg(long)]
    pub test: Option<PathBuf>,

    /// Label column name
    #[arg(long)]
    pub target: Option<String>,

    /// Output model file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Random seed shared by all models
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of features in the importance report
    #[arg(long)]
    pub top_features: Option<usize>,
}

impl TrainArgs {
    /// Apply the given flags on top of the defaults
    pub fn to_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(path) = &self.train {
            config.datasets.train_path = path.clone();
        }
        if let Some(path) = &self.test {
            config.datasets.test_path = path.clone();
        }
        if let Some(target) = &self.target {
            config.datasets.target_column = target.clone();
        }
        if let Some(output) = &self.output {
            config.model_path = output.clone();
        }
        if let Some(seed) = self.seed {
            config.training.random_state = seed;
        }
        if let Some(n) = self.top_features {
            config.top_features = n;
        }
        config
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: &PipelineConfig) -> anyhow::Result<TrainingOutcome> {
    section("Train");

    let start = Instant::now();
    let datasets = load_datasets(&config.datasets)?;
    step_ok(&format!(
        "Loaded {} ({} rows) and {} ({} rows)",
        datasets.train_path.display(),
        datasets.train.height(),
        datasets.test_path.display(),
        datasets.test.height()
    ));

    let outcome = train_on_datasets(config, datasets, |kind| {
        step_run(&format!("Training {}", kind.to_string().cyan()))
    })?;

    section("Evaluation");
    for evaluation in &outcome.evaluations {
        print_evaluation(evaluation);
    }

    print_selection(&outcome);
    print_importances(&outcome, config.top_features);

    section("Saved");
    step_ok(&format!("Saved model to: {}", outcome.model_path.display()));
    println!();
    println!(
        "  {} {}",
        muted("Training complete. Best model:"),
        outcome.best_kind().to_string().white().bold()
    );
    println!("  {} {}", muted("Model artifact:"), outcome.model_path.display());
    println!("  {}", dim(&format!("{:.2?} total", start.elapsed())));
    println!();

    Ok(outcome)
}

fn print_evaluation(evaluation: &ModelEvaluation) {
    let m = &evaluation.metrics;
    let [[tn, fp], [fn_, tp]] = m.confusion_matrix.as_array();

    println!();
    println!("  {}", format!("=== {} ===", evaluation.kind).white().bold());
    println!("  {:<16} {:.4}", muted("Accuracy:"), m.accuracy);
    println!("  {:<16} {:.4}", muted("Precision:"), m.precision);
    println!("  {:<16} {:.4}", muted("Recall:"), m.recall);
    println!("  {:<16} {:.4}", muted("F1 Score:"), m.f1);
    println!("  {:<16} {}", muted("ROC-AUC:"), fmt_auc(m.roc_auc));
    println!("  {}", muted("Confusion Matrix:"));
    println!("  [[{:>6} {:>6}]", tn, fp);
    println!("   [{:>6} {:>6}]]", fn_, tp);
}

fn print_selection(outcome: &TrainingOutcome) {
    let Some(best) = outcome.best_evaluation() else {
        return;
    };

    println!();
    line_box_top();
    line_box(&kv("Best model selected:", &outcome.best_kind().to_string()));
    line_box(&format!(
        "{} F1: {:.4}, ROC-AUC: {}",
        muted("Selection basis ->"),
        best.metrics.f1,
        fmt_auc(best.metrics.roc_auc)
    ));
    line_box_bottom();
}

fn print_importances(outcome: &TrainingOutcome, top_n: usize) {
    section(&format!(
        "Top {} important features ({})",
        top_n,
        importance_measure(outcome.best_kind())
    ));
    for (rank, feature) in outcome.top_features.iter().enumerate() {
        println!(
            "  {} {} {} {:.6}",
            dim(&format!("{:02}.", rank + 1)),
            feature.feature,
            muted("->"),
            feature.importance
        );
    }
}

/// Score one payload and return the JSON line to print on stdout
pub fn cmd_predict(model_path: &Path, input: &str) -> anyhow::Result<String> {
    let predictor = Predictor::from_path(model_path)?;
    let prediction = predictor.predict_payload(input)?;
    Ok(serde_json::to_string(&prediction)?)
}
