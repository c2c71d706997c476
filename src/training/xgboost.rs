//! XGBoost-style gradient boosting with second-order approximation
//!
//! Key differences from standard gradient boosting:
//! - Uses both gradient (first derivative) and hessian (second derivative) of loss
//! - Regularized leaf weights: w* = -G / (H + lambda)
//! - Gain-based split scoring: Gain = 0.5 * [GL²/(HL+λ) + GR²/(HR+λ) - (GL+GR)²/(HL+HR+λ)] - γ
//! - Minimum child weight constraint

use super::decision_tree::{traverse, Node};
use crate::config::BoostingParams;
use crate::error::{FraudError, Result};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// XGBoost configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XGBoostConfig {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_child_weight: f64,
    /// L2 regularization on leaf weights
    pub reg_lambda: f64,
    /// Minimum loss reduction to make a split (gamma)
    pub gamma: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub random_state: u64,
}

impl Default for XGBoostConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            min_child_weight: 1.0,
            reg_lambda: 1.0,
            gamma: 0.0,
            subsample: 1.0,
            colsample_bytree: 1.0,
            random_state: 42,
        }
    }
}

impl XGBoostConfig {
    /// Configuration from the pipeline's boosting parameters
    pub fn from_params(params: &BoostingParams, random_state: u64) -> Self {
        Self {
            n_estimators: params.n_estimators,
            learning_rate: params.learning_rate,
            max_depth: params.max_depth,
            subsample: params.subsample,
            colsample_bytree: params.colsample_bytree,
            random_state,
            ..Default::default()
        }
    }
}

/// One boosted tree as a flat arena; leaf values are raw weights
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoostedTree {
    nodes: Vec<Node>,
}

/// Exact greedy tree growth over the sampled rows and columns
struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    grad: &'a Array1<f64>,
    hess: &'a Array1<f64>,
    features: &'a [usize],
    config: &'a XGBoostConfig,
}

impl TreeBuilder<'_> {
    fn build(&self, rows: Vec<usize>) -> BoostedTree {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack: Vec<(usize, Vec<usize>, usize)> = vec![(0, rows, 0)];

        while let Some((slot, node_rows, depth)) = stack.pop() {
            let g_sum: f64 = node_rows.iter().map(|&i| self.grad[i]).sum();
            let h_sum: f64 = node_rows.iter().map(|&i| self.hess[i]).sum();
            let weight = -g_sum / (h_sum + self.config.reg_lambda);

            // Stopping conditions
            let split = if depth >= self.config.max_depth
                || node_rows.len() < 2
                || h_sum < self.config.min_child_weight
            {
                None
            } else {
                self.best_split(&node_rows, g_sum, h_sum)
            };

            let Some((feature, threshold)) = split else {
                nodes[slot] = Node::Leaf { value: weight };
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = node_rows
                .iter()
                .partition(|&&i| self.x[[i, feature]] <= threshold);

            if left_rows.is_empty() || right_rows.is_empty() {
                nodes[slot] = Node::Leaf { value: weight };
                continue;
            }

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[slot] = Node::Split { feature, threshold, left, right };

            stack.push((right, right_rows, depth + 1));
            stack.push((left, left_rows, depth + 1));
        }

        BoostedTree { nodes }
    }

    /// Best (feature, threshold) across the sampled features, if its gain
    /// beats gamma. Ties keep the earliest feature.
    fn best_split(&self, rows: &[usize], g_total: f64, h_total: f64) -> Option<(usize, f64)> {
        let candidates: Vec<Option<(usize, f64, f64)>> = self
            .features
            .par_iter()
            .map(|&f| self.best_split_for_feature(rows, f, g_total, h_total))
            .collect();

        let best = candidates.into_iter().flatten().fold(None, |best: Option<(usize, f64, f64)>, c| {
            match best {
                Some(b) if b.2 >= c.2 => Some(b),
                _ => Some(c),
            }
        })?;

        if best.2 > self.config.gamma {
            Some((best.0, best.1))
        } else {
            None
        }
    }

    fn best_split_for_feature(
        &self,
        rows: &[usize],
        feature: usize,
        g_total: f64,
        h_total: f64,
    ) -> Option<(usize, f64, f64)> {
        let x = self.x;
        let mut sorted: Vec<usize> = rows.to_vec();
        sorted.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

        let lambda = self.config.reg_lambda;
        let parent_score = g_total * g_total / (h_total + lambda);

        let mut g_left = 0.0;
        let mut h_left = 0.0;
        let mut best: Option<(usize, f64, f64)> = None;

        for pos in 0..sorted.len().saturating_sub(1) {
            let idx = sorted[pos];
            g_left += self.grad[idx];
            h_left += self.hess[idx];

            let (value, next) = (x[[idx, feature]], x[[sorted[pos + 1], feature]]);
            // no threshold separates equal values
            if value == next {
                continue;
            }

            let g_right = g_total - g_left;
            let h_right = h_total - h_left;
            if h_left < self.config.min_child_weight || h_right < self.config.min_child_weight {
                continue;
            }

            let gain = 0.5
                * (g_left * g_left / (h_left + lambda) + g_right * g_right / (h_right + lambda)
                    - parent_score);

            if best.map_or(true, |b| gain > b.2) {
                best = Some((feature, (value + next) / 2.0, gain));
            }
        }

        best
    }
}

/// XGBoost Classifier (logistic loss with second-order approximation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XGBoostClassifier {
    config: XGBoostConfig,
    trees: Vec<BoostedTree>,
    base_score: f64,
    n_features: usize,
}

impl XGBoostClassifier {
    pub fn new(config: XGBoostConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            base_score: 0.0,
            n_features: 0,
        }
    }

    pub fn config(&self) -> &XGBoostConfig {
        &self.config
    }

    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(FraudError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(FraudError::TrainingError("Cannot boost on zero samples".to_string()));
        }
        self.n_features = n_features;

        // Base score in log-odds space
        let p = y.mean().unwrap_or(0.5).clamp(1e-7, 1.0 - 1e-7);
        self.base_score = (p / (1.0 - p)).ln();
        let mut raw_preds = Array1::from_elem(n_samples, self.base_score);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);
        self.trees.clear();

        for _ in 0..self.config.n_estimators {
            // Logistic loss: grad = p - y, hess = p * (1 - p)
            let probs: Array1<f64> = raw_preds.mapv(Self::sigmoid);
            let grad: Array1<f64> = &probs - y;
            let hess: Array1<f64> = probs.mapv(|p| (p * (1.0 - p)).max(1e-7));

            let row_indices = subsample(&mut rng, n_samples, self.config.subsample);
            let col_indices = subsample(&mut rng, n_features, self.config.colsample_bytree);

            let builder = TreeBuilder {
                x,
                grad: &grad,
                hess: &hess,
                features: &col_indices,
                config: &self.config,
            };
            let tree = builder.build(row_indices);

            // every row moves, sampled or not
            let lr = self.config.learning_rate;
            for (i, row) in x.rows().into_iter().enumerate() {
                raw_preds[i] += lr * traverse(&tree.nodes, row);
            }

            self.trees.push(tree);
        }

        debug!(
            trees = self.trees.len(),
            base_score = self.base_score,
            "Fitted boosted trees"
        );
        Ok(self)
    }

    /// Raw log-odds margin per row
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() && self.n_features == 0 {
            return Err(FraudError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(FraudError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let lr = self.config.learning_rate;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                self.base_score
                    + self.trees.iter().map(|tree| lr * traverse(&tree.nodes, row)).sum::<f64>()
            })
            .collect())
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(Self::sigmoid))
    }

    /// Split counts per feature across all trees, normalized to sum to one
    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        if self.n_features == 0 {
            return None;
        }
        let mut counts = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            for node in &tree.nodes {
                if let Node::Split { feature, .. } = node {
                    counts[*feature] += 1.0;
                }
            }
        }
        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for c in counts.iter_mut() {
                *c /= total;
            }
        }
        Some(Array1::from_vec(counts))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn subsample(rng: &mut Xoshiro256PlusPlus, n: usize, ratio: f64) -> Vec<usize> {
    if ratio >= 1.0 {
        return (0..n).collect();
    }
    let k = (((n as f64) * ratio).ceil() as usize).clamp(1, n.max(1));
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(k);
    indices.sort_unstable();
    indices
}
