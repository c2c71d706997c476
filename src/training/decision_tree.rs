//! CART classification tree for binary labels
//!
//! Trees are stored as a flat arena of nodes addressed by index, which keeps
//! prediction and (de)serialization iterative regardless of tree depth.

use crate::error::{FraudError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Arena node. Children are indices into the owning tree's node vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Walk an arena from the root for one sample
pub(crate) fn traverse(nodes: &[Node], sample: ArrayView1<f64>) -> f64 {
    let mut idx = 0;
    loop {
        match &nodes[idx] {
            Node::Leaf { value } => return *value,
            Node::Split { feature, threshold, left, right } => {
                idx = if sample[*feature] <= *threshold { *left } else { *right };
            }
        }
    }
}

/// Best split found for a node: (feature, threshold, impurity decrease)
type SplitCandidate = (usize, f64, f64);

/// Gini impurity of a binary node with `pos` positives out of `n`
fn gini(pos: f64, n: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    let p = pos / n;
    2.0 * p * (1.0 - p)
}

/// Midpoint between two adjacent sorted values. When the midpoint rounds up
/// to `next` (adjacent floats) the lower value is used so `<=` still
/// separates them.
fn split_threshold(value: f64, next: f64) -> f64 {
    let mid = value / 2.0 + next / 2.0;
    if mid >= next || !mid.is_finite() {
        value
    } else {
        mid
    }
}

/// Decision tree classifier (Gini impurity, positive-fraction leaves)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    /// Maximum depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` considers all of them
    pub max_features: Option<usize>,
    seed: u64,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 0,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set number of features sampled per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    /// Set the seed driving per-split feature sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit the tree to all rows of the training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_rows(x, y, &indices)
    }

    /// Fit the tree on a row sample (with repeats, for bootstrapping)
    pub fn fit_rows(&mut self, x: &Array2<f64>, y: &Array1<f64>, rows: &[usize]) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(FraudError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if rows.is_empty() {
            return Err(FraudError::TrainingError("Cannot fit a tree on zero samples".to_string()));
        }

        self.n_features = n_features;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut importances = vec![0.0; n_features];

        // Work stack of (node slot, rows reaching it, depth)
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack: Vec<(usize, Vec<usize>, usize)> = vec![(0, rows.to_vec(), 0)];

        while let Some((slot, node_rows, depth)) = stack.pop() {
            let n = node_rows.len() as f64;
            let pos: f64 = node_rows.iter().map(|&i| y[i]).sum();
            let value = if n > 0.0 { pos / n } else { 0.0 };

            let should_stop = node_rows.len() < self.min_samples_split
                || self.max_depth.map_or(false, |d| depth >= d)
                || pos == 0.0
                || pos == n;

            let split = if should_stop {
                None
            } else {
                self.find_best_split(x, y, &node_rows, &mut rng)
            };

            let Some((feature, threshold, decrease)) = split else {
                nodes[slot] = Node::Leaf { value };
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = node_rows
                .iter()
                .partition(|&&i| x[[i, feature]] <= threshold);

            if left_rows.is_empty() || right_rows.is_empty() {
                nodes[slot] = Node::Leaf { value };
                continue;
            }

            importances[feature] += n * decrease;

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[slot] = Node::Split { feature, threshold, left, right };

            stack.push((right, right_rows, depth + 1));
            stack.push((left, left_rows, depth + 1));
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        self.nodes = nodes;
        self.feature_importances = Some(Array1::from_vec(importances));
        Ok(self)
    }

    /// Search a random feature subset for the best split.
    ///
    /// Features are visited in shuffled order, `max_features` at a time; if a
    /// batch yields no valid split the next batch is searched.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = x.ncols();
        let batch = self.max_features.unwrap_or(n_features).clamp(1, n_features.max(1));

        let mut features: Vec<usize> = (0..n_features).collect();
        if batch < n_features {
            features.shuffle(rng);
        }

        for chunk in features.chunks(batch) {
            let candidates: Vec<Option<SplitCandidate>> = chunk
                .par_iter()
                .map(|&feature| self.best_split_for_feature(x, y, rows, feature))
                .collect();

            // first best in visiting order wins ties
            let best = candidates.into_iter().flatten().fold(None, |best: Option<SplitCandidate>, c| {
                match best {
                    Some(b) if b.2 >= c.2 => Some(b),
                    _ => Some(c),
                }
            });
            if best.is_some() {
                return best;
            }
        }
        None
    }

    /// Sorted incremental scan over one feature
    fn best_split_for_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
        feature: usize,
    ) -> Option<SplitCandidate> {
        let mut pairs: Vec<(f64, f64)> = rows.iter().map(|&i| (x[[i, feature]], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        let n_f = n as f64;
        let total_pos: f64 = pairs.iter().map(|p| p.1).sum();
        let parent = gini(total_pos, n_f);

        let mut left_pos = 0.0;
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..n.saturating_sub(1) {
            left_pos += pairs[pos].1;
            let (value, next) = (pairs[pos].0, pairs[pos + 1].0);
            if value == next {
                continue;
            }

            let left_n = pos + 1;
            let right_n = n - left_n;
            if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                continue;
            }

            let weighted = (left_n as f64 * gini(left_pos, left_n as f64)
                + right_n as f64 * gini(total_pos - left_pos, right_n as f64))
                / n_f;
            let decrease = parent - weighted;

            if decrease > best.map_or(0.0, |b| b.2) {
                best = Some((feature, split_threshold(value, next), decrease));
            }
        }

        best
    }

    /// Positive-class fraction of the reached leaf, per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_input(x)?;
        Ok(x.rows().into_iter().map(|row| traverse(&self.nodes, row)).collect())
    }

    pub(crate) fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        traverse(&self.nodes, row)
    }

    /// Normalized impurity decrease per feature
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted() {
            return Err(FraudError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(FraudError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn classification_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((40, 2), (0..80).map(|i| (i % 40) as f64).collect()).unwrap();
        let y: Array1<f64> = x.rows().into_iter().map(|r| if r[0] >= 20.0 { 1.0 } else { 0.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_adjacent_float_values_split() {
        let a = f64::from_bits(1.0f64.to_bits() + 1);
        let b = f64::from_bits(1.0f64.to_bits() + 2);
        assert!(split_threshold(a, b) < b);
        assert!(split_threshold(a, b) >= a);

        let x = array![[a], [b]];
        let y = array![0.0, 1.0];
        let mut tree = DecisionTree::new().with_max_depth(None);
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.predict_proba(&x).unwrap().to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_split_threshold_midpoint() {
        assert_eq!(split_threshold(1.0, 3.0), 2.0);
        assert_eq!(split_threshold(-2.0, -1.0), -1.5);
    }

    #[test]
    fn test_tree_fits_separable_data() {
        let (x, y) = classification_data();
        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        assert_eq!(proba, y);
        assert_eq!(tree.n_nodes(), 3);
    }

    #[test]
    fn test_leaf_holds_positive_fraction() {
        let x = array![[0.0], [0.0], [0.0], [0.0]];
        let y = array![1.0, 0.0, 1.0, 1.0];
        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        // identical rows cannot be split
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_proba(&x).unwrap()[0], 0.75);
    }

    #[test]
    fn test_max_depth_limits_tree() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 1.0, 0.0, 1.0];
        let mut tree = DecisionTree::new().with_max_depth(Some(1));
        tree.fit(&x, &y).unwrap();
        assert!(tree.n_nodes() <= 3);
    }

    #[test]
    fn test_feature_importances_sum_to_one() {
        let (x, y) = classification_data();
        let mut tree = DecisionTree::new().with_max_features(1).with_seed(7);
        tree.fit(&x, &y).unwrap();

        let importances = tree.feature_importances().unwrap();
        assert!((importances.sum() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_predict_wrong_width() {
        let (x, y) = classification_data();
        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();
        assert!(tree.predict_proba(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_deep_tree_round_trips_through_json() {
        // a staircase label forces one split per level
        let n = 300;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let y: Array1<f64> = (0..n).map(|i| (i % 2) as f64).collect();
        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&tree).unwrap();
        let restored: DecisionTree = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.predict_proba(&x).unwrap(), tree.predict_proba(&x).unwrap());
    }
}
