//! Logistic regression for binary classification

use crate::config::LogisticParams;
use crate::error::{FraudError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// L2-regularized logistic regression fitted by full-batch gradient descent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Inverse regularization strength; the per-sample penalty is 1 / (C * n)
    pub c: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Largest gradient step; the fit shrinks it when the penalty requires
    pub learning_rate: f64,
    n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            c: 1.0,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            n_iter: 0,
        }
    }

    /// Model from the pipeline's logistic parameters
    pub fn from_params(params: &LogisticParams) -> Self {
        Self::new().with_c(params.c).with_max_iter(params.max_iter)
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Iterations run by the last fit
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Fit the model using gradient descent
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
            return Err(FraudError::TrainingError("Cannot fit on zero samples".to_string()));
        }
        if self.c <= 0.0 {
            return Err(FraudError::TrainingError(format!("C must be positive, got {}", self.c)));
        }

        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;

        let alpha = 1.0 / (self.c * n_samples as f64);

        // Step bounded by 1/L, L = 0.25 * (||X||_F^2 + n) / n + alpha bounds
        // the Lipschitz constant of the penalized gradient (bias column included)
        let frobenius = x.iter().map(|v| v * v).sum::<f64>();
        let lipschitz = 0.25 * (frobenius + n_samples as f64) / n_samples as f64 + alpha;
        let lr = self.learning_rate.min(1.0 / lipschitz);
        let mut n_iter = 0;

        for _ in 0..self.max_iter {
            n_iter += 1;
            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            // intercept is not penalized
            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        debug!(n_iter, "Fitted logistic regression");
        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.n_iter = n_iter;
        Ok(self)
    }

    /// Signed distance to the decision boundary (log-odds)
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or(FraudError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(FraudError::ShapeError {
                expected: format!("{} features", coefficients.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(coefficients) + self.intercept.unwrap_or(0.0))
    }

    /// Predict positive-class probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Self::sigmoid(&self.decision_function(x)?))
    }
}
