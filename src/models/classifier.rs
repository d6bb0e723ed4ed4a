//! Бинарный классификатор поверх матрицы признаков

use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};

/// Внешняя модель, выдающая вероятность положительного класса.
pub trait ProbabilisticClassifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// Вероятность для каждой строки матрицы, значения в [0, 1].
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>>;
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Логистическая регрессия с готовыми весами.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Result<Self> {
        if weights.is_empty() {
            return Err(PrepError::InvalidModel("model has no weights".to_string()));
        }
        if weights.iter().any(|w| !w.is_finite()) || !bias.is_finite() {
            return Err(PrepError::InvalidModel("non-finite model parameters".to_string()));
        }
        Ok(Self { weights, bias })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: LogisticModel = serde_json::from_str(text)?;
        Self::new(raw.weights, raw.bias)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let model = Self::from_json(&text)?;
        tracing::info!(
            "Loaded logistic model from {}: {} weights",
            path.display(),
            model.weights.len()
        );
        Ok(model)
    }
}

impl ProbabilisticClassifier for LogisticModel {
    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        if features.ncols() != self.weights.len() {
            return Err(PrepError::FeatureMismatch {
                expected: self.weights.len(),
                got: features.ncols(),
            });
        }

        let weights = Array1::from_vec(self.weights.clone());
        let scores = features.dot(&weights) + self.bias;
        Ok(scores.mapv(sigmoid))
    }
}
