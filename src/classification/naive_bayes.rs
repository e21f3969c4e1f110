//! Multinomial Naive Bayes
//!
//! Works on non-negative feature vectors (counts or TF-IDF weights).

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multinomial Naive Bayes classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Additive (Laplace/Lidstone) smoothing
    alpha: f64,
    /// Sorted class labels
    classes: Vec<String>,
    /// log P(class)
    class_log_prior: Vec<f64>,
    /// log P(feature | class), [classes x features]
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

impl MultinomialNb {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            classes: Vec::new(),
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
            n_features: 0,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.classes.is_empty()
    }

    /// Class labels in the order used by `predict_proba`
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fit the classifier
    ///
    /// # Arguments
    /// * `features` - One non-negative vector per document
    /// * `labels` - Class label per document
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[String]) -> Result<()> {
        if features.len() != labels.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        if features.is_empty() {
            return Err(PipelineError::InsufficientData(
                "cannot fit Naive Bayes on zero documents".to_string(),
            ));
        }
        if self.alpha <= 0.0 {
            return Err(PipelineError::invalid("alpha", "must be positive"));
        }

        let n_features = features[0].len();

        // Feature counts per class; BTreeMap keeps classes sorted
        let mut class_counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut feature_counts: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

        for (row, label) in features.iter().zip(labels.iter()) {
            if row.len() != n_features {
                return Err(PipelineError::DimensionMismatch {
                    expected: n_features,
                    actual: row.len(),
                });
            }
            if row.iter().any(|&x| x < 0.0) {
                return Err(PipelineError::invalid(
                    "features",
                    "multinomial Naive Bayes needs non-negative values",
                ));
            }

            *class_counts.entry(label.as_str()).or_insert(0) += 1;
            let counts = feature_counts
                .entry(label.as_str())
                .or_insert_with(|| vec![0.0; n_features]);
            for (acc, x) in counts.iter_mut().zip(row.iter()) {
                *acc += x;
            }
        }

        let total = features.len() as f64;

        self.classes = class_counts.keys().map(|c| c.to_string()).collect();
        self.class_log_prior = class_counts
            .values()
            .map(|&count| (count as f64 / total).ln())
            .collect();

        // log P(feature|class) = log((count + alpha) / (total + alpha * n_features))
        self.feature_log_prob = feature_counts
            .values()
            .map(|counts| {
                let smoothed_total: f64 = counts.iter().map(|c| c + self.alpha).sum();
                counts
                    .iter()
                    .map(|c| ((c + self.alpha) / smoothed_total).ln())
                    .collect()
            })
            .collect();

        self.n_features = n_features;

        tracing::debug!(
            "Naive Bayes fitted: {} classes, {} features",
            self.classes.len(),
            n_features
        );

        Ok(())
    }

    fn joint_log_likelihood(&self, features: &[f64]) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(PipelineError::NotFitted);
        }
        if features.len() != self.n_features {
            return Err(PipelineError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        Ok(self
            .feature_log_prob
            .iter()
            .zip(self.class_log_prior.iter())
            .map(|(log_probs, prior)| {
                prior
                    + log_probs
                        .iter()
                        .zip(features.iter())
                        .map(|(lp, x)| lp * x)
                        .sum::<f64>()
            })
            .collect())
    }

    /// Most probable class; ties go to the first class in sorted order
    pub fn predict(&self, features: &[f64]) -> Result<String> {
        let jll = self.joint_log_likelihood(features)?;

        let mut best = 0;
        for (idx, score) in jll.iter().enumerate() {
            if *score > jll[best] {
                best = idx;
            }
        }

        Ok(self.classes[best].clone())
    }

    /// Probability of every class, in `classes()` order
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        let jll = self.joint_log_likelihood(features)?;

        // Softmax with max shift
        let max_score = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = jll.iter().map(|s| (s - max_score).exp()).collect();
        let sum_exp: f64 = exps.iter().sum();

        Ok(exps.into_iter().map(|e| e / sum_exp).collect())
    }

    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<String>> {
        features.iter().map(|row| self.predict(row)).collect()
    }

    /// Accuracy on labelled data
    pub fn score(&self, features: &[Vec<f64>], labels: &[String]) -> Result<f64> {
        let predictions = self.predict_batch(features)?;
        Ok(super::accuracy_score(labels, &predictions))
    }
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self::new()
    }
}
