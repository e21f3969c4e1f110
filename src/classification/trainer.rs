//! Classifier training, prediction and persistence

use super::metrics::{accuracy_score, classification_report, confusion_matrix};
use super::naive_bayes::MultinomialNb;
use super::split::{stratified_split, train_test_split};
use crate::config::{ClassifierConfig, PreprocessingConfig};
use crate::error::{PipelineError, Result};
use crate::models::TrainingMetrics;
use crate::nlp::{TextPreprocessor, TfIdf, Vectorizer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{info, warn};

/// Trains and evaluates a Naive Bayes text classifier
#[derive(Debug, Clone)]
pub struct TextClassifier {
    config: ClassifierConfig,
    model: Option<MultinomialNb>,
    categories: Vec<String>,
}

impl TextClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            model: None,
            categories: Vec::new(),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Categories seen in the training labels, sorted
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn model(&self) -> Option<&MultinomialNb> {
        self.model.as_ref()
    }

    /// Split, fit and evaluate.
    ///
    /// Small datasets (fewer than two rows in some class, or fewer than four
    /// rows per class overall) are split without stratification, with the
    /// test share raised so it can hold one row per class.
    pub fn train(
        &mut self,
        features: &[Vec<f64>],
        labels: &[String],
        test_size: f64,
    ) -> Result<TrainingMetrics> {
        if features.len() != labels.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }

        let n_samples = labels.len();
        if n_samples < 2 {
            return Err(PipelineError::InsufficientData(
                "at least two labelled documents are needed".to_string(),
            ));
        }

        let mut class_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for label in labels {
            *class_counts.entry(label.as_str()).or_insert(0) += 1;
        }
        let n_classes = class_counts.len();
        let min_per_class = class_counts.values().copied().min().unwrap_or(0);

        info!(
            "Training classifier on {} documents, {} categories",
            n_samples, n_classes
        );

        let adjusted_test_size = (n_classes as f64 / n_samples as f64).max(test_size);
        let use_stratify = min_per_class >= 2 && n_samples >= n_classes * 4;

        let split = if use_stratify {
            stratified_split(labels, test_size, self.config.seed)?
        } else {
            warn!(
                "Small dataset detected ({} samples, {} classes), training without stratification",
                n_samples, n_classes
            );
            train_test_split(n_samples, adjusted_test_size, self.config.seed)?
        };

        let pick = |indices: &[usize]| -> (Vec<Vec<f64>>, Vec<String>) {
            indices
                .iter()
                .map(|&i| (features[i].clone(), labels[i].clone()))
                .unzip()
        };
        let (x_train, y_train) = pick(&split.train);
        let (x_test, y_test) = pick(&split.test);

        let mut model = MultinomialNb::new().with_alpha(self.config.alpha);
        model.fit(&x_train, &y_train)?;

        let y_pred = model.predict_batch(&x_test)?;
        let accuracy = accuracy_score(&y_test, &y_pred);

        info!("Training complete - accuracy: {:.2}%", accuracy * 100.0);

        let categories: Vec<String> = class_counts.keys().map(|c| c.to_string()).collect();
        let report = classification_report(&y_test, &y_pred, &categories);
        let confusion = confusion_matrix(&y_test, &y_pred, &categories);

        self.model = Some(model);
        self.categories = categories.clone();

        Ok(TrainingMetrics {
            accuracy,
            report,
            confusion_matrix: confusion,
            categories,
            n_train: x_train.len(),
            n_test: x_test.len(),
            stratified: use_stratify,
        })
    }

    pub fn predict(&self, features: &[f64]) -> Result<String> {
        self.model.as_ref().ok_or(PipelineError::NotFitted)?.predict(features)
    }

    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<String>> {
        self.model
            .as_ref()
            .ok_or(PipelineError::NotFitted)?
            .predict_batch(features)
    }

    /// Predicted class plus (class, probability) for every class the model knows
    pub fn predict_with_probabilities(
        &self,
        features: &[f64],
    ) -> Result<(String, Vec<(String, f64)>)> {
        let model = self.model.as_ref().ok_or(PipelineError::NotFitted)?;
        let predicted = model.predict(features)?;
        let probabilities = model
            .classes()
            .iter()
            .cloned()
            .zip(model.predict_proba(features)?)
            .collect();
        Ok((predicted, probabilities))
    }
}

/// Outcome of classifying one raw text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub category: String,
    /// (class, probability), most probable first
    pub probabilities: Vec<(String, f64)>,
    pub processed_text: String,
}

/// Everything needed to classify raw text later: preprocessing settings,
/// the fitted vectorizer and the fitted classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub preprocessing: PreprocessingConfig,
    pub vectorizer: TfIdf,
    pub classifier: MultinomialNb,
    pub categories: Vec<String>,
    pub trained_at: DateTime<Utc>,
}

impl ModelBundle {
    pub fn new(
        preprocessor: &TextPreprocessor,
        vectorizer: TfIdf,
        classifier: &TextClassifier,
    ) -> Result<Self> {
        let model = classifier.model().ok_or(PipelineError::NotFitted)?;
        if !vectorizer.is_fitted() {
            return Err(PipelineError::NotFitted);
        }
        Ok(Self {
            preprocessing: preprocessor.config(),
            vectorizer,
            classifier: model.clone(),
            categories: classifier.categories().to_vec(),
            trained_at: Utc::now(),
        })
    }

    /// Preprocess, vectorize and classify a raw text
    pub fn classify_text(&self, text: &str) -> Result<Prediction> {
        let preprocessor = TextPreprocessor::from_config(&self.preprocessing);
        let processed_text = preprocessor.process(text);
        let vector = self.vectorizer.transform(&processed_text);

        let category = self.classifier.predict(&vector)?;
        let mut probabilities: Vec<(String, f64)> = self
            .classifier
            .classes()
            .iter()
            .cloned()
            .zip(self.classifier.predict_proba(&vector)?)
            .collect();
        probabilities.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(Prediction {
            category,
            probabilities,
            processed_text,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("Model saved to {:?}", path.as_ref());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(&path)?);
        let bundle = serde_json::from_reader(reader)?;
        info!("Model loaded from {:?}", path.as_ref());
        Ok(bundle)
    }
}
