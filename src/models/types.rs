//! Data types for documents, feature matrices and learning results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single text document, one row of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Title (first `<h1>` for scraped pages)
    pub title: String,
    /// Source URL, if the document was scraped
    #[serde(default)]
    pub url: Option<String>,
    /// Raw text
    pub text: String,
    /// Category label, if known
    #[serde(default)]
    pub category: Option<String>,
    /// Output of the preprocessing pipeline
    #[serde(default)]
    pub processed_text: Option<String>,
    /// Number of whitespace-separated words in `text`
    #[serde(default)]
    pub word_count: usize,
    /// Category assigned by the keyword heuristic
    #[serde(default)]
    pub auto_category: Option<String>,
    /// Confidence of `auto_category` (0.0 - 1.0)
    #[serde(default)]
    pub category_confidence: Option<f64>,
    /// Cluster assignment
    #[serde(default)]
    pub cluster: Option<usize>,
    /// When the document was fetched
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = count_words(&text);
        Self {
            title: title.into(),
            url: None,
            text,
            category: None,
            processed_text: None,
            word_count,
            auto_category: None,
            category_confidence: None,
            cluster: None,
            scraped_at: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Recount words when the count is missing, e.g. a CSV without a
    /// `word_count` column
    pub fn fill_word_count(&mut self) {
        if self.word_count == 0 {
            self.word_count = count_words(&self.text);
        }
    }

    /// Short preview of the raw text, cut on a char boundary
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.text.chars().take(max_chars).collect();
        if self.text.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Language of the processed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spanish" | "es" | "español" => Ok(Language::Spanish),
            "english" | "en" => Ok(Language::English),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

/// Document-term matrix
#[derive(Debug, Clone, Default)]
pub struct DocumentTermMatrix {
    /// Term -> column index
    pub vocabulary: HashMap<String, usize>,
    /// Column index -> term
    pub terms: Vec<String>,
    /// Weights [documents x terms]
    pub matrix: Vec<Vec<f64>>,
}

impl DocumentTermMatrix {
    pub fn n_documents(&self) -> usize {
        self.matrix.len()
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// (documents, terms)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_documents(), self.n_terms())
    }

    pub fn get_document_vector(&self, doc_idx: usize) -> Option<&Vec<f64>> {
        self.matrix.get(doc_idx)
    }

    /// Rows selected by index, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Vec<Vec<f64>> {
        indices.iter().map(|&i| self.matrix[i].clone()).collect()
    }
}

/// Precision / recall / F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class report with macro and weighted averages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// (class, metrics), classes sorted
    pub per_class: Vec<(String, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn get(&self, class: &str) -> Option<&ClassMetrics> {
        self.per_class
            .iter()
            .find(|(name, _)| name == class)
            .map(|(_, m)| m)
    }
}

/// Confusion matrix, rows = true class, columns = predicted class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

/// Result of training the supervised classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
    /// All categories seen in the labels, sorted
    pub categories: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub stratified: bool,
}

/// Result of k-means clustering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringResult {
    pub labels: Vec<usize>,
    /// `None` when the silhouette is undefined for the labeling
    pub silhouette_score: Option<f64>,
    pub n_clusters: usize,
    pub centers: Vec<Vec<f64>>,
    pub inertia: f64,
}

impl ClusteringResult {
    /// Number of documents per cluster, indexed by cluster id
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Indices of documents assigned to `cluster`
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == cluster)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_word_count() {
        let doc = Document::new("t", "uno dos  tres\ncuatro");
        assert_eq!(doc.word_count, 4);
    }

    #[test]
    fn test_fill_word_count_only_when_missing() {
        let mut doc = Document::new("t", "uno dos tres");
        doc.word_count = 0;
        doc.fill_word_count();
        assert_eq!(doc.word_count, 3);

        doc.word_count = 7;
        doc.fill_word_count();
        assert_eq!(doc.word_count, 7);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let doc = Document::new("t", "áéíóú más texto");
        assert_eq!(doc.preview(3), "áéí...");
        assert_eq!(doc.preview(100), "áéíóú más texto");
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_cluster_sizes_and_members() {
        let result = ClusteringResult {
            labels: vec![0, 1, 1, 0, 1],
            silhouette_score: None,
            n_clusters: 2,
            centers: vec![],
            inertia: 0.0,
        };
        assert_eq!(result.cluster_sizes(), vec![2, 3]);
        assert_eq!(result.members(1), vec![1, 2, 4]);
    }
}
