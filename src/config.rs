//! Pipeline configuration.

use crate::models::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub scraper: ScraperConfig,
    pub preprocessing: PreprocessingConfig,
    pub vectorizer: VectorizerConfig,
    pub classifier: ClassifierConfig,
    pub clustering: ClusteringConfig,
    pub categorizer: CategorizerConfig,
}

/// HTTP scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Pause between consecutive requests in seconds
    pub delay_secs: f64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            timeout_secs: 10,
            delay_secs: 1.0,
        }
    }
}

/// Text preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub language: Language,
    /// Tokens with at most this many characters are dropped
    pub max_short_token_len: usize,
    pub stemming: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            language: Language::Spanish,
            max_short_token_len: 2,
            stemming: true,
        }
    }
}

/// TF-IDF configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub max_features: Option<usize>,
    pub ngram_range: (usize, usize),
    /// Minimum number of documents a term must appear in
    pub min_df: usize,
    /// Maximum share of documents a term may appear in
    pub max_df: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(1000),
            ngram_range: (1, 2),
            min_df: 2,
            max_df: 0.8,
        }
    }
}

/// Naive Bayes training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub test_size: f64,
    /// Additive smoothing
    pub alpha: f64,
    pub seed: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            alpha: 1.0,
            seed: 42,
        }
    }
}

/// K-means configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// `None` picks the number of clusters from the corpus size
    pub n_clusters: Option<usize>,
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            n_clusters: Some(3),
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// Keyword categorizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizerConfig {
    /// Below this confidence a document is marked uncertain
    pub confidence_threshold: f64,
    /// Above this confidence a cluster is named after its domain
    pub cluster_label_threshold: f64,
    /// Number of frequent words kept per cluster
    pub top_keywords: usize,
    /// Extra domains, added after the built-in ones
    pub custom_domains: BTreeMap<String, Vec<String>>,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            cluster_label_threshold: 0.2,
            top_keywords: 5,
            custom_domains: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.scraper.timeout_secs, 10);
        assert_eq!(config.vectorizer.ngram_range, (1, 2));
        assert_eq!(config.vectorizer.min_df, 2);
        assert_eq!(config.classifier.seed, 42);
        assert_eq!(config.clustering.n_init, 10);
        assert!((config.categorizer.confidence_threshold - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"classifier": {"test_size": 0.3}}"#).unwrap();
        assert!((config.classifier.test_size - 0.3).abs() < 1e-12);
        assert!((config.classifier.alpha - 1.0).abs() < 1e-12);
        assert_eq!(config.vectorizer.max_features, Some(1000));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PipelineConfig::default();
        config.preprocessing.language = Language::English;
        config.to_file(&path).unwrap();

        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.preprocessing.language, Language::English);
    }
}
