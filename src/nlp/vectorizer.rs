//! Text vectorization
//!
//! Turns preprocessed text into numeric vectors:
//! - Bag of Words (term counts over word n-grams)
//! - TF-IDF (Term Frequency - Inverse Document Frequency)

use crate::config::VectorizerConfig;
use crate::error::{PipelineError, Result};
use crate::models::DocumentTermMatrix;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Common interface of the vectorizers
pub trait Vectorizer {
    /// Learn the vocabulary from a corpus of preprocessed texts
    fn fit(&mut self, documents: &[String]) -> Result<()>;

    /// Turn one preprocessed text into a vector
    fn transform(&self, document: &str) -> Vec<f64>;

    /// Fit, then transform every document
    fn fit_transform(&mut self, documents: &[String]) -> Result<DocumentTermMatrix> {
        self.fit(documents)?;
        Ok(self.transform_many(documents))
    }

    /// Transform a batch of documents with the fitted vocabulary
    fn transform_many(&self, documents: &[String]) -> DocumentTermMatrix;

    /// Term -> column index
    fn vocabulary(&self) -> &HashMap<String, usize>;
}

/// Bag of Words vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagOfWords {
    /// Term -> index
    vocabulary: HashMap<String, usize>,
    /// Index -> term, sorted
    terms: Vec<String>,
    /// Minimum number of documents containing a term
    min_df: usize,
    /// Maximum share of documents containing a term
    max_df: f64,
    /// Keep only the most frequent terms
    max_features: Option<usize>,
    /// Smallest and largest n-gram size
    ngram_range: (usize, usize),
}

impl BagOfWords {
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            min_df: 1,
            max_df: 1.0,
            max_features: None,
            ngram_range: (1, 1),
        }
    }

    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.max_df = max_df;
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.ngram_range = (min_n, max_n);
        self
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Split a preprocessed text into the configured n-grams
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document
            .split_whitespace()
            .filter(|t| t.chars().count() >= 2)
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n {
            if n == 0 || tokens.len() < n {
                continue;
            }
            grams.extend(tokens.windows(n).map(|window| window.join(" ")));
        }
        grams
    }

    fn validate(&self, n_docs: usize) -> Result<f64> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(PipelineError::invalid(
                "ngram_range",
                format!("({}, {}) is not a valid range", min_n, max_n),
            ));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(PipelineError::invalid("max_df", "must be in (0, 1]"));
        }
        if n_docs == 0 {
            return Err(PipelineError::InsufficientData(
                "cannot fit a vocabulary on zero documents".to_string(),
            ));
        }

        let max_doc_count = self.max_df * n_docs as f64;
        if max_doc_count < self.min_df as f64 {
            return Err(PipelineError::invalid(
                "max_df",
                "corresponds to fewer documents than min_df",
            ));
        }
        Ok(max_doc_count)
    }
}

impl Default for BagOfWords {
    fn default() -> Self {
        Self::new()
    }
}

impl Vectorizer for BagOfWords {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        let max_doc_count = self.validate(documents.len())?;

        // Document frequency and corpus frequency per term
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut term_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let grams = self.analyze(doc);
            let unique_terms: HashSet<&String> = grams.iter().collect();
            for term in unique_terms {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            for term in &grams {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let mut filtered_terms: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df && (*df as f64) <= max_doc_count)
            .map(|(term, _)| {
                let tf = term_freq.get(&term).copied().unwrap_or(0);
                (term, tf)
            })
            .collect();

        if let Some(limit) = self.max_features {
            filtered_terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            filtered_terms.truncate(limit);
        }

        if filtered_terms.is_empty() {
            return Err(PipelineError::EmptyVocabulary);
        }

        // Alphabetical order for deterministic columns
        filtered_terms.sort_by(|a, b| a.0.cmp(&b.0));

        self.vocabulary.clear();
        self.terms.clear();
        for (idx, (term, _)) in filtered_terms.into_iter().enumerate() {
            self.vocabulary.insert(term.clone(), idx);
            self.terms.push(term);
        }

        Ok(())
    }

    fn transform(&self, document: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.terms.len()];

        for term in self.analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                vector[idx] += 1.0;
            }
        }

        vector
    }

    fn transform_many(&self, documents: &[String]) -> DocumentTermMatrix {
        DocumentTermMatrix {
            vocabulary: self.vocabulary.clone(),
            terms: self.terms.clone(),
            matrix: documents.iter().map(|doc| self.transform(doc)).collect(),
        }
    }

    fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }
}

/// TF-IDF vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdf {
    /// Underlying term counter
    bow: BagOfWords,
    /// IDF per term
    idf: Vec<f64>,
    /// L2-normalize rows
    normalize: bool,
    /// Add one to document frequencies, as if a document held every term
    smooth_idf: bool,
}

impl TfIdf {
    pub fn new() -> Self {
        Self {
            bow: BagOfWords::new(),
            idf: Vec::new(),
            normalize: true,
            smooth_idf: true,
        }
    }

    /// Vectorizer built from the pipeline configuration
    pub fn from_config(config: &VectorizerConfig) -> Self {
        Self::new()
            .with_max_features(config.max_features)
            .with_ngram_range(config.ngram_range.0, config.ngram_range.1)
            .with_min_df(config.min_df)
            .with_max_df(config.max_df)
    }

    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.bow = self.bow.with_min_df(min_df);
        self
    }

    pub fn with_max_df(mut self, max_df: f64) -> Self {
        self.bow = self.bow.with_max_df(max_df);
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.bow = self.bow.with_max_features(max_features);
        self
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        self.bow = self.bow.with_ngram_range(min_n, max_n);
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_smooth_idf(mut self, smooth: bool) -> Self {
        self.smooth_idf = smooth;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.idf.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.bow.n_terms()
    }

    /// Vocabulary terms in column order
    pub fn feature_names(&self) -> &[String] {
        self.bow.terms()
    }

    /// First `n` terms of the vocabulary
    pub fn important_terms(&self, n: usize) -> Vec<String> {
        self.bow.terms().iter().take(n).cloned().collect()
    }

    fn calculate_idf(&mut self, documents: &[String]) {
        let n_docs = documents.len() as f64;
        let n_terms = self.bow.n_terms();

        let mut doc_freq = vec![0usize; n_terms];

        for doc in documents {
            let grams = self.bow.analyze(doc);
            let unique_terms: HashSet<&String> = grams.iter().collect();
            for term in unique_terms {
                if let Some(&idx) = self.bow.vocabulary.get(term) {
                    doc_freq[idx] += 1;
                }
            }
        }

        self.idf = doc_freq
            .into_iter()
            .map(|df| {
                let (n, df) = if self.smooth_idf {
                    (n_docs + 1.0, df as f64 + 1.0)
                } else {
                    (n_docs, (df as f64).max(1.0))
                };
                (n / df).ln() + 1.0
            })
            .collect();
    }

    fn l2_normalize(vector: &mut [f64]) {
        let norm: f64 = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in vector.iter_mut() {
                *x /= norm;
            }
        }
    }

    pub fn get_idf(&self) -> &[f64] {
        &self.idf
    }

    /// Top-N terms by IDF (rarest first)
    pub fn top_terms(&self, n: usize) -> Vec<(String, f64)> {
        let mut term_idf: Vec<_> = self
            .bow
            .terms
            .iter()
            .zip(self.idf.iter())
            .map(|(term, idf)| (term.clone(), *idf))
            .collect();

        term_idf.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        term_idf.truncate(n);
        term_idf
    }
}

impl Default for TfIdf {
    fn default() -> Self {
        Self::new()
    }
}

impl Vectorizer for TfIdf {
    fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.bow.fit(documents)?;
        self.calculate_idf(documents);
        Ok(())
    }

    fn transform(&self, document: &str) -> Vec<f64> {
        let mut tf_vector = self.bow.transform(document);

        for (idx, tf) in tf_vector.iter_mut().enumerate() {
            *tf *= self.idf[idx];
        }

        if self.normalize {
            Self::l2_normalize(&mut tf_vector);
        }

        tf_vector
    }

    fn transform_many(&self, documents: &[String]) -> DocumentTermMatrix {
        DocumentTermMatrix {
            vocabulary: self.bow.vocabulary.clone(),
            terms: self.bow.terms.clone(),
            matrix: documents.iter().map(|doc| self.transform(doc)).collect(),
        }
    }

    fn vocabulary(&self) -> &HashMap<String, usize> {
        self.bow.vocabulary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "futbol gol equipo".to_string(),
            "futbol partido equipo".to_string(),
            "python codigo datos".to_string(),
            "python datos modelo".to_string(),
        ]
    }

    #[test]
    fn test_analyze_bigrams() {
        let bow = BagOfWords::new().with_ngram_range(1, 2);
        let grams = bow.analyze("red neuronal profunda");
        assert_eq!(
            grams,
            vec!["red", "neuronal", "profunda", "red neuronal", "neuronal profunda"]
        );
    }

    #[test]
    fn test_bag_of_words_counts() {
        let mut bow = BagOfWords::new();
        let dtm = bow.fit_transform(&["gol gol equipo".to_string()]).unwrap();

        assert_eq!(dtm.terms, vec!["equipo", "gol"]);
        assert_eq!(dtm.matrix[0], vec![1.0, 2.0]);
    }

    #[test]
    fn test_min_df_prunes_rare_terms() {
        let mut tfidf = TfIdf::new().with_min_df(2);
        tfidf.fit(&corpus()).unwrap();

        assert_eq!(tfidf.feature_names(), &["datos", "equipo", "futbol", "python"]);
    }

    #[test]
    fn test_max_df_prunes_common_terms() {
        let docs = vec![
            "comun alfa".to_string(),
            "comun beta".to_string(),
            "comun alfa".to_string(),
        ];
        let mut tfidf = TfIdf::new().with_max_df(0.8);
        tfidf.fit(&docs).unwrap();

        assert!(!tfidf.vocabulary().contains_key("comun"));
        assert!(tfidf.vocabulary().contains_key("alfa"));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs = vec!["gol gol gol equipo".to_string(), "gol partido".to_string()];
        let mut bow = BagOfWords::new().with_max_features(Some(2));
        bow.fit(&docs).unwrap();

        // gol (4), then equipo/partido tie (1) broken alphabetically
        assert_eq!(bow.terms(), &["equipo", "gol"]);
    }

    #[test]
    fn test_empty_vocabulary_error() {
        let mut tfidf = TfIdf::new().with_min_df(2);
        let result = tfidf.fit(&["uno".to_string(), "dos".to_string()]);
        assert!(matches!(result, Err(PipelineError::EmptyVocabulary)));
    }

    #[test]
    fn test_max_df_below_min_df_is_rejected() {
        let mut tfidf = TfIdf::new().with_min_df(2).with_max_df(0.5);
        let result = tfidf.fit(&["a1 b1".to_string(), "a1 c1".to_string()]);
        assert!(matches!(result, Err(PipelineError::InvalidParameter { .. })));
    }

    #[test]
    fn test_tfidf_rows_are_normalized() {
        let mut tfidf = TfIdf::new();
        let dtm = tfidf.fit_transform(&corpus()).unwrap();

        for row in &dtm.matrix {
            let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_smooth_idf_values() {
        let mut tfidf = TfIdf::new();
        tfidf.fit(&corpus()).unwrap();

        let idx = tfidf.vocabulary()["futbol"];
        // df = 2, n = 4: ln(5 / 3) + 1
        assert!((tfidf.get_idf()[idx] - ((5.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_terms_give_zero_vector() {
        let mut tfidf = TfIdf::new();
        tfidf.fit(&corpus()).unwrap();

        let vector = tfidf.transform("desconocido");
        assert!(vector.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_top_terms_rarest_first() {
        let mut tfidf = TfIdf::new();
        tfidf.fit(&corpus()).unwrap();

        let top = tfidf.top_terms(1);
        // Single-document terms share the highest IDF; ties go alphabetically
        assert_eq!(top[0].0, "codigo");
    }
}
