//! Keyword-based categorizer with cluster labelling

use super::domains::default_domains;
use crate::clustering::train_clustering;
use crate::config::{CategorizerConfig, ClusteringConfig};
use crate::data::Dataset;
use crate::error::{PipelineError, Result};
use crate::models::{ClusteringResult, Document};
use crate::nlp::TextPreprocessor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Label for texts with no keyword match at all
pub const UNCLASSIFIED: &str = "Unclassified";
/// Label for texts whose best domain is below the confidence threshold
pub const UNCERTAIN: &str = "Uncertain";

/// Category picked for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    pub index: usize,
    pub category: String,
    pub confidence: f64,
}

/// Documents per auto category with their mean confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub count: usize,
    pub mean_confidence: f64,
}

/// Clustering together with a suggested name and top words per cluster
#[derive(Debug, Clone)]
pub struct LabeledClusters {
    pub clustering: ClusteringResult,
    /// Suggested label, indexed by cluster id
    pub labels: Vec<String>,
    /// Most frequent words, indexed by cluster id (empty without texts)
    pub keywords: Vec<Vec<String>>,
}

impl LabeledClusters {
    /// Label of the cluster a document was assigned to
    pub fn label_of(&self, doc_idx: usize) -> Option<&str> {
        self.clustering
            .labels
            .get(doc_idx)
            .and_then(|&c| self.labels.get(c))
            .map(String::as_str)
    }
}

/// Assigns topic labels from domain keyword dictionaries
#[derive(Debug, Clone)]
pub struct AutoCategorizer {
    domains: Vec<(String, Vec<String>)>,
    config: CategorizerConfig,
    clustering: ClusteringConfig,
}

impl AutoCategorizer {
    pub fn new() -> Self {
        Self {
            domains: default_domains(),
            config: CategorizerConfig::default(),
            clustering: ClusteringConfig::default(),
        }
    }

    /// Built-in domains followed by the configured custom ones
    pub fn from_config(config: &CategorizerConfig, clustering: &ClusteringConfig) -> Self {
        let mut categorizer = Self {
            domains: default_domains(),
            config: config.clone(),
            clustering: clustering.clone(),
        };
        for (domain, keywords) in &config.custom_domains {
            categorizer.add_custom_keywords(domain, keywords.clone());
        }
        categorizer
    }

    pub fn domains(&self) -> &[(String, Vec<String>)] {
        &self.domains
    }

    /// Add a domain, or replace the keywords of an existing one in place
    pub fn add_custom_keywords(&mut self, domain: &str, keywords: Vec<String>) {
        let keywords: Vec<String> = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        info!("Domain '{}' set with {} keywords", domain, keywords.len());

        match self.domains.iter_mut().find(|(name, _)| name == domain) {
            Some((_, existing)) => *existing = keywords,
            None => self.domains.push((domain.to_string(), keywords)),
        }
    }

    /// Best matching domain and its share of all keyword hits.
    ///
    /// Every (word, keyword) pair where one contains the other scores a hit
    /// for the keyword's domain. Ties go to the domain listed first.
    pub fn detect_by_keywords(&self, processed_text: &str) -> (String, f64) {
        let text = processed_text.to_lowercase();
        let words: Vec<&str> = text.split_whitespace().collect();

        let scores: Vec<usize> = self
            .domains
            .iter()
            .map(|(_, keywords)| {
                words
                    .iter()
                    .map(|word| {
                        keywords
                            .iter()
                            .filter(|k| k.contains(word) || word.contains(k.as_str()))
                            .count()
                    })
                    .sum()
            })
            .collect();

        let best = scores.iter().copied().max().unwrap_or(0);
        if best == 0 {
            return (UNCLASSIFIED.to_string(), 0.0);
        }

        let total: usize = scores.iter().sum();
        let idx = scores.iter().position(|&s| s == best).unwrap_or(0);
        (self.domains[idx].0.clone(), best as f64 / total as f64)
    }

    /// Detect one text against the configured confidence threshold
    pub fn categorize_text(&self, processed_text: &str) -> (String, f64) {
        let (category, confidence) = self.detect_by_keywords(processed_text);
        if confidence < self.config.confidence_threshold {
            (UNCERTAIN.to_string(), confidence)
        } else {
            (category, confidence)
        }
    }

    /// Build a document ready to append to a dataset.
    ///
    /// Without an explicit `category` the detected one becomes the label.
    pub fn label_document(
        &self,
        preprocessor: &TextPreprocessor,
        title: &str,
        text: &str,
        category: Option<String>,
    ) -> Document {
        let mut doc = Document::new(title, text);
        let processed = preprocessor.process(text);
        let (detected, confidence) = self.categorize_text(&processed);

        doc.category = Some(category.unwrap_or_else(|| detected.clone()));
        doc.auto_category = Some(detected);
        doc.category_confidence = Some(confidence);
        doc.processed_text = Some(processed);
        doc.scraped_at = Some(chrono::Utc::now());
        doc
    }

    /// Detect every text, marking low-confidence results as uncertain
    pub fn categorize_documents(
        &self,
        processed_texts: &[String],
        threshold: f64,
    ) -> Vec<CategoryAssignment> {
        processed_texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let (mut category, confidence) = self.detect_by_keywords(text);
                if confidence < threshold {
                    category = UNCERTAIN.to_string();
                }
                CategoryAssignment {
                    index,
                    category,
                    confidence,
                }
            })
            .collect()
    }

    /// Run k-means and name each cluster.
    ///
    /// `n_clusters = None` picks k from the corpus size. With texts, a
    /// cluster is named after its keyword domain when that is confident
    /// enough, otherwise after its most frequent word.
    pub fn cluster_with_labels(
        &self,
        features: &[Vec<f64>],
        n_clusters: Option<usize>,
        processed_texts: Option<&[String]>,
    ) -> Result<LabeledClusters> {
        let k = match n_clusters {
            Some(k) => k,
            None => {
                let k = auto_cluster_count(features.len());
                info!("Clusters detected automatically: {}", k);
                k
            }
        };

        let clustering = train_clustering(features, k, &self.clustering)?;

        let Some(texts) = processed_texts else {
            return Ok(LabeledClusters {
                labels: (1..=k).map(|i| format!("Group {}", i)).collect(),
                keywords: vec![Vec::new(); k],
                clustering,
            });
        };

        if texts.len() != features.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: features.len(),
                actual: texts.len(),
            });
        }

        let mut labels = Vec::with_capacity(k);
        let mut keywords = Vec::with_capacity(k);
        for cluster_id in 0..k {
            let joined = clustering
                .members(cluster_id)
                .into_iter()
                .map(|i| texts[i].as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let top = most_common_words(&joined, self.config.top_keywords);
            let (category, confidence) = self.detect_by_keywords(&joined);

            let label = if confidence > self.config.cluster_label_threshold {
                category
            } else if let Some(word) = top.first() {
                format!("Topic: {}", title_case(word))
            } else {
                format!("Group {}", cluster_id + 1)
            };

            labels.push(label);
            keywords.push(top);
        }

        Ok(LabeledClusters {
            clustering,
            labels,
            keywords,
        })
    }

    /// Fill `auto_category` and `category_confidence` on every document
    /// from its processed text (raw text when not yet processed)
    pub fn analyze_and_categorize(&self, dataset: &mut Dataset) -> Vec<CategorySummary> {
        info!("Analyzing documents by keywords");

        let texts: Vec<String> = dataset
            .iter()
            .map(|d| d.processed_text.clone().unwrap_or_else(|| d.text.clone()))
            .collect();
        let assignments = self.categorize_documents(&texts, self.config.confidence_threshold);

        for (doc, assignment) in dataset.documents_mut().iter_mut().zip(assignments) {
            doc.auto_category = Some(assignment.category);
            doc.category_confidence = Some(assignment.confidence);
        }

        let summary = summarize(dataset);
        info!(
            "Categorization complete: {} documents, {} categories",
            dataset.len(),
            summary.len()
        );
        for s in &summary {
            info!(
                "  {}: {} docs (mean confidence: {:.2})",
                s.category, s.count, s.mean_confidence
            );
        }
        summary
    }
}

impl Default for AutoCategorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of clusters used when none is requested
pub fn auto_cluster_count(n_documents: usize) -> usize {
    if n_documents < 6 {
        2
    } else if n_documents < 15 {
        3
    } else {
        (n_documents / 5).min(5)
    }
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Top `n` words by count; equal counts keep first-appearance order
fn most_common_words(text: &str, n: usize) -> Vec<String> {
    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for word in text.split_whitespace() {
        match index.get(word) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(word, order.len());
                order.push((word, 1));
            }
        }
    }
    // stable sort keeps first appearance for ties
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order.into_iter().take(n).map(|(w, _)| w.to_string()).collect()
}

/// Count and mean confidence per auto category, largest first
fn summarize(dataset: &Dataset) -> Vec<CategorySummary> {
    let mut groups: Vec<(String, usize, f64)> = Vec::new();
    for doc in dataset.iter() {
        let Some(category) = &doc.auto_category else {
            continue;
        };
        let confidence = doc.category_confidence.unwrap_or(0.0);
        match groups.iter_mut().find(|(c, _, _)| c == category) {
            Some(group) => {
                group.1 += 1;
                group.2 += confidence;
            }
            None => groups.push((category.clone(), 1, confidence)),
        }
    }
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    groups
        .into_iter()
        .map(|(category, count, sum)| CategorySummary {
            category,
            count,
            mean_confidence: sum / count as f64,
        })
        .collect()
}
