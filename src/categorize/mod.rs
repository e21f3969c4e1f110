//! Automatic categorization: keyword dictionaries plus labelled clustering

mod categorizer;
mod domains;

pub use categorizer::{
    auto_cluster_count, title_case, AutoCategorizer, CategoryAssignment, CategorySummary,
    LabeledClusters, UNCERTAIN, UNCLASSIFIED,
};
pub use domains::{default_domains, DEFAULT_DOMAINS};
