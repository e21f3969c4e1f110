//! Supervised text classification
//!
//! Includes:
//! - Multinomial Naive Bayes over TF-IDF features
//! - Seeded (optionally stratified) train/test splitting
//! - Evaluation: accuracy, per-class report, confusion matrix
//! - A trainer that wires these together, and a persistable model bundle

mod metrics;
mod naive_bayes;
mod split;
mod trainer;

pub use metrics::{accuracy_score, classification_report, confusion_matrix};
pub use naive_bayes::MultinomialNb;
pub use split::{stratified_split, train_test_split, TrainTestSplit};
pub use trainer::{ModelBundle, Prediction, TextClassifier};
