//! # Rust Text Topics
//!
//! Library for sorting short text documents into topics: fetch articles,
//! clean and vectorize them, then classify, cluster or categorize them by
//! keyword dictionaries.
//!
//! ## Modules
//!
//! - `scraping` - Article fetching and HTML text extraction
//! - `nlp` - Preprocessing and TF-IDF vectorization
//! - `classification` - Multinomial Naive Bayes with evaluation metrics
//! - `clustering` - K-means and silhouette score
//! - `categorize` - Keyword-based automatic categorization
//! - `data` - Datasets and CSV / JSON export
//! - `report` - Terminal rendering of results
//! - `models` - Shared data types
//!
//! ## Example
//!
//! ```rust
//! use rust_text_topics::{Dataset, TextPreprocessor, TfIdf, Vectorizer};
//!
//! let mut dataset = Dataset::demo();
//! dataset.preprocess(&TextPreprocessor::new());
//!
//! let mut tfidf = TfIdf::new().with_min_df(2).with_max_df(0.8);
//! let dtm = tfidf.fit_transform(&dataset.processed_texts()).unwrap();
//! assert_eq!(dtm.n_documents(), 15);
//! ```

pub mod categorize;
pub mod classification;
pub mod clustering;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod nlp;
pub mod report;
pub mod scraping;

pub use categorize::AutoCategorizer;
pub use classification::{ModelBundle, MultinomialNb, Prediction, TextClassifier};
pub use clustering::{silhouette_score, train_clustering, KMeans};
pub use config::PipelineConfig;
pub use data::{DataLoader, Dataset};
pub use error::{PipelineError, Result};
pub use models::{Document, DocumentTermMatrix, Language};
pub use nlp::{TextPreprocessor, TfIdf, Vectorizer};
pub use scraping::WebScraper;
