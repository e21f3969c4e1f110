//! Natural language processing
//!
//! Includes:
//! - Text cleaning, tokenization, stop word removal and stemming
//! - Vectorization (bag of words, TF-IDF with n-grams)

mod preprocessor;
mod stopwords;
mod vectorizer;

pub use preprocessor::TextPreprocessor;
pub use stopwords::stop_words;
pub use vectorizer::{BagOfWords, TfIdf, Vectorizer};
