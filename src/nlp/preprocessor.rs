//! Text preprocessing
//!
//! Turns raw text into a space-separated string of stemmed content words:
//! clean → tokenize → remove stop words → stem.

use crate::config::PreprocessingConfig;
use crate::models::Language;
use crate::nlp::stopwords::stop_words;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+|www\S+").unwrap());
static DIGITS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static NON_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Preprocessor for a single language
#[derive(Debug, Clone)]
pub struct TextPreprocessor {
    language: Language,
    stop_words: HashSet<String>,
    /// Tokens of this many characters or fewer are dropped
    max_short_token_len: usize,
    stemming: bool,
}

impl TextPreprocessor {
    /// Spanish preprocessor with default settings
    pub fn new() -> Self {
        Self::for_language(Language::Spanish)
    }

    pub fn for_language(language: Language) -> Self {
        Self {
            language,
            stop_words: stop_words(language),
            max_short_token_len: 2,
            stemming: true,
        }
    }

    pub fn from_config(config: &PreprocessingConfig) -> Self {
        Self::for_language(config.language)
            .with_max_short_token_len(config.max_short_token_len)
            .with_stemming(config.stemming)
    }

    pub fn with_max_short_token_len(mut self, len: usize) -> Self {
        self.max_short_token_len = len;
        self
    }

    pub fn with_stemming(mut self, stemming: bool) -> Self {
        self.stemming = stemming;
        self
    }

    /// Add custom stop words
    pub fn add_stop_words(&mut self, words: &[&str]) {
        for word in words {
            self.stop_words.insert(word.to_lowercase());
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Settings needed to rebuild this preprocessor
    pub fn config(&self) -> PreprocessingConfig {
        PreprocessingConfig {
            language: self.language,
            max_short_token_len: self.max_short_token_len,
            stemming: self.stemming,
        }
    }

    /// Lowercase and strip URLs, numbers and punctuation
    pub fn clean(&self, text: &str) -> String {
        let text = text.to_lowercase();
        let text = URL_REGEX.replace_all(&text, "");
        let text = DIGITS_REGEX.replace_all(&text, "");
        let text = NON_WORD_REGEX.replace_all(&text, " ");
        let text = WHITESPACE_REGEX.replace_all(&text, " ");
        text.trim().to_string()
    }

    /// Split text into words
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(|w| w.to_string()).collect()
    }

    /// Drop stop words and very short tokens
    pub fn remove_stopwords(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| {
                !self.stop_words.contains(t) && t.chars().count() > self.max_short_token_len
            })
            .collect()
    }

    /// Reduce tokens to their stems
    pub fn stem(&self, tokens: Vec<String>) -> Vec<String> {
        if !self.stemming {
            return tokens;
        }

        let algorithm = match self.language {
            Language::Spanish => Algorithm::Spanish,
            Language::English => Algorithm::English,
        };
        let stemmer = Stemmer::create(algorithm);

        tokens
            .iter()
            .map(|t| stemmer.stem(t).into_owned())
            .collect()
    }

    /// Full pipeline, returning space-joined tokens
    pub fn process(&self, text: &str) -> String {
        self.process_tokens(text).join(" ")
    }

    /// Full pipeline, returning the tokens
    pub fn process_tokens(&self, text: &str) -> Vec<String> {
        let cleaned = self.clean(text);
        let tokens = self.tokenize(&cleaned);
        let tokens = self.remove_stopwords(tokens);
        self.stem(tokens)
    }

    pub fn process_batch(&self, texts: &[String]) -> Vec<String> {
        texts.iter().map(|t| self.process(t)).collect()
    }
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_urls_numbers_and_punctuation() {
        let prep = TextPreprocessor::new();
        let cleaned = prep.clean("Visita https://ejemplo.com en 2024, ¡es GENIAL!");
        assert_eq!(cleaned, "visita en es genial");
    }

    #[test]
    fn test_clean_keeps_accents() {
        let prep = TextPreprocessor::new();
        assert_eq!(prep.clean("Física   Cuántica"), "física cuántica");
    }

    #[test]
    fn test_remove_stopwords_and_short_tokens() {
        let prep = TextPreprocessor::new();
        let tokens = prep.tokenize("la inteligencia artificial es un campo de la ia");
        let filtered = prep.remove_stopwords(tokens);
        assert_eq!(filtered, vec!["inteligencia", "artificial", "campo"]);
    }

    #[test]
    fn test_stemming_shortens_inflected_words() {
        let prep = TextPreprocessor::new();
        let stems = prep.stem(vec!["algoritmos".to_string()]);
        assert!(stems[0].len() < "algoritmos".len());
        assert!("algoritmos".starts_with(&stems[0]));
    }

    #[test]
    fn test_stemming_disabled() {
        let prep = TextPreprocessor::new().with_stemming(false);
        let out = prep.process("Los algoritmos aprenden");
        assert_eq!(out, "algoritmos aprenden");
    }

    #[test]
    fn test_process_empty() {
        let prep = TextPreprocessor::new();
        assert_eq!(prep.process(""), "");
        assert_eq!(prep.process("de la 123 !!"), "");
    }

    #[test]
    fn test_english_pipeline() {
        let prep = TextPreprocessor::for_language(Language::English).with_stemming(false);
        assert_eq!(prep.process("The players won the match"), "players won match");
    }
}
