use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","if","in","into","is","it",
            "no","not","of","on","or","such","that","the","their","then","there","these",
            "they","this","to","was","will","with",
        ];
        words.iter().copied().collect()
    };
}

/// Turns text into the normalized terms an index stores and queries with.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Drop English stopwords and single-character tokens.
    pub remove_stopwords: bool,
    /// Reduce tokens to their English stem.
    pub stem: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self { remove_stopwords: true, stem: false }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    options: AnalyzerOptions,
}

impl Analyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self { options }
    }
}

fn is_stopword(token: &str) -> bool {
    token.chars().count() < 2 || STOPWORDS.contains(token)
}

impl Tokenizer for Analyzer {
    /// NFKC-normalize, lowercase, split on anything that is not a letter or digit,
    /// then apply the optional stopword and stemming passes.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if self.options.remove_stopwords && is_stopword(token) { continue; }
            if self.options.stem {
                tokens.push(STEMMER.stem(token).into_owned());
            } else {
                tokens.push(token.to_string());
            }
        }
        tokens
    }
}

/// Tokenize with the default analyzer.
pub fn tokenize(text: &str) -> Vec<String> {
    Analyzer::default().tokenize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation() {
        let t = tokenize("Manhattan-sized iceberg, Canada's shelf");
        assert_eq!(t, vec!["manhattan", "sized", "iceberg", "canada", "shelf"]);
    }

    #[test]
    fn keeps_stopwords_when_disabled() {
        let analyzer = Analyzer::new(AnalyzerOptions { remove_stopwords: false, stem: false });
        assert_eq!(analyzer.tokenize("The cat"), vec!["the", "cat"]);
    }

    #[test]
    fn stems_when_enabled() {
        let analyzer = Analyzer::new(AnalyzerOptions { remove_stopwords: true, stem: true });
        let t = analyzer.tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }
}
