// Keyword extractor trait: swap-ready abstraction.
//
// Lets the frequency engine work with any per-document keyword extractor:
// jieba TF-IDF for Chinese, sentence-level TF-IDF for whitespace-delimited
// languages, or a fixed fake in tests.

use super::stopwords::StopWords;

/// Trait for extracting the salient terms of one document.
pub trait KeywordExtractor: Send + Sync {
    /// Return up to `top_k` terms, most salient first, never including a
    /// term from `stop_words`.
    fn extract(&self, text: &str, top_k: usize, stop_words: &StopWords) -> Vec<String>;
}
