// Keyword extraction for whitespace-delimited languages.
//
// Uses the `keyword_extraction` crate's TF-IDF. A single review is too small
// a corpus on its own, so each sentence is treated as a separate document:
// words repeated in every sentence get downweighted, words concentrated in a
// few sentences get boosted.

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};

use super::stopwords::StopWords;
use super::traits::KeywordExtractor;

/// Sentence-level TF-IDF extractor for non-CJK text.
#[derive(Debug, Default, Clone, Copy)]
pub struct SentenceTfIdfExtractor;

impl KeywordExtractor for SentenceTfIdfExtractor {
    fn extract(&self, text: &str, top_k: usize, stop_words: &StopWords) -> Vec<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let stop_list = stop_words.to_vec();
        let params = TfIdfParams::UnprocessedDocuments(&sentences, &stop_list, None);
        let tfidf = TfIdf::new(params);

        tfidf
            .get_ranked_word_scores(top_k.saturating_add(stop_words.len()))
            .into_iter()
            .map(|(word, _score)| word)
            .filter(|w| !stop_words.contains(w))
            .take(top_k)
            .collect()
    }
}

/// Split text into non-empty sentences on terminal punctuation and newlines.
fn split_sentences(text: &str) -> Vec<String> {
    text.split(|c: char| matches!(c, '.' | '!' | '?' | ';' | '\n' | '。' | '！' | '？' | '；'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
