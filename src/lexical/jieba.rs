// Chinese keyword extraction: jieba segmentation + TF-IDF ranking.
//
// Uses the `jieba-rs` default dictionary and IDF table. jieba's own
// extractor already drops its built-in stop words and single-character
// tokens; the caller's stop words are filtered on top of that.

use jieba_rs::{Jieba, KeywordExtract, TfIdf};
use tracing::debug;

use super::stopwords::StopWords;
use super::traits::KeywordExtractor;

/// TF-IDF keyword extractor over jieba segmentation. The default.
pub struct JiebaExtractor {
    jieba: Jieba,
    tfidf: TfIdf,
}

impl JiebaExtractor {
    /// Load the default dictionary and IDF table. Takes a moment, so build
    /// one extractor and reuse it.
    pub fn new() -> Self {
        let jieba = Jieba::new();
        let tfidf = TfIdf::default();
        debug!("Initialized jieba dictionary and IDF table");
        Self { jieba, tfidf }
    }
}

impl Default for JiebaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor for JiebaExtractor {
    fn extract(&self, text: &str, top_k: usize, stop_words: &StopWords) -> Vec<String> {
        // Over-fetch by the stop-word count so filtering still leaves
        // `top_k` terms when enough candidates exist.
        let fetch = top_k.saturating_add(stop_words.len());
        self.tfidf
            .extract_keywords(&self.jieba, text, fetch, Vec::new())
            .into_iter()
            .map(|k| k.keyword)
            .filter(|k| !stop_words.contains(k))
            .take(top_k)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_bounded_keywords() {
        let extractor = JiebaExtractor::new();
        let text = "这部电影讲述了母亲和女儿之间复杂的感情，母亲的坚强和女儿的叛逆都让人印象深刻，\
                    导演用细腻的镜头展现了家庭生活的点点滴滴";
        let keywords = extractor.extract(text, 5, &StopWords::empty());
        assert!(!keywords.is_empty());
        assert!(keywords.len() <= 5);
    }

    #[test]
    fn test_stop_words_excluded() {
        let extractor = JiebaExtractor::new();
        let text = "母亲和女儿的故事，母亲和女儿的争吵，母亲和女儿的和解";
        let unfiltered = extractor.extract(text, 20, &StopWords::empty());
        assert!(!unfiltered.is_empty());

        let stop = StopWords::from_terms([unfiltered[0].clone()]);
        let filtered = extractor.extract(text, 20, &stop);
        assert!(!filtered.contains(&unfiltered[0]));
    }

    #[test]
    fn test_empty_text() {
        let extractor = JiebaExtractor::new();
        assert!(extractor.extract("", 20, &StopWords::empty()).is_empty());
    }
}
