// Lexical frequency engine: per-document keywords to corpus-level counts.
//
// Each classified record contributes its top keywords. The pooled keywords go
// through the word-cloud layout, and each term's share of the vocabulary is
// scaled by the corpus token count into an estimated absolute count. Shares
// sum to at most 1, so the estimates never sum past the token total.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use super::layout::{FrequencyLayout, TermWeight};
use super::stopwords::StopWords;
use super::traits::KeywordExtractor;
use crate::records::Record;

/// Keywords extracted per document.
pub const DEFAULT_TOP_K: usize = 20;

/// Rows in the keyword tally.
pub const DEFAULT_TALLY_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermFrequencyRow {
    pub term: String,
    pub normalized_weight: f64,
    pub estimated_count: u64,
    pub proportion: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TermFrequencyTable {
    pub rows: Vec<TermFrequencyRow>,
    pub total_token_estimate: u64,
}

impl TermFrequencyTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A keyword and how many documents' keyword lists it appeared in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

pub struct FrequencyEngine {
    extractor: Box<dyn KeywordExtractor>,
    stop_words: StopWords,
    layout: FrequencyLayout,
    top_k: usize,
}

impl FrequencyEngine {
    pub fn new(
        extractor: Box<dyn KeywordExtractor>,
        stop_words: StopWords,
        layout: FrequencyLayout,
    ) -> Self {
        Self {
            extractor,
            stop_words,
            layout,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Per-document keyword lists, in record order.
    fn document_keywords<'a>(
        &'a self,
        records: &'a [Record],
    ) -> impl Iterator<Item = Vec<String>> + 'a {
        records
            .iter()
            .map(|r| self.extractor.extract(&r.content, self.top_k, &self.stop_words))
    }

    /// Build the frequency table for a set of classified records.
    pub fn build(&self, records: &[Record]) -> TermFrequencyTable {
        let total: u64 = records.iter().map(|r| r.token_count() as u64).sum();

        let documents: Vec<String> = self
            .document_keywords(records)
            .map(|keywords| keywords.join(" "))
            .filter(|doc| !doc.is_empty() && !self.stop_words.contains(doc))
            .collect();
        let corpus = documents.join(" ");

        if total == 0 || corpus.trim().is_empty() {
            debug!(records = records.len(), total, "Empty corpus, no frequency table");
            return TermFrequencyTable {
                rows: Vec::new(),
                total_token_estimate: total,
            };
        }

        let weights = self.layout.layout(&corpus, &self.stop_words);
        let table = estimate_counts(weights, total);
        info!(
            documents = documents.len(),
            terms = table.rows.len(),
            total_tokens = total,
            "Built term frequency table"
        );
        table
    }

    /// Exact keyword counts across documents, top `top_n`.
    ///
    /// Ordered by descending count, ties by first occurrence.
    pub fn keyword_tally(&self, records: &[Record], top_n: usize) -> Vec<KeywordCount> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, u64> = HashMap::new();

        for keywords in self.document_keywords(records) {
            for keyword in keywords {
                if let Some(n) = counts.get_mut(&keyword) {
                    *n += 1;
                } else {
                    counts.insert(keyword.clone(), 1);
                    order.push(keyword);
                }
            }
        }

        let mut tally: Vec<KeywordCount> = order
            .into_iter()
            .map(|keyword| {
                let count = counts.get(&keyword).copied().unwrap_or(0);
                KeywordCount { keyword, count }
            })
            .collect();
        tally.sort_by(|a, b| b.count.cmp(&a.count));
        tally.truncate(top_n);
        tally
    }
}

/// Scale layout weights into estimated counts against a token total.
pub fn estimate_counts(weights: Vec<TermWeight>, total: u64) -> TermFrequencyTable {
    if total == 0 {
        return TermFrequencyTable::default();
    }

    let mut rows: Vec<TermFrequencyRow> = weights
        .into_iter()
        .map(|tw| {
            let estimated_count = (tw.weight * total as f64).floor() as u64;
            TermFrequencyRow {
                term: tw.term,
                normalized_weight: tw.weight,
                estimated_count,
                proportion: estimated_count as f64 / total as f64,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.estimated_count.cmp(&a.estimated_count));

    TermFrequencyTable {
        rows,
        total_token_estimate: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Source;

    /// Splits on whitespace and returns the first `top_k` distinct tokens.
    struct WhitespaceFake;

    impl KeywordExtractor for WhitespaceFake {
        fn extract(&self, text: &str, top_k: usize, stop_words: &StopWords) -> Vec<String> {
            let mut out: Vec<String> = Vec::new();
            for tok in text.split_whitespace() {
                if stop_words.contains(tok) || out.iter().any(|t| t == tok) {
                    continue;
                }
                out.push(tok.to_string());
                if out.len() == top_k {
                    break;
                }
            }
            out
        }
    }

    fn engine(stop: StopWords) -> FrequencyEngine {
        FrequencyEngine::new(Box::new(WhitespaceFake), stop, FrequencyLayout::new(250))
    }

    fn record(text: &str) -> Record {
        Record::new(text, Source::ShortReview).unwrap()
    }

    #[test]
    fn test_estimated_counts_scale_with_total() {
        let records = vec![record("母亲 女儿"), record("母亲 和解")];
        let table = engine(StopWords::empty()).build(&records);
        assert_eq!(table.total_token_estimate, 4);
        assert_eq!(table.rows[0].term, "母亲");
        assert_eq!(table.rows[0].estimated_count, 2);
        assert_eq!(table.rows[0].proportion, 0.5);
        assert_eq!(table.rows[1].estimated_count, 1);
        assert_eq!(table.rows[1].proportion, 0.25);

        let sum: u64 = table.rows.iter().map(|r| r.estimated_count).sum();
        assert_eq!(sum, table.total_token_estimate);
    }

    #[test]
    fn test_estimated_counts_never_exceed_total() {
        // Fewer tokens than keywords: every estimate floors down
        let weights: Vec<TermWeight> = ["母亲", "女儿", "和解"]
            .iter()
            .map(|t| TermWeight {
                term: t.to_string(),
                weight: 1.0 / 3.0,
            })
            .collect();
        let table = estimate_counts(weights, 2);
        let sum: u64 = table.rows.iter().map(|r| r.estimated_count).sum();
        assert!(sum <= 2);
        assert!(table.rows.iter().all(|r| r.estimated_count == 0));
    }

    #[test]
    fn test_empty_records_empty_table() {
        let table = engine(StopWords::empty()).build(&[]);
        assert!(table.is_empty());
        assert_eq!(table.total_token_estimate, 0);
    }

    #[test]
    fn test_all_stop_words_empty_table() {
        let records = vec![record("电影 好看")];
        let table = engine(StopWords::from_terms(["电影", "好看"])).build(&records);
        assert!(table.is_empty());
        assert_eq!(table.total_token_estimate, 2);
    }

    #[test]
    fn test_joined_document_matching_stop_word_dropped() {
        // The extractor has no stop words of its own, so the joined string
        // reaches the second filter.
        struct Fixed;
        impl KeywordExtractor for Fixed {
            fn extract(&self, text: &str, _: usize, _: &StopWords) -> Vec<String> {
                vec![text.to_string()]
            }
        }
        let stop = StopWords::from_terms(["一般般"]);
        let engine = FrequencyEngine::new(Box::new(Fixed), stop, FrequencyLayout::new(250));
        let table = engine.build(&[record("一般般"), record("母女")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].term, "母女");
    }

    #[test]
    fn test_keyword_tally_order() {
        let records = vec![record("女儿 母亲"), record("母亲 成长"), record("成长 女儿")];
        let tally = engine(StopWords::empty()).keyword_tally(&records, 30);
        let names: Vec<&str> = tally.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(names, vec!["女儿", "母亲", "成长"]);
        assert!(tally.iter().all(|k| k.count == 2));
    }

    #[test]
    fn test_keyword_tally_truncates() {
        let records = vec![record("一一 二二 三三"), record("三三")];
        let tally = engine(StopWords::empty()).keyword_tally(&records, 1);
        assert_eq!(tally, vec![KeywordCount { keyword: "三三".into(), count: 2 }]);
    }

    #[test]
    fn test_estimate_counts_zero_total() {
        let weights = vec![TermWeight {
            term: "母亲".into(),
            weight: 1.0,
        }];
        assert!(estimate_counts(weights, 0).is_empty());
    }
}
