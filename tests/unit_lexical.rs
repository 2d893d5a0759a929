// Unit tests for the lexical frequency engine.
//
// Uses a deterministic whitespace extractor so counts are predictable, plus
// one run through jieba to check the invariants hold on real segmentation.

use reviewlens::lexical::jieba::JiebaExtractor;
use reviewlens::lexical::{FrequencyEngine, FrequencyLayout, KeywordExtractor, StopWords};
use reviewlens::records::{Record, Source};

/// First `top_k` distinct whitespace tokens that aren't stop words.
struct SplitExtractor;

impl KeywordExtractor for SplitExtractor {
    fn extract(&self, text: &str, top_k: usize, stop_words: &StopWords) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for tok in text.split_whitespace() {
            if !stop_words.contains(tok) && !out.iter().any(|t| t == tok) {
                out.push(tok.to_string());
            }
        }
        out.truncate(top_k);
        out
    }
}

fn engine(stop: StopWords, max_words: usize) -> FrequencyEngine {
    FrequencyEngine::new(Box::new(SplitExtractor), stop, FrequencyLayout::new(max_words))
}

fn records(texts: &[&str]) -> Vec<Record> {
    texts
        .iter()
        .filter_map(|t| Record::new(t, Source::ShortReview))
        .collect()
}

// ============================================================
// Empty and degenerate input
// ============================================================

#[test]
fn empty_input_gives_empty_table() {
    let table = engine(StopWords::empty(), 250).build(&[]);
    assert!(table.is_empty());
}

#[test]
fn stop_word_only_corpus_gives_empty_table() {
    let stop = StopWords::from_terms(["的", "了", "电影"]);
    let table = engine(stop, 250).build(&records(&["的 了", "电影 的"]));
    assert!(table.is_empty());
}

// ============================================================
// Estimation invariants
// ============================================================

#[test]
fn proportions_bounded_and_counts_within_total() {
    let table = engine(StopWords::empty(), 250).build(&records(&[
        "母亲 女儿 和解 成长",
        "母亲 女儿 争吵",
        "母亲 牺牲 沉默 女儿 离家",
        "一部 关于 母亲 的 电影",
    ]));
    assert!(!table.is_empty());
    for row in &table.rows {
        assert!((0.0..=1.0).contains(&row.proportion), "{row:?}");
        assert!((0.0..=1.0).contains(&row.normalized_weight), "{row:?}");
    }
    let estimated: u64 = table.rows.iter().map(|r| r.estimated_count).sum();
    assert!(estimated <= table.total_token_estimate, "{estimated} > {}", table.total_token_estimate);

    let weights: f64 = table.rows.iter().map(|r| r.normalized_weight).sum();
    assert!(weights <= 1.0 + 1e-9);
}

#[test]
fn counts_within_total_with_many_terms() {
    // Fourteen distinct keywords against fourteen tokens
    let table = engine(StopWords::empty(), 250).build(&records(&[
        "母亲 女儿 争吵",
        "和解 成长 沉默",
        "牺牲 离家 理解",
        "陪伴 原谅 亲情",
        "回忆 告别",
    ]));
    assert_eq!(table.len(), 14);
    let estimated: u64 = table.rows.iter().map(|r| r.estimated_count).sum();
    assert!(estimated <= table.total_token_estimate);
}

#[test]
fn rows_sorted_by_estimated_count() {
    let table = engine(StopWords::empty(), 250).build(&records(&[
        "成长 女儿",
        "母亲 女儿",
        "母亲 和解 女儿",
    ]));
    let counts: Vec<u64> = table.rows.iter().map(|r| r.estimated_count).collect();
    let mut sorted = counts.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(counts, sorted);
    assert_eq!(table.rows[0].term, "女儿");
}

#[test]
fn vocabulary_capped_at_max_words() {
    let table = engine(StopWords::empty(), 2).build(&records(&["甲甲 乙乙 丙丙 丁丁"]));
    assert_eq!(table.len(), 2);
}

#[test]
fn top_k_limits_per_document_keywords() {
    let engine = engine(StopWords::empty(), 250).with_top_k(1);
    let table = engine.build(&records(&["母亲 女儿", "成长 和解"]));
    let terms: Vec<&str> = table.rows.iter().map(|r| r.term.as_str()).collect();
    assert_eq!(terms, vec!["母亲", "成长"]);
}

// ============================================================
// Keyword tally
// ============================================================

#[test]
fn keyword_tally_counts_documents() {
    let tally = engine(StopWords::empty(), 250).keyword_tally(
        &records(&["母亲 女儿", "女儿 成长", "女儿 母亲"]),
        30,
    );
    assert_eq!(tally[0].keyword, "女儿");
    assert_eq!(tally[0].count, 3);
    assert_eq!(tally[1].keyword, "母亲");
    assert_eq!(tally[1].count, 2);
}

// ============================================================
// jieba
// ============================================================

#[test]
fn jieba_engine_invariants() {
    let engine = FrequencyEngine::new(
        Box::new(JiebaExtractor::new()),
        StopWords::empty(),
        FrequencyLayout::new(250),
    );
    let table = engine.build(&records(&[
        "母亲和女儿之间的争吵让人心疼",
        "女儿终于理解了母亲的沉默",
        "这部电影把母女关系拍得很真实",
    ]));
    for row in &table.rows {
        assert!((0.0..=1.0).contains(&row.proportion));
    }
    assert!(table.rows.iter().map(|r| r.estimated_count).sum::<u64>() <= table.total_token_estimate);
}
