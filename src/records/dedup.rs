// Cross-source deduplication.
//
// The same text frequently shows up in several exports (a short review
// reposted as a social comment, for instance). We keep exactly one record
// per distinct content: the first one seen in source-priority order.

use std::collections::HashSet;

use tracing::debug;

use super::models::{Record, Source};

/// Collapse records with identical `content`, keeping the first occurrence.
///
/// The output preserves first-occurrence order. Callers are expected to
/// pass records already in source-priority order; see [`merge_sources`].
pub fn dedup_first_occurrence(mut records: Vec<Record>) -> Vec<Record> {
    let before = records.len();
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.content.clone()));

    debug!(
        before,
        after = records.len(),
        "Deduplicated records by content"
    );
    records
}

/// Concatenate per-source batches in priority order, then deduplicate.
///
/// The sort is stable, so batches from the same source keep their relative
/// order and records within a batch are never reordered.
pub fn merge_sources(mut batches: Vec<(Source, Vec<Record>)>) -> Vec<Record> {
    batches.sort_by_key(|(source, _)| *source);
    let all: Vec<Record> = batches.into_iter().flat_map(|(_, records)| records).collect();
    dedup_first_occurrence(all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(content: &str, source: Source) -> Record {
        Record::new(content, source).unwrap()
    }

    #[test]
    fn test_keeps_first_and_order() {
        let input = vec![
            rec("a", Source::ShortReview),
            rec("b", Source::ShortReview),
            rec("a", Source::LongReview),
            rec("c", Source::SocialComment),
            rec("b", Source::SocialDescription),
        ];
        let out = dedup_first_occurrence(input);
        let contents: Vec<&str> = out.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
        assert_eq!(out[0].source, Source::ShortReview);
        assert_eq!(out[1].source, Source::ShortReview);
    }

    #[test]
    fn test_merge_sorts_batches_by_priority() {
        let batches = vec![
            (Source::SocialComment, vec![rec("好看", Source::SocialComment)]),
            (
                Source::ShortReview,
                vec![rec("好看", Source::ShortReview).with_rating("4")],
            ),
        ];
        let out = merge_sources(batches);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, Source::ShortReview);
        assert_eq!(out[0].rating.as_deref(), Some("4"));
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_first_occurrence(Vec::new()).is_empty());
    }
}
