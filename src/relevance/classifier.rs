// Relevance classifier: short-circuit evaluation of the rule cascade.
//
// Rules are tried in order and the first match wins. The later rules are
// looser than the earlier ones, so a record that already matched a strong
// rule never reaches the broad genre rule, and no rule runs twice.

use std::collections::BTreeMap;

use tracing::info;

use super::lexicon::TopicLexicon;
use super::rules::{Rule, RuleKind};
use crate::records::{Record, Source};

/// Records that passed the classifier, in discovery order.
///
/// Relevance is boolean, so no per-record score is kept. The rule hit
/// counts are aggregate diagnostics only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedSet {
    pub records: Vec<Record>,
    /// How many records each rule admitted (first match only).
    pub rule_hits: BTreeMap<RuleKind, usize>,
}

impl ClassifiedSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of admitted records per source.
    pub fn per_source(&self) -> BTreeMap<Source, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.source).or_insert(0) += 1;
        }
        counts
    }
}

/// Pure, stateless relevance classifier over an ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceClassifier {
    rules: Vec<Rule>,
}

impl RelevanceClassifier {
    /// Build the standard four-tier cascade from a lexicon.
    pub fn new(lexicon: &TopicLexicon) -> Self {
        Self {
            rules: Rule::cascade(lexicon),
        }
    }

    /// Build a classifier from an arbitrary ordered rule list.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The first rule that matches `content`, if any.
    pub fn explain(&self, content: &str) -> Option<RuleKind> {
        self.rules
            .iter()
            .find(|rule| rule.matches(content))
            .map(Rule::kind)
    }

    pub fn is_relevant(&self, content: &str) -> bool {
        self.explain(content).is_some()
    }

    /// Keep the relevant records, preserving their order.
    pub fn classify_all(&self, records: &[Record]) -> ClassifiedSet {
        let mut set = ClassifiedSet::default();
        for record in records {
            if let Some(kind) = self.explain(&record.content) {
                *set.rule_hits.entry(kind).or_insert(0) += 1;
                set.records.push(record.clone());
            }
        }

        info!(
            input = records.len(),
            relevant = set.len(),
            direct = set.rule_hits.get(&RuleKind::DirectHit).copied().unwrap_or(0),
            co_occurrence = set.rule_hits.get(&RuleKind::CoOccurrence).copied().unwrap_or(0),
            pronoun = set.rule_hits.get(&RuleKind::PronounAnchored).copied().unwrap_or(0),
            genre = set.rule_hits.get(&RuleKind::GenreAnchored).copied().unwrap_or(0),
            "Classified records for relevance"
        );
        set
    }
}

impl Default for RelevanceClassifier {
    fn default() -> Self {
        Self::new(&TopicLexicon::mother_daughter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_wins() {
        let classifier = RelevanceClassifier::default();
        // Matches direct (母女) and genre (亲情戏 + 母): direct is reported.
        assert_eq!(
            classifier.explain("亲情戏里的母女关系"),
            Some(RuleKind::DirectHit)
        );
        assert_eq!(
            classifier.explain("她和妈妈一起生活"),
            Some(RuleKind::PronounAnchored)
        );
        assert_eq!(classifier.explain("这部电影的特效很棒"), None);
    }

    #[test]
    fn test_empty_rule_list_admits_nothing() {
        let classifier = RelevanceClassifier::from_rules(Vec::new());
        assert!(!classifier.is_relevant("母女"));
    }

    #[test]
    fn test_classify_all_preserves_order_and_counts() {
        let classifier = RelevanceClassifier::default();
        let records: Vec<Record> = ["母女俩", "特效很棒", "她妈真好", "妈妈和闺女"]
            .iter()
            .filter_map(|c| Record::new(c, Source::SocialComment))
            .collect();
        let set = classifier.classify_all(&records);
        let contents: Vec<&str> = set.records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["母女俩", "她妈真好", "妈妈和闺女"]);
        assert_eq!(set.rule_hits[&RuleKind::DirectHit], 1);
        assert_eq!(set.rule_hits[&RuleKind::CoOccurrence], 1);
        assert_eq!(set.rule_hits[&RuleKind::PronounAnchored], 1);
        assert_eq!(set.per_source()[&Source::SocialComment], 3);
    }
}
