// Word-cloud style frequency layout.
//
// Turns a space-joined keyword corpus into a ranked vocabulary of at most
// `max_words` terms. Each term is weighted by its share of the kept
// vocabulary's total count, so the weights never sum past 1.0. Two-word
// collocations are opt-in.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::stopwords::StopWords;

/// Vocabulary cap for a single movie's frequency table.
pub const PER_MOVIE_MAX_WORDS: usize = 250;

/// Vocabulary cap for the cross-movie overview.
pub const OVERVIEW_MAX_WORDS: usize = 200;

/// Likelihood-ratio score above which a word pair counts as a collocation.
pub const COLLOCATION_THRESHOLD: f64 = 30.0;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w[\w']+").expect("valid word regex"));

/// A term and its share of the laid-out vocabulary, in (0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct TermWeight {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FrequencyLayout {
    pub max_words: usize,
    /// Fold "cats" into "cat" when both appear
    pub normalize_plurals: bool,
    /// Promote strongly associated adjacent pairs ("ice cream") to terms
    pub collocations: bool,
}

impl Default for FrequencyLayout {
    fn default() -> Self {
        Self::new(PER_MOVIE_MAX_WORDS)
    }
}

/// One merged vocabulary entry: lowercase key, display spelling, count.
type Entry = (String, String, u64);

impl FrequencyLayout {
    pub fn new(max_words: usize) -> Self {
        Self {
            max_words,
            normalize_plurals: true,
            collocations: false,
        }
    }

    pub fn with_collocations(mut self, collocations: bool) -> Self {
        self.collocations = collocations;
        self
    }

    /// Raw counts per term, in first-occurrence order.
    ///
    /// Case variants are merged under their most common spelling (first seen
    /// wins a tie). With collocations on, accepted pairs come after the
    /// single words and take their count away from both halves.
    pub fn count_terms(&self, corpus: &str, stop_words: &StopWords) -> Vec<(String, u64)> {
        let words: Vec<&str> = WORD_RE
            .find_iter(corpus)
            .map(|m| strip_possessive(m.as_str()))
            .filter(|w| !w.chars().all(|c| c.is_numeric()))
            .collect();

        let unigrams: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| !stop_words.contains_ignore_case(w))
            .collect();
        let mut merged = merge_variants(
            unigrams.iter().map(|w| w.to_string()),
            self.normalize_plurals,
        );

        if self.collocations {
            // Adjacent in the unfiltered words; no stop word on either side
            let pairs = words
                .windows(2)
                .filter(|p| !p.iter().any(|w| stop_words.contains_ignore_case(w)))
                .map(|p| format!("{} {}", p[0], p[1]));
            let bigrams = merge_variants(pairs, self.normalize_plurals);
            add_collocations(&mut merged, &bigrams, unigrams.len() as u64);
        }

        merged
            .into_iter()
            .map(|(_, spelling, count)| (spelling, count))
            .collect()
    }

    /// Count, rank, cap and weight.
    ///
    /// Ordered by descending count with ties kept in first-occurrence order.
    pub fn layout(&self, corpus: &str, stop_words: &StopWords) -> Vec<TermWeight> {
        let mut counts = self.count_terms(corpus, stop_words);
        // sort_by is stable, so equal counts keep their first-occurrence order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(self.max_words);

        let sum: u64 = counts.iter().map(|(_, n)| n).sum();
        if sum == 0 {
            return Vec::new();
        }

        counts
            .into_iter()
            .map(|(term, n)| TermWeight {
                term,
                weight: n as f64 / sum as f64,
            })
            .collect()
    }
}

fn strip_possessive(word: &str) -> &str {
    if word.to_lowercase().ends_with("'s") {
        &word[..word.len() - 2]
    } else {
        word
    }
}

/// Merge case variants (and optionally plurals), keeping first-occurrence order.
fn merge_variants(tokens: impl Iterator<Item = String>, normalize_plurals: bool) -> Vec<Entry> {
    let mut order: Vec<String> = Vec::new();
    let mut casings: HashMap<String, Vec<(String, u64)>> = HashMap::new();
    for word in tokens {
        let key = word.to_lowercase();
        let variants = casings.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            Vec::new()
        });
        match variants.iter_mut().find(|(spelling, _)| *spelling == word) {
            Some((_, n)) => *n += 1,
            None => variants.push((word, 1)),
        }
    }

    let mut merged: Vec<Entry> = order
        .into_iter()
        .filter_map(|key| {
            let variants = casings.remove(&key)?;
            let total: u64 = variants.iter().map(|(_, n)| n).sum();
            let mut best = variants.first()?;
            for v in variants.iter().skip(1) {
                if v.1 > best.1 {
                    best = v;
                }
            }
            let spelling = best.0.clone();
            Some((key, spelling, total))
        })
        .collect();

    if normalize_plurals {
        fold_plurals(&mut merged);
    }
    merged
}

/// Merge a plural key into its singular when the singular was also seen.
fn fold_plurals(merged: &mut Vec<Entry>) {
    let index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, (key, _, _))| (key.clone(), i))
        .collect();

    let mut folded = vec![false; merged.len()];
    for i in 0..merged.len() {
        let key = &merged[i].0;
        if !key.ends_with('s') || key.ends_with("ss") {
            continue;
        }
        let singular = &key[..key.len() - 1];
        if let Some(&j) = index.get(singular) {
            let extra = merged[i].2;
            merged[j].2 += extra;
            folded[i] = true;
        }
    }

    let mut i = 0;
    merged.retain(|_| {
        let keep = !folded[i];
        i += 1;
        keep
    });
}

/// Position of a word's entry, following a plural that was folded away.
fn entry_index(index: &HashMap<String, usize>, key: &str) -> Option<usize> {
    index.get(key).copied().or_else(|| {
        key.strip_suffix('s')
            .filter(|_| !key.ends_with("ss"))
            .and_then(|singular| index.get(singular).copied())
    })
}

/// Promote bigrams that score above [`COLLOCATION_THRESHOLD`].
///
/// Scores use the counts from before any discounting. A word whose count
/// drops to zero leaves the vocabulary.
fn add_collocations(merged: &mut Vec<Entry>, bigrams: &[Entry], n_words: u64) {
    let index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, (key, _, _))| (key.clone(), i))
        .collect();
    let original: Vec<u64> = merged.iter().map(|(_, _, n)| *n).collect();

    let mut accepted = Vec::new();
    for (key, spelling, count) in bigrams {
        let Some((first, second)) = key.split_once(' ') else {
            continue;
        };
        let (Some(i), Some(j)) = (entry_index(&index, first), entry_index(&index, second)) else {
            continue;
        };
        let Some(score) = collocation_score(*count, original[i], original[j], n_words) else {
            continue;
        };
        if score > COLLOCATION_THRESHOLD {
            merged[i].2 = merged[i].2.saturating_sub(*count);
            merged[j].2 = merged[j].2.saturating_sub(*count);
            accepted.push((key.clone(), spelling.clone(), *count));
        }
    }

    merged.retain(|(_, _, n)| *n > 0);
    merged.extend(accepted);
}

/// Dunning log-likelihood ratio for a word pair.
///
/// `None` when the first word makes up the whole corpus and the score is
/// undefined.
fn collocation_score(pair: u64, first: u64, second: u64, n_words: u64) -> Option<f64> {
    if n_words <= first || first == 0 {
        return None;
    }
    fn ll(k: f64, n: f64, x: f64) -> f64 {
        k * x.max(1e-10).ln() + (n - k) * (1.0 - x).max(1e-10).ln()
    }

    let (c12, c1, c2, n) = (pair as f64, first as f64, second as f64, n_words as f64);
    let p = c2 / n;
    let p1 = c12 / c1;
    let p2 = (c2 - c12) / (n - c1);
    let score = ll(c12, c1, p) + ll(c2 - c12, n - c1, p)
        - ll(c12, c1, p1)
        - ll(c2 - c12, n - c1, p2);
    Some(-2.0 * score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(weights: &[TermWeight]) -> Vec<&str> {
        weights.iter().map(|w| w.term.as_str()).collect()
    }

    #[test]
    fn test_weights_are_shares_of_total() {
        let layout = FrequencyLayout::new(10);
        let out = layout.layout("母亲 母亲 母亲 女儿", &StopWords::empty());
        assert_eq!(terms(&out), vec!["母亲", "女儿"]);
        assert!((out[0].weight - 0.75).abs() < 1e-9);
        assert!((out[1].weight - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_weights_sum_to_one_after_cap() {
        let layout = FrequencyLayout::new(2);
        let out = layout.layout("一一 二二 二二 三三 三三 三三", &StopWords::empty());
        let sum: f64 = out.iter().map(|w| w.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((out[0].weight - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_occurrence() {
        let layout = FrequencyLayout::new(10);
        let out = layout.layout("女儿 母亲 成长 母亲 女儿 成长", &StopWords::empty());
        assert_eq!(terms(&out), vec!["女儿", "母亲", "成长"]);
    }

    #[test]
    fn test_single_chars_and_numbers_dropped() {
        let layout = FrequencyLayout::new(10);
        let out = layout.layout("好 2023 母亲 12", &StopWords::empty());
        assert_eq!(terms(&out), vec!["母亲"]);
    }

    #[test]
    fn test_stop_words_case_insensitive() {
        let layout = FrequencyLayout::new(10);
        let stop = StopWords::from_terms(["movie"]);
        let out = layout.layout("Movie mother MOVIE daughter", &stop);
        assert_eq!(terms(&out), vec!["mother", "daughter"]);
    }

    #[test]
    fn test_case_variants_merge_under_common_spelling() {
        let layout = FrequencyLayout::new(10);
        let out = layout.layout("mother Mother Mother daughter", &StopWords::empty());
        assert_eq!(out[0].term, "Mother");
        assert_eq!(out.len(), 2);
        assert!((out[1].weight - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_possessive_and_plurals() {
        let layout = FrequencyLayout::new(10);
        let out = layout.layout("mother's mothers mother class", &StopWords::empty());
        let counts = layout.count_terms("mother's mothers mother class", &StopWords::empty());
        assert_eq!(counts, vec![("mother".to_string(), 3), ("class".to_string(), 1)]);
        assert_eq!(out[0].term, "mother");
    }

    #[test]
    fn test_plural_folding_can_be_disabled() {
        let layout = FrequencyLayout {
            normalize_plurals: false,
            ..FrequencyLayout::new(10)
        };
        let counts = layout.count_terms("mothers mother", &StopWords::empty());
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_truncates_to_max_words() {
        let layout = FrequencyLayout::new(2);
        let out = layout.layout("一一 二二 二二 三三 三三 三三", &StopWords::empty());
        assert_eq!(terms(&out), vec!["三三", "二二"]);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(FrequencyLayout::default()
            .layout("", &StopWords::empty())
            .is_empty());
    }

    fn ice_cream_corpus() -> String {
        ["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"]
            .iter()
            .map(|filler| format!("ice cream {filler}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_collocations_off_by_default() {
        let counts = FrequencyLayout::new(50).count_terms(&ice_cream_corpus(), &StopWords::empty());
        assert!(counts.contains(&("ice".to_string(), 10)));
        assert!(!counts.iter().any(|(t, _)| t.contains(' ')));
    }

    #[test]
    fn test_collocations_replace_their_halves() {
        let layout = FrequencyLayout::new(50).with_collocations(true);
        let out = layout.layout(&ice_cream_corpus(), &StopWords::empty());
        assert_eq!(out[0].term, "ice cream");
        assert!(!out.iter().any(|w| w.term == "ice" || w.term == "cream"));
        // The pair plus ten one-off fillers
        assert_eq!(out.len(), 11);
        assert!((out[0].weight - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_pairs_with_stop_words_never_collocate() {
        let stop = StopWords::from_terms(["cream"]);
        let layout = FrequencyLayout::new(50).with_collocations(true);
        let counts = layout.count_terms(&ice_cream_corpus(), &stop);
        assert!(counts.contains(&("ice".to_string(), 10)));
        assert!(!counts.iter().any(|(t, _)| t.contains(' ')));
    }

    #[test]
    fn test_weak_pair_scores_low() {
        let score = collocation_score(1, 10, 1, 30).unwrap();
        assert!(score < COLLOCATION_THRESHOLD);
        let strong = collocation_score(10, 10, 10, 30).unwrap();
        assert!(strong > COLLOCATION_THRESHOLD);
        assert!(collocation_score(1, 5, 1, 5).is_none());
    }
}
