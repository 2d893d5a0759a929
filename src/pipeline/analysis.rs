// Single-movie analysis: merge, classify, then aggregate.
//
// Every source batch is merged in priority order and deduplicated, the
// relevance cascade picks the records about the target relationship, and the
// three aggregators run over that classified set. Only the sentiment stage
// talks to anything outside the process, so it is optional.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::aggregate::ratings::{aggregate_ratings, RatingSummary};
use crate::aggregate::sentiment::{aggregate_sentiment, SentimentOptions, SentimentReport};
use crate::lexical::{FrequencyEngine, KeywordCount, TermFrequencyTable};
use crate::records::dedup::merge_sources;
use crate::records::{Record, Source};
use crate::relevance::{ClassifiedSet, RelevanceClassifier};
use crate::sentiment::SentimentClassifier;

/// The sentiment classifier and how to drive it.
pub struct SentimentStage<'a> {
    pub classifier: &'a dyn SentimentClassifier,
    pub options: SentimentOptions,
}

/// How many records each source contributed, before and after dedup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    pub loaded: BTreeMap<Source, usize>,
    pub unique: BTreeMap<Source, usize>,
    pub relevant: BTreeMap<Source, usize>,
}

/// Everything produced for one movie.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub movie: String,
    /// Deduplicated records from every source
    pub unique: Vec<Record>,
    pub relevant: ClassifiedSet,
    pub source_counts: SourceCounts,
    pub ratings: RatingSummary,
    pub frequencies: TermFrequencyTable,
    pub keywords: Vec<KeywordCount>,
    pub sentiment: Option<SentimentReport>,
}

pub struct Analyzer {
    classifier: RelevanceClassifier,
    engine: FrequencyEngine,
    tally_size: usize,
}

impl Analyzer {
    pub fn new(classifier: RelevanceClassifier, engine: FrequencyEngine, tally_size: usize) -> Self {
        Self {
            classifier,
            engine,
            tally_size,
        }
    }

    pub fn classifier(&self) -> &RelevanceClassifier {
        &self.classifier
    }

    pub fn engine(&self) -> &FrequencyEngine {
        &self.engine
    }

    /// Run the synchronous stages: merge, dedup, classify, ratings, lexical.
    pub fn analyze(&self, movie: &str, batches: Vec<(Source, Vec<Record>)>) -> Analysis {
        let mut source_counts = SourceCounts::default();
        for (source, records) in &batches {
            *source_counts.loaded.entry(*source).or_insert(0) += records.len();
        }

        let unique = merge_sources(batches);
        source_counts.unique = count_by_source(&unique);

        let relevant = self.classifier.classify_all(&unique);
        source_counts.relevant = relevant.per_source();

        let ratings = aggregate_ratings(&relevant.records);
        let frequencies = self.engine.build(&relevant.records);
        let keywords = self.engine.keyword_tally(&relevant.records, self.tally_size);

        info!(
            movie,
            unique = unique.len(),
            relevant = relevant.len(),
            rated = ratings.rated,
            terms = frequencies.len(),
            "Analysis complete"
        );

        Analysis {
            movie: movie.to_string(),
            unique,
            relevant,
            source_counts,
            ratings,
            frequencies,
            keywords,
            sentiment: None,
        }
    }

    /// Run every stage, including sentiment when a stage is supplied.
    pub async fn run(
        &self,
        movie: &str,
        batches: Vec<(Source, Vec<Record>)>,
        sentiment: Option<&SentimentStage<'_>>,
    ) -> Analysis {
        let mut analysis = self.analyze(movie, batches);
        if let Some(stage) = sentiment {
            let report =
                aggregate_sentiment(stage.classifier, &analysis.relevant.records, &stage.options)
                    .await;
            analysis.sentiment = Some(report);
        }
        analysis
    }
}

fn count_by_source(records: &[Record]) -> BTreeMap<Source, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.source).or_insert(0) += 1;
    }
    counts
}
