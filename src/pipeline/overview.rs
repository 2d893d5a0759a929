// Cross-movie overview: one pooled vocabulary and a sentiment spectrum.
//
// Movies are analyzed independently (their own dedup and classification),
// then their records are pooled for a corpus-wide frequency table with a
// smaller vocabulary cap. When sentiment is enabled each movie is scored on
// its own so the spectrum can rank them.

use serde::Serialize;
use tracing::info;

use super::analysis::SentimentStage;
use crate::aggregate::sentiment::{aggregate_sentiment, spectrum, SentimentSummary, SpectrumEntry};
use crate::lexical::{FrequencyEngine, TermFrequencyTable};
use crate::records::Record;

/// One movie's contribution to the overview.
#[derive(Debug, Clone)]
pub struct MovieCorpus {
    pub movie: String,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovieTotals {
    pub movie: String,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub movies: Vec<MovieTotals>,
    pub pooled_records: usize,
    pub frequencies: TermFrequencyTable,
    /// Per-movie sentiment, in input order. Empty when sentiment is off.
    pub sentiment: Vec<(String, SentimentSummary)>,
    /// Movies ordered from most to least positive
    pub spectrum: Vec<SpectrumEntry>,
}

/// Build the overview. `engine` should carry the overview vocabulary cap.
pub async fn run_overview(
    corpora: &[MovieCorpus],
    engine: &FrequencyEngine,
    sentiment: Option<&SentimentStage<'_>>,
) -> Overview {
    let pooled: Vec<Record> = corpora
        .iter()
        .flat_map(|c| c.records.iter().cloned())
        .collect();
    let frequencies = engine.build(&pooled);

    let mut per_movie = Vec::new();
    if let Some(stage) = sentiment {
        for corpus in corpora {
            info!(movie = %corpus.movie, records = corpus.records.len(), "Scoring movie sentiment");
            let report = aggregate_sentiment(stage.classifier, &corpus.records, &stage.options).await;
            per_movie.push((corpus.movie.clone(), report.summary));
        }
    }

    let movies = corpora
        .iter()
        .map(|c| MovieTotals {
            movie: c.movie.clone(),
            records: c.records.len(),
        })
        .collect();

    info!(
        movies = corpora.len(),
        pooled = pooled.len(),
        terms = frequencies.len(),
        "Overview complete"
    );

    Overview {
        movies,
        pooled_records: pooled.len(),
        frequencies,
        spectrum: spectrum(&per_movie),
        sentiment: per_movie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::{FrequencyLayout, KeywordExtractor, StopWords};
    use crate::records::Source;

    struct Tokens;

    impl KeywordExtractor for Tokens {
        fn extract(&self, text: &str, top_k: usize, _: &StopWords) -> Vec<String> {
            text.split_whitespace().take(top_k).map(str::to_string).collect()
        }
    }

    fn corpus(movie: &str, texts: &[&str]) -> MovieCorpus {
        MovieCorpus {
            movie: movie.to_string(),
            records: texts
                .iter()
                .filter_map(|t| Record::new(t, Source::ShortReview))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_pools_records_across_movies() {
        let engine = FrequencyEngine::new(Box::new(Tokens), StopWords::empty(), FrequencyLayout::new(200));
        let corpora = vec![corpus("a", &["母亲 女儿"]), corpus("b", &["母亲 成长 和解"])];
        let overview = run_overview(&corpora, &engine, None).await;

        assert_eq!(overview.pooled_records, 2);
        assert_eq!(overview.frequencies.total_token_estimate, 5);
        assert_eq!(overview.frequencies.rows[0].term, "母亲");
        assert!(overview.spectrum.is_empty());
        assert_eq!(overview.movies[1].records, 1);
    }
}
