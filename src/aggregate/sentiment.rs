// Sentiment aggregation: polarity counts and ratios over a record set.
//
// Each non-empty record is sent to the external classifier (truncated to the
// model's input cap). Calls fan out with bounded concurrency but results are
// reduced in original record order, so the report never depends on how many
// calls ran at once. A failed or timed-out call only drops that record.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::output::truncate_chars;
use crate::records::Record;
use crate::sentiment::{Polarity, SentimentClassifier, SentimentResult};

/// Why the external classifier produced no verdict for a record.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierFailure {
    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),
    #[error("classifier failed: {0}")]
    Model(String),
}

/// A per-record failure, reported to the caller as a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// Index of the record in the input sequence
    pub index: usize,
    /// Short preview of the record's content
    pub preview: String,
    pub reason: ClassifierFailure,
}

/// Sentiment verdict for one record, keyed by its content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentVerdict {
    pub content: String,
    pub polarity: Polarity,
    pub confidence: f64,
}

/// Counts and ratios per polarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Always has both labels.
    pub label_counts: BTreeMap<Polarity, usize>,
    /// Share of scored records per label. Empty when nothing was scored.
    pub label_ratios: BTreeMap<Polarity, f64>,
    /// Records with a verdict (the ratio denominator)
    pub scored: usize,
    /// Records skipped because their content was blank
    pub skipped_empty: usize,
    /// Records whose classification failed or timed out
    pub failed: usize,
}

impl SentimentSummary {
    fn from_verdicts(verdicts: &[SentimentVerdict], skipped_empty: usize, failed: usize) -> Self {
        let mut label_counts: BTreeMap<Polarity, usize> =
            Polarity::ALL.iter().map(|p| (*p, 0)).collect();
        for verdict in verdicts {
            *label_counts.entry(verdict.polarity).or_insert(0) += 1;
        }

        let scored = verdicts.len();
        let label_ratios = if scored > 0 {
            label_counts
                .iter()
                .map(|(p, count)| (*p, *count as f64 / scored as f64))
                .collect()
        } else {
            BTreeMap::new()
        };

        Self {
            label_counts,
            label_ratios,
            scored,
            skipped_empty,
            failed,
        }
    }

    /// Ratio for one label, 0.0 when nothing was scored.
    pub fn ratio(&self, polarity: Polarity) -> f64 {
        self.label_ratios.get(&polarity).copied().unwrap_or(0.0)
    }
}

/// Full output of a sentiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub summary: SentimentSummary,
    /// Verdicts in input order
    pub verdicts: Vec<SentimentVerdict>,
    /// Failures in input order
    pub failures: Vec<RecordFailure>,
}

/// Knobs for a sentiment run.
#[derive(Debug, Clone)]
pub struct SentimentOptions {
    /// Maximum classifier calls in flight
    pub concurrency: usize,
    /// Per-record timeout for the classifier call
    pub timeout: Duration,
    /// Draw a progress bar on the terminal
    pub show_progress: bool,
}

impl Default for SentimentOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout: Duration::from_secs(30),
            show_progress: false,
        }
    }
}

/// Truncate a text to the model's input cap, by characters.
pub fn truncate_input(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Classify every record and tally the results.
pub async fn aggregate_sentiment(
    classifier: &dyn SentimentClassifier,
    records: &[Record],
    options: &SentimentOptions,
) -> SentimentReport {
    let max_chars = classifier.max_input_chars();
    let timeout = options.timeout;

    let candidates: Vec<(usize, &Record)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.content.trim().is_empty())
        .collect();
    let skipped_empty = records.len() - candidates.len();

    let pb = if options.show_progress {
        let pb = ProgressBar::new(candidates.len() as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("  Sentiment [{bar:30}] {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let outcomes: Vec<(usize, Result<SentimentResult, ClassifierFailure>)> =
        stream::iter(candidates.into_iter().map(|(index, record)| {
            let pb = &pb;
            async move {
                let input = truncate_input(record.content.trim(), max_chars);
                let outcome = match tokio::time::timeout(timeout, classifier.classify(&input)).await
                {
                    Ok(Ok(result)) => Ok(result),
                    Ok(Err(e)) => Err(ClassifierFailure::Model(format!("{e:#}"))),
                    Err(_) => Err(ClassifierFailure::Timeout(timeout)),
                };
                pb.inc(1);
                (index, outcome)
            }
        }))
        .buffered(options.concurrency.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    let mut verdicts = Vec::new();
    let mut failures = Vec::new();
    for (index, outcome) in outcomes {
        let content = &records[index].content;
        match outcome {
            Ok(result) => verdicts.push(SentimentVerdict {
                content: content.clone(),
                polarity: result.polarity,
                confidence: result.confidence,
            }),
            Err(reason) => {
                let preview = truncate_chars(content, 30);
                warn!(index, preview = %preview, error = %reason, "Sentiment classification failed, skipping record");
                failures.push(RecordFailure {
                    index,
                    preview,
                    reason,
                });
            }
        }
    }

    let summary = SentimentSummary::from_verdicts(&verdicts, skipped_empty, failures.len());
    info!(
        scored = summary.scored,
        positive = summary.label_counts[&Polarity::Positive],
        negative = summary.label_counts[&Polarity::Negative],
        failed = summary.failed,
        "Aggregated sentiment"
    );

    SentimentReport {
        summary,
        verdicts,
        failures,
    }
}

/// One movie's position on the cross-movie sentiment spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumEntry {
    pub movie: String,
    /// Positive share in percent
    pub positive_pct: f64,
    /// Negative share in percent
    pub negative_pct: f64,
    pub scored: usize,
}

/// Order movies from most to least positive. Movies with no scored records
/// are left out; ties keep input order.
pub fn spectrum(per_movie: &[(String, SentimentSummary)]) -> Vec<SpectrumEntry> {
    let mut entries: Vec<SpectrumEntry> = per_movie
        .iter()
        .filter(|(_, s)| s.scored > 0)
        .map(|(movie, s)| SpectrumEntry {
            movie: movie.clone(),
            positive_pct: s.ratio(Polarity::Positive) * 100.0,
            negative_pct: s.ratio(Polarity::Negative) * 100.0,
            scored: s.scored,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.positive_pct
            .partial_cmp(&a.positive_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_input_by_chars() {
        let text = "母".repeat(200);
        let truncated = truncate_input(&text, 128);
        assert_eq!(truncated.chars().count(), 128);
        assert_eq!(truncate_input("短", 128), "短");
    }

    #[test]
    fn test_summary_without_verdicts_has_no_ratios() {
        let summary = SentimentSummary::from_verdicts(&[], 2, 1);
        assert!(summary.label_ratios.is_empty());
        assert_eq!(summary.label_counts[&Polarity::Positive], 0);
        assert_eq!(summary.ratio(Polarity::Negative), 0.0);
        assert_eq!(summary.skipped_empty, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_spectrum_sorted_by_positive_share() {
        let summary = |pos: usize, neg: usize| {
            let verdicts: Vec<SentimentVerdict> = (0..pos)
                .map(|_| Polarity::Positive)
                .chain((0..neg).map(|_| Polarity::Negative))
                .map(|polarity| SentimentVerdict {
                    content: String::new(),
                    polarity,
                    confidence: 1.0,
                })
                .collect();
            SentimentSummary::from_verdicts(&verdicts, 0, 0)
        };
        let entries = spectrum(&[
            ("A".to_string(), summary(1, 3)),
            ("B".to_string(), summary(3, 1)),
            ("C".to_string(), summary(0, 0)),
        ]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].movie, "B");
        assert!((entries[0].positive_pct - 75.0).abs() < 1e-9);
        assert!((entries[1].negative_pct - 75.0).abs() < 1e-9);
    }
}
