// File exports: JSON record dumps, CSV tables and a run summary.
//
// CSVs start with a UTF-8 BOM so spreadsheet tools detect the encoding of
// Chinese text correctly.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::aggregate::ratings::RatingSummary;
use crate::aggregate::sentiment::{SentimentReport, SentimentSummary, SpectrumEntry};
use crate::lexical::{KeywordCount, TermFrequencyTable};
use crate::pipeline::analysis::SourceCounts;
use crate::pipeline::{Analysis, Overview};
use crate::records::Record;
use crate::relevance::RuleKind;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const ALL_COMMENTS_FILE: &str = "all_comments.json";
pub const RELEVANT_COMMENTS_FILE: &str = "relevant_comments.json";
pub const WORD_FREQUENCIES_FILE: &str = "word_frequencies.csv";
pub const KEYWORDS_FILE: &str = "comment_keywords.csv";
pub const SENTIMENT_FILE: &str = "comment_sentiment.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const OVERVIEW_FREQUENCIES_FILE: &str = "overall_word_frequencies.csv";
pub const OVERVIEW_SUMMARY_FILE: &str = "overall_summary.json";

#[derive(Debug, Serialize)]
struct AnalysisSummary<'a> {
    movie: &'a str,
    generated_at: String,
    source_counts: &'a SourceCounts,
    rule_hits: &'a BTreeMap<RuleKind, usize>,
    ratings: &'a RatingSummary,
    sentiment: Option<&'a SentimentSummary>,
    distinct_terms: usize,
    total_token_estimate: u64,
    top_keywords: &'a [KeywordCount],
}

#[derive(Debug, Serialize)]
struct OverviewSummary<'a> {
    generated_at: String,
    #[serde(flatten)]
    overview: &'a Overview,
    spectrum_order: Vec<&'a str>,
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(UTF8_BOM)?;
    Ok(csv::Writer::from_writer(file))
}

pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    write_json(path, records)
}

/// `word,count,weight,proportion`, in table order.
pub fn write_term_table(path: &Path, table: &TermFrequencyTable) -> Result<()> {
    let mut wtr = csv_writer(path)?;
    wtr.write_record(["word", "count", "weight", "proportion"])?;
    for row in &table.rows {
        wtr.write_record([
            row.term.clone(),
            row.estimated_count.to_string(),
            row.normalized_weight.to_string(),
            row.proportion.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_keywords(path: &Path, keywords: &[KeywordCount]) -> Result<()> {
    let mut wtr = csv_writer(path)?;
    wtr.write_record(["keyword", "count"])?;
    for k in keywords {
        wtr.write_record([k.keyword.clone(), k.count.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `content,sentiment,score`, one row per scored record.
pub fn write_sentiment(path: &Path, report: &SentimentReport) -> Result<()> {
    let mut wtr = csv_writer(path)?;
    wtr.write_record(["content", "sentiment", "score"])?;
    for verdict in &report.verdicts {
        wtr.write_record([
            verdict.content.clone(),
            verdict.polarity.to_string(),
            verdict.confidence.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every artifact of a movie analysis into `out_dir`.
///
/// Returns the paths written.
pub fn export_analysis(out_dir: &Path, analysis: &Analysis) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut written = Vec::new();

    let path = out_dir.join(ALL_COMMENTS_FILE);
    write_records(&path, &analysis.unique)?;
    written.push(path);

    let path = out_dir.join(RELEVANT_COMMENTS_FILE);
    write_records(&path, &analysis.relevant.records)?;
    written.push(path);

    let path = out_dir.join(WORD_FREQUENCIES_FILE);
    write_term_table(&path, &analysis.frequencies)?;
    written.push(path);

    let path = out_dir.join(KEYWORDS_FILE);
    write_keywords(&path, &analysis.keywords)?;
    written.push(path);

    if let Some(report) = &analysis.sentiment {
        let path = out_dir.join(SENTIMENT_FILE);
        write_sentiment(&path, report)?;
        written.push(path);
    }

    let summary = AnalysisSummary {
        movie: &analysis.movie,
        generated_at: Utc::now().to_rfc3339(),
        source_counts: &analysis.source_counts,
        rule_hits: &analysis.relevant.rule_hits,
        ratings: &analysis.ratings,
        sentiment: analysis.sentiment.as_ref().map(|r| &r.summary),
        distinct_terms: analysis.frequencies.len(),
        total_token_estimate: analysis.frequencies.total_token_estimate,
        top_keywords: &analysis.keywords,
    };
    let path = out_dir.join(SUMMARY_FILE);
    write_json(&path, &summary)?;
    written.push(path);

    info!(dir = %out_dir.display(), files = written.len(), "Exported analysis");
    Ok(written)
}

/// Write the overview's frequency table and summary into `out_dir`.
pub fn export_overview(out_dir: &Path, overview: &Overview) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let freq_path = out_dir.join(OVERVIEW_FREQUENCIES_FILE);
    write_term_table(&freq_path, &overview.frequencies)?;

    let summary = OverviewSummary {
        generated_at: Utc::now().to_rfc3339(),
        overview,
        spectrum_order: overview
            .spectrum
            .iter()
            .map(|e: &SpectrumEntry| e.movie.as_str())
            .collect(),
    };
    let summary_path = out_dir.join(OVERVIEW_SUMMARY_FILE);
    write_json(&summary_path, &summary)?;

    info!(dir = %out_dir.display(), "Exported overview");
    Ok(vec![freq_path, summary_path])
}
