// Colored terminal output for analyses and overviews.
//
// This module handles all terminal-specific formatting: colors, tables and
// bar charts. The main.rs command handlers delegate here.

use colored::Colorize;

use crate::aggregate::ratings::RatingSummary;
use crate::aggregate::sentiment::{SentimentReport, SpectrumEntry};
use crate::lexical::{KeywordCount, TermFrequencyTable};
use crate::pipeline::analysis::SourceCounts;
use crate::pipeline::{Analysis, Overview};
use crate::records::Source;
use crate::relevance::RuleKind;
use crate::sentiment::Polarity;

const BAR_WIDTH: usize = 30;

/// Display everything computed for one movie.
pub fn display_analysis(analysis: &Analysis, top: usize) {
    println!(
        "\n{}",
        format!("=== 《{}》 ===", analysis.movie).bold()
    );
    display_source_counts(&analysis.source_counts);
    display_ratings(&analysis.ratings);
    if let Some(report) = &analysis.sentiment {
        display_sentiment(report);
    }
    display_term_table(&analysis.frequencies, top);
    display_keywords(&analysis.keywords);
}

pub fn display_source_counts(counts: &SourceCounts) {
    println!("\n{}", "Records by source".bold());
    println!(
        "  {:<20} {:>8} {:>8} {:>8}",
        "Source".dimmed(),
        "Loaded".dimmed(),
        "Unique".dimmed(),
        "Relevant".dimmed(),
    );
    let get = |m: &std::collections::BTreeMap<Source, usize>, s: &Source| m.get(s).copied().unwrap_or(0);
    for source in Source::ALL {
        println!(
            "  {:<20} {:>8} {:>8} {:>8}",
            source.as_str(),
            get(&counts.loaded, &source),
            get(&counts.unique, &source),
            get(&counts.relevant, &source).to_string().green(),
        );
    }
}

pub fn display_ratings(ratings: &RatingSummary) {
    println!("\n{}", "Ratings".bold());
    let Some(average) = ratings.weighted_average else {
        println!("  {}", "No ratings available".dimmed());
        return;
    };

    println!(
        "  Weighted average: {} / 5  ({} rated, {} skipped)",
        format!("{average:.2}").yellow().bold(),
        ratings.rated,
        ratings.skipped,
    );

    let max = ratings.per_star_count.values().copied().max().unwrap_or(0);
    for (stars, count) in ratings.per_star_count.iter().rev() {
        let stars = *stars as usize;
        println!(
            "  {}{} {:>6}  {}",
            "★".repeat(stars).yellow(),
            " ".repeat(5usize.saturating_sub(stars)),
            count,
            bar(*count as f64, max as f64).cyan(),
        );
    }
}

pub fn display_sentiment(report: &SentimentReport) {
    let summary = &report.summary;
    println!("\n{}", "Sentiment".bold());
    if summary.scored == 0 {
        println!("  {}", "No records could be scored".dimmed());
    } else {
        for polarity in Polarity::ALL {
            let count = summary.label_counts.get(&polarity).copied().unwrap_or(0);
            let ratio = summary.ratio(polarity);
            let line = format!(
                "  {:<9} {:>6}  {:>5.1}%  {}",
                polarity.as_str(),
                count,
                ratio * 100.0,
                bar(ratio, 1.0),
            );
            match polarity {
                Polarity::Positive => println!("{}", line.green()),
                Polarity::Negative => println!("{}", line.red()),
            }
        }
    }

    if summary.failed > 0 || summary.skipped_empty > 0 {
        println!(
            "  {} {} failed, {} empty",
            "!".yellow(),
            summary.failed,
            summary.skipped_empty
        );
    }
    for failure in report.failures.iter().take(5) {
        println!(
            "    #{} {} {}",
            failure.index,
            failure.reason.to_string().yellow(),
            failure.preview.dimmed()
        );
    }
}

pub fn display_term_table(table: &TermFrequencyTable, top: usize) {
    println!("\n{}", "Term frequencies".bold());
    if table.is_empty() {
        println!("  {}", "No frequency data".dimmed());
        return;
    }

    println!(
        "  {:>4}  {:<12} {:>8} {:>7} {:>8}",
        "Rank".dimmed(),
        "Term".dimmed(),
        "Count".dimmed(),
        "Weight".dimmed(),
        "Share".dimmed(),
    );
    println!("  {}", "-".repeat(44 + BAR_WIDTH).dimmed());

    let max = table.rows.first().map(|r| r.estimated_count).unwrap_or(0);
    for (i, row) in table.rows.iter().take(top).enumerate() {
        println!(
            "  {:>4}. {:<12} {:>8} {:>7.3} {:>7.2}%  {}",
            i + 1,
            row.term,
            row.estimated_count,
            row.normalized_weight,
            row.proportion * 100.0,
            bar(row.estimated_count as f64, max as f64).cyan(),
        );
    }
    println!(
        "\n  {} terms, ~{} tokens in relevant records",
        table.len(),
        table.total_token_estimate
    );
}

pub fn display_keywords(keywords: &[KeywordCount]) {
    if keywords.is_empty() {
        return;
    }
    println!("\n{}", "Top keywords".bold());
    let line: Vec<String> = keywords
        .iter()
        .map(|k| format!("{}({})", k.keyword, k.count))
        .collect();
    println!("  {}", line.join("  "));
}

pub fn display_overview(overview: &Overview, top: usize) {
    println!(
        "\n{}",
        format!("=== Overview ({} movies) ===", overview.movies.len()).bold()
    );
    for totals in &overview.movies {
        println!("  {:<24} {:>6} records", totals.movie, totals.records);
    }
    println!("  {:<24} {:>6} records", "total".bold(), overview.pooled_records);

    display_term_table(&overview.frequencies, top);
    if !overview.spectrum.is_empty() {
        display_spectrum(&overview.spectrum);
    }
}

/// Movies as stacked positive/negative bars, most positive first.
pub fn display_spectrum(entries: &[SpectrumEntry]) {
    println!("\n{}", "Sentiment spectrum".bold());
    for entry in entries {
        let positive = ((entry.positive_pct / 100.0) * BAR_WIDTH as f64).round() as usize;
        let positive = positive.min(BAR_WIDTH);
        println!(
            "  {:<24} {}{} {:>5.1}% / {:>5.1}%  (n={})",
            entry.movie,
            "█".repeat(positive).green(),
            "█".repeat(BAR_WIDTH - positive).red(),
            entry.positive_pct,
            entry.negative_pct,
            entry.scored,
        );
    }
}

/// Show which rule, if any, admitted a text.
pub fn display_explain(text: &str, rule: Option<RuleKind>) {
    println!("  {}", super::truncate_chars(text, 120).dimmed());
    match rule {
        Some(kind) => println!("  {} matched by {}", "relevant".green().bold(), kind),
        None => println!("  {}", "not relevant".red()),
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.min(BAR_WIDTH))
}
