// File loader for scraped review exports.
//
// Each movie lives in its own directory under the data root:
//
//   <data_dir>/<movie>/short_reviews.json   list of {content, stars, upvote, time}
//   <data_dir>/<movie>/long_reviews.json    list of {title, url, content}
//   <data_dir>/<movie>/xhs_comments.csv     social comments, text in `content`
//   <data_dir>/<movie>/xhs_contents.csv     social posts, text in `desc`
//
// Any of these may be missing; a missing file is an empty source.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::records::normalize::{
    check_headers, normalize_mappings, normalize_table, FieldMapping, Table,
};
use crate::records::{Record, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// A JSON array of objects (a lone object is accepted too)
    Json,
    /// CSV with a header row
    Csv,
}

/// Where one source's export lives and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub source: Source,
    pub file_name: String,
    pub format: PayloadFormat,
    pub mapping: FieldMapping,
}

impl SourceSpec {
    /// The four exports of a movie directory, in source-priority order.
    pub fn movie_defaults(comment_column: &str, desc_column: &str) -> Vec<SourceSpec> {
        vec![
            SourceSpec {
                source: Source::ShortReview,
                file_name: "short_reviews.json".to_string(),
                format: PayloadFormat::Json,
                mapping: FieldMapping::short_review(),
            },
            SourceSpec {
                source: Source::LongReview,
                file_name: "long_reviews.json".to_string(),
                format: PayloadFormat::Json,
                mapping: FieldMapping::content_only("content"),
            },
            SourceSpec {
                source: Source::SocialComment,
                file_name: "xhs_comments.csv".to_string(),
                format: PayloadFormat::Csv,
                mapping: FieldMapping::content_only(comment_column),
            },
            SourceSpec {
                source: Source::SocialDescription,
                file_name: "xhs_contents.csv".to_string(),
                format: PayloadFormat::Csv,
                mapping: FieldMapping::content_only(desc_column),
            },
        ]
    }
}

/// Read a JSON export into a list of items.
pub fn load_json_items(path: &Path) -> Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

fn csv_headers(reader: &mut csv::Reader<std::fs::File>, path: &Path) -> Result<Vec<String>> {
    Ok(reader
        .headers()
        .with_context(|| format!("Failed to read CSV header of {}", path.display()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect())
}

/// Read a CSV export into a [`Table`].
///
/// Rows may be ragged; short rows are padded by the normalizer treating
/// missing cells as empty.
pub fn load_table(path: &Path) -> Result<Table> {
    let mut reader = csv_reader(path)?;
    let headers = csv_headers(&mut reader, path)?;

    let mut rows = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Bad CSV row {} in {}", i + 1, path.display()))?;
        rows.push(row.iter().map(str::to_string).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Check that a CSV source's header has its text column. Reads the header
/// row only; a missing file passes.
pub fn check_table_header(movie_dir: &Path, spec: &SourceSpec) -> Result<()> {
    let path = movie_dir.join(&spec.file_name);
    if spec.format != PayloadFormat::Csv || !path.exists() {
        return Ok(());
    }
    let headers = csv_headers(&mut csv_reader(&path)?, &path)?;
    check_headers(&headers, spec.source, &spec.mapping)
        .with_context(|| format!("Cannot normalize {}", path.display()))
}

/// Load and normalize one source of a movie directory.
pub fn load_source(movie_dir: &Path, spec: &SourceSpec) -> Result<Vec<Record>> {
    let path = movie_dir.join(&spec.file_name);
    if !path.exists() {
        warn!(source = %spec.source, path = %path.display(), "Source file not found, skipping");
        return Ok(Vec::new());
    }

    let records = match spec.format {
        PayloadFormat::Json => {
            let items = load_json_items(&path)?;
            normalize_mappings(&items, spec.source, &spec.mapping)?
        }
        PayloadFormat::Csv => {
            let table = load_table(&path)?;
            normalize_table(&table, spec.source, &spec.mapping)
                .with_context(|| format!("Cannot normalize {}", path.display()))?
        }
    };

    info!(source = %spec.source, path = %path.display(), count = records.len(), "Loaded source");
    Ok(records)
}

/// Load every source of one movie, as batches ready for merging.
pub fn load_movie(
    data_dir: &Path,
    movie: &str,
    specs: &[SourceSpec],
) -> Result<Vec<(Source, Vec<Record>)>> {
    let movie_dir = data_dir.join(movie);
    if !movie_dir.is_dir() {
        anyhow::bail!("Movie directory not found: {}", movie_dir.display());
    }

    // Column errors surface before any payload is read
    for spec in specs {
        check_table_header(&movie_dir, spec)?;
    }

    specs
        .iter()
        .map(|spec| Ok((spec.source, load_source(&movie_dir, spec)?)))
        .collect()
}

/// Movie directories directly under the data root, sorted by name.
pub fn list_movies(data_dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("Failed to list data directory {}", data_dir.display()))?;

    let mut movies = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                movies.push(name.to_string());
            }
        }
    }
    movies.sort();
    Ok(movies)
}

/// Output directory for a movie's analysis artifacts.
pub fn default_output_dir(data_dir: &Path, movie: &str) -> PathBuf {
    data_dir.join(movie)
}
