// Stop-word set: terms ignored by keyword extraction and the frequency layout.
//
// Usually loaded from a plain text file, one term per line. A missing file
// is legal and means "no stop words".

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use stop_words::{get, LANGUAGE};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
    /// Lowercased copy for case-insensitive lookups in the layout
    lowered: HashSet<String>,
}

impl StopWords {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from terms. Blank terms are ignored.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        set.extend(terms);
        set
    }

    /// Load one term per line. A missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Stop-word file not found, continuing without stop words");
            return Ok(Self::empty());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stop-word file {}", path.display()))?;
        let set = Self::from_terms(raw.lines());
        info!(path = %path.display(), count = set.len(), "Loaded stop words");
        Ok(set)
    }

    /// Add the built-in Chinese list from the `stop-words` crate.
    pub fn with_builtin_chinese(mut self) -> Self {
        let builtin: Vec<String> = get(LANGUAGE::Chinese);
        self.extend(builtin);
        self
    }

    pub fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for term in terms {
            let term: String = term.into();
            let term = term.trim_end_matches('\r');
            if term.trim().is_empty() {
                continue;
            }
            self.lowered.insert(term.to_lowercase());
            self.words.insert(term.to_string());
        }
    }

    /// Exact membership.
    pub fn contains(&self, term: &str) -> bool {
        self.words.contains(term)
    }

    /// Case-insensitive membership.
    pub fn contains_ignore_case(&self, term: &str) -> bool {
        self.lowered.contains(&term.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The terms as an owned list, in no particular order.
    pub fn to_vec(&self) -> Vec<String> {
        self.words.iter().cloned().collect()
    }
}
