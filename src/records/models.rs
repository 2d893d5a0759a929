// Record models: the uniform shape every source payload is normalized into.
//
// Records are built once by the normalizer and never mutated afterwards.
// Classification verdicts, sentiment labels and keywords are derived
// artifacts keyed by `content`, never written back into the record.

use serde::{Deserialize, Serialize};

/// Where a record came from. The declaration order is the source priority
/// used by deduplication: earlier variants win over later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Short reviews, the most structured source (ratings, upvotes)
    ShortReview,
    /// Long-form review essays (no upvote concept)
    LongReview,
    /// Comments under social-media posts
    SocialComment,
    /// Descriptions of social-media posts found by search
    SocialDescription,
}

impl Source {
    /// All sources in priority order.
    pub const ALL: [Source; 4] = [
        Source::ShortReview,
        Source::LongReview,
        Source::SocialComment,
        Source::SocialDescription,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::ShortReview => "short_review",
            Source::LongReview => "long_review",
            Source::SocialComment => "social_comment",
            Source::SocialDescription => "social_description",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized unit of review text plus optional rating/upvote metadata.
///
/// `rating` and `upvotes` hold the raw text the source exported. Sources
/// disagree on whether these are numbers or strings (and emit `0` or `""`
/// for "no rating"), so interpretation is left to the rating aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Trimmed, non-empty text. Also the deduplication key.
    pub content: String,
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upvotes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Record {
    /// Build a record from already-trimmed content.
    ///
    /// Returns `None` if the content is empty after trimming; such rows
    /// are malformed and get dropped rather than reported.
    pub fn new(content: &str, source: Source) -> Option<Self> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        Some(Self {
            content: content.to_string(),
            source,
            rating: None,
            upvotes: None,
            timestamp: None,
        })
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    pub fn with_upvotes(mut self, upvotes: impl Into<String>) -> Self {
        self.upvotes = Some(upvotes.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Whitespace-delimited token count of the content.
    pub fn token_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_content() {
        let r = Record::new("  好看  \n", Source::ShortReview).unwrap();
        assert_eq!(r.content, "好看");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert!(Record::new("   \t\n", Source::LongReview).is_none());
        assert!(Record::new("", Source::LongReview).is_none());
    }

    #[test]
    fn test_source_priority_order() {
        assert!(Source::ShortReview < Source::LongReview);
        assert!(Source::LongReview < Source::SocialComment);
        assert!(Source::SocialComment < Source::SocialDescription);
    }

    #[test]
    fn test_token_count() {
        let r = Record::new("a b  c\td", Source::SocialComment).unwrap();
        assert_eq!(r.token_count(), 4);
        let r = Record::new("她和妈妈一起生活", Source::SocialComment).unwrap();
        assert_eq!(r.token_count(), 1);
    }
}
