// Upvote-weighted star rating aggregation.
//
// Each usable rating counts as a vote weighted by its upvotes. Records from
// sources without an upvote concept (long-form essays) still count, with
// weight 1. Unusable ratings are skipped without error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::records::Record;

/// Star scale used for the weighted average.
pub const MAX_STARS: u8 = 5;

/// Weight given to a rating whose record has no usable upvote count.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Histogram and weighted average of star ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Count per star value; always has keys 1..=5.
    pub per_star_count: BTreeMap<u8, u32>,
    /// Sum of `rating * weight` over usable ratings.
    pub weighted_sum: f64,
    /// Sum of `5 * weight` over usable ratings.
    pub total_weight: f64,
    /// Weighted mean on the 1–5 star scale. `None` means no ratings were
    /// available (or all usable ratings carried zero weight).
    pub weighted_average: Option<f64>,
    /// Records that contributed to the histogram.
    pub rated: usize,
    /// Records skipped for a missing or unusable rating.
    pub skipped: usize,
}

impl RatingSummary {
    fn empty() -> Self {
        Self {
            per_star_count: (1..=MAX_STARS).map(|s| (s, 0)).collect(),
            weighted_sum: 0.0,
            total_weight: 0.0,
            weighted_average: None,
            rated: 0,
            skipped: 0,
        }
    }

    pub fn has_ratings(&self) -> bool {
        self.weighted_average.is_some()
    }
}

/// Parse a raw rating into a star value. Missing, blank, non-integer and
/// out-of-range values (including the `0` sources use for "unrated") yield `None`.
pub fn parse_rating(raw: Option<&str>) -> Option<u8> {
    let value: i64 = raw?.trim().parse().ok()?;
    u8::try_from(value)
        .ok()
        .filter(|stars| (1..=MAX_STARS).contains(stars))
}

/// Parse a raw upvote count into a vote weight, defaulting to 1.
pub fn parse_weight(raw: Option<&str>) -> f64 {
    raw.and_then(|r| r.trim().parse::<u64>().ok())
        .map(|v| v as f64)
        .unwrap_or(DEFAULT_WEIGHT)
}

/// Aggregate the ratings of a record sequence.
pub fn aggregate_ratings(records: &[Record]) -> RatingSummary {
    let mut summary = RatingSummary::empty();

    for record in records {
        let Some(stars) = parse_rating(record.rating.as_deref()) else {
            summary.skipped += 1;
            continue;
        };
        let weight = parse_weight(record.upvotes.as_deref());

        *summary.per_star_count.entry(stars).or_insert(0) += 1;
        summary.weighted_sum += f64::from(stars) * weight;
        summary.total_weight += f64::from(MAX_STARS) * weight;
        summary.rated += 1;
    }

    if summary.total_weight > 0.0 {
        summary.weighted_average =
            Some(summary.weighted_sum / summary.total_weight * f64::from(MAX_STARS));
    }

    debug!(
        rated = summary.rated,
        skipped = summary.skipped,
        average = ?summary.weighted_average,
        "Aggregated ratings"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Source;

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating(Some("3")), Some(3));
        assert_eq!(parse_rating(Some(" 5 ")), Some(5));
        assert_eq!(parse_rating(Some("0")), None);
        assert_eq!(parse_rating(Some("6")), None);
        assert_eq!(parse_rating(Some("-1")), None);
        assert_eq!(parse_rating(Some("4.5")), None);
        assert_eq!(parse_rating(Some("")), None);
        assert_eq!(parse_rating(None), None);
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight(Some("10")), 10.0);
        assert_eq!(parse_weight(Some("0")), 0.0);
        assert_eq!(parse_weight(Some("abc")), 1.0);
        assert_eq!(parse_weight(Some("-3")), 1.0);
        assert_eq!(parse_weight(None), 1.0);
    }

    #[test]
    fn test_zero_weight_counts_in_histogram_only() {
        let records = vec![Record::new("x", Source::ShortReview)
            .unwrap()
            .with_rating("4")
            .with_upvotes("0")];
        let summary = aggregate_ratings(&records);
        assert_eq!(summary.per_star_count[&4], 1);
        assert_eq!(summary.total_weight, 0.0);
        assert!(!summary.has_ratings());
    }
}
