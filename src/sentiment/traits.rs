// Sentiment classifier trait: the swap-ready abstraction.
//
// The default implementation runs a local ONNX sequence-classification
// model. A hosted inference endpoint is available as an alternative. Both
// are bound to the same closed two-label taxonomy.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Longest input (in characters) the sentiment models are fed.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 128;

/// The closed label set of the sentiment taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub const ALL: [Polarity; 2] = [Polarity::Positive, Polarity::Negative];

    /// Map a model label onto the taxonomy. Labels outside the closed set
    /// (e.g. a model that also emits "neutral") return `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Polarity::Positive),
            "negative" => Some(Polarity::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The result of classifying one text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentResult {
    pub polarity: Polarity,
    /// Model confidence in `polarity`, 0.0 to 1.0
    pub confidence: f64,
}

/// Trait for text polarity classification. Async because the hosted
/// backend makes HTTP calls and the local one offloads inference.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify a single text.
    async fn classify(&self, text: &str) -> Result<SentimentResult>;

    /// Longest input in characters this model accepts. Callers truncate
    /// before calling `classify`.
    fn max_input_chars(&self) -> usize {
        DEFAULT_MAX_INPUT_CHARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(Polarity::from_label("Positive"), Some(Polarity::Positive));
        assert_eq!(Polarity::from_label("NEGATIVE"), Some(Polarity::Negative));
        assert_eq!(Polarity::from_label("neutral"), None);
        assert_eq!(Polarity::from_label("LABEL_1"), None);
    }
}
