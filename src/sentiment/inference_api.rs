// Hosted inference endpoint implementation.
//
// Sends text to a Hugging Face Inference API style endpoint:
//   POST {base_url}/models/{model_id}  {"inputs": "..."}
// and reads back label/score pairs. Free tiers are rate limited, so calls
// go through the shared RateLimiter.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::{Polarity, SentimentClassifier, SentimentResult};

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL_ID: &str = "IDEA-CCNL/Erlangshen-Roberta-330M-Sentiment";

/// Sentiment classifier backed by a hosted inference API.
pub struct InferenceApiClassifier {
    client: Client,
    endpoint: String,
    api_token: String,
    rate_limiter: RateLimiter,
}

impl InferenceApiClassifier {
    /// Create a classifier for `model_id` served under `base_url`.
    ///
    /// `requests_per_second` bounds the call rate across all concurrent
    /// scoring tasks.
    pub fn new(
        base_url: &str,
        model_id: &str,
        api_token: String,
        requests_per_second: f64,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/models/{}", base_url.trim_end_matches('/'), model_id),
            api_token,
            rate_limiter: RateLimiter::new(requests_per_second),
        }
    }
}

#[async_trait]
impl SentimentClassifier for InferenceApiClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        self.rate_limiter.acquire().await;

        let mut request = self.client.post(&self.endpoint).json(&InferenceRequest { inputs: text });
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request
            .send()
            .await
            .context("Failed to call sentiment inference API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Inference API returned {}: {}", status, body);
        }

        let body: InferenceResponse = response
            .json()
            .await
            .context("Failed to parse inference API response")?;

        let result = best_label(body.into_scores())?;

        debug!(
            polarity = %result.polarity,
            confidence = result.confidence,
            text_preview = %crate::output::truncate_chars(text, 30),
            "Inference API classified text"
        );
        Ok(result)
    }
}

/// Pick the highest-scoring label and map it onto the taxonomy.
fn best_label(scores: Vec<LabelScore>) -> Result<SentimentResult> {
    let top = scores
        .into_iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        .context("Inference API returned no labels")?;

    let polarity = Polarity::from_label(&top.label)
        .with_context(|| format!("Inference API returned unknown label '{}'", top.label))?;

    Ok(SentimentResult {
        polarity,
        confidence: top.score,
    })
}

// --- Inference API request/response types ---

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Text-classification responses come back either nested per input
/// (`[[{..}, {..}]]`) or flat (`[{..}, {..}]`) depending on the server.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(mut batches) => {
                if batches.is_empty() {
                    Vec::new()
                } else {
                    batches.swap_remove(0)
                }
            }
            InferenceResponse::Flat(scores) => scores,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_response() {
        let body: InferenceResponse = serde_json::from_str(
            r#"[[{"label":"Positive","score":0.93},{"label":"Negative","score":0.07}]]"#,
        )
        .unwrap();
        let result = best_label(body.into_scores()).unwrap();
        assert_eq!(result.polarity, Polarity::Positive);
        assert!((result.confidence - 0.93).abs() < 1e-10);
    }

    #[test]
    fn test_parse_flat_response() {
        let body: InferenceResponse = serde_json::from_str(
            r#"[{"label":"Positive","score":0.2},{"label":"Negative","score":0.8}]"#,
        )
        .unwrap();
        let result = best_label(body.into_scores()).unwrap();
        assert_eq!(result.polarity, Polarity::Negative);
    }

    #[test]
    fn test_unknown_label_is_error() {
        let scores = vec![LabelScore {
            label: "neutral".to_string(),
            score: 0.9,
        }];
        assert!(best_label(scores).is_err());
    }

    #[test]
    fn test_empty_response_is_error() {
        assert!(best_label(Vec::new()).is_err());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let classifier = InferenceApiClassifier::new("http://localhost:1/", "org/model", String::new(), 5.0);
        assert_eq!(classifier.endpoint, "http://localhost:1/models/org/model");
    }
}
