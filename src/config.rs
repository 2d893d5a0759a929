use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::sentiment::inference_api::{DEFAULT_BASE_URL, DEFAULT_MODEL_ID};
use crate::sentiment::onnx::{default_model_dir, model_files_present};

/// Which sentiment backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    /// Local ONNX model (default). No network, no rate limits
    Onnx,
    /// Hosted inference endpoint. Rate limited, usually needs HF_API_TOKEN
    InferenceApi,
}

/// Which keyword extractor feeds the frequency engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segmenter {
    /// jieba segmentation + TF-IDF, for Chinese text (default)
    Jieba,
    /// Sentence-level TF-IDF over whitespace tokens
    Whitespace,
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root holding one directory per movie
    pub data_dir: PathBuf,
    pub stopwords_path: PathBuf,
    /// Add the `stop-words` crate's Chinese list to the file's terms
    pub builtin_stopwords: bool,
    pub segmenter: Segmenter,
    /// Let strongly associated word pairs into the frequency table
    pub collocations: bool,
    /// JSON lexicon replacing the built-in mother–daughter terms
    pub lexicon_path: Option<PathBuf>,
    pub classifier_backend: ClassifierBackend,
    /// Directory containing model.onnx and tokenizer.json
    pub model_dir: PathBuf,
    pub model_token_type_ids: bool,
    pub inference_url: String,
    pub inference_model: String,
    pub hf_api_token: String,
    pub inference_rps: f64,
    pub sentiment_timeout: Duration,
    /// Text column of the social comment export
    pub social_comment_column: String,
    /// Text column of the social post export
    pub social_desc_column: String,
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name).as_deref().map(str::trim) {
        Ok("1") | Ok("true") | Ok("yes") | Ok("on") => true,
        Ok("0") | Ok("false") | Ok("no") | Ok("off") => false,
        _ => default,
    }
}

impl Config {
    /// Load configuration from environment variables. Every field has a
    /// default; call [`Config::validate`] before processing records.
    pub fn load() -> Result<Self> {
        let classifier_backend = match env::var("REVIEWLENS_SENTIMENT").as_deref() {
            Ok("inference-api") => ClassifierBackend::InferenceApi,
            Ok("onnx") | Err(_) => ClassifierBackend::Onnx,
            Ok(other) => anyhow::bail!(
                "Unknown REVIEWLENS_SENTIMENT backend '{other}' (expected 'onnx' or 'inference-api')"
            ),
        };

        let segmenter = match env::var("REVIEWLENS_SEGMENTER").as_deref() {
            Ok("whitespace") => Segmenter::Whitespace,
            Ok("jieba") | Err(_) => Segmenter::Jieba,
            Ok(other) => anyhow::bail!(
                "Unknown REVIEWLENS_SEGMENTER '{other}' (expected 'jieba' or 'whitespace')"
            ),
        };

        let timeout_secs = match env::var("REVIEWLENS_SENTIMENT_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("REVIEWLENS_SENTIMENT_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'")
            })?,
            Err(_) => 30,
        };

        let inference_rps = match env::var("REVIEWLENS_INFERENCE_RPS") {
            Ok(raw) => raw.trim().parse::<f64>().map_err(|_| {
                anyhow::anyhow!("REVIEWLENS_INFERENCE_RPS must be a number, got '{raw}'")
            })?,
            Err(_) => 1.0,
        };

        Ok(Self {
            data_dir: env::var("REVIEWLENS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
            stopwords_path: env::var("REVIEWLENS_STOPWORDS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./stopwords.txt")),
            builtin_stopwords: env_flag("REVIEWLENS_BUILTIN_STOPWORDS", false),
            segmenter,
            collocations: env_flag("REVIEWLENS_COLLOCATIONS", false),
            lexicon_path: env::var("REVIEWLENS_LEXICON").ok().map(PathBuf::from),
            classifier_backend,
            model_dir: env::var("REVIEWLENS_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_model_dir()),
            model_token_type_ids: env_flag("REVIEWLENS_MODEL_TOKEN_TYPE_IDS", true),
            inference_url: env::var("REVIEWLENS_INFERENCE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            inference_model: env::var("REVIEWLENS_INFERENCE_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string()),
            hf_api_token: env::var("HF_API_TOKEN").unwrap_or_default(),
            inference_rps,
            sentiment_timeout: Duration::from_secs(timeout_secs),
            social_comment_column: env::var("REVIEWLENS_SOCIAL_COMMENT_COLUMN")
                .unwrap_or_else(|_| "content".to_string()),
            social_desc_column: env::var("REVIEWLENS_SOCIAL_DESC_COLUMN")
                .unwrap_or_else(|_| "desc".to_string()),
        })
    }

    /// Reject configuration that would silently produce empty results.
    /// Call this before any record is processed.
    pub fn validate(&self) -> Result<()> {
        if self.social_comment_column.trim().is_empty() {
            anyhow::bail!("REVIEWLENS_SOCIAL_COMMENT_COLUMN must not be empty");
        }
        if self.social_desc_column.trim().is_empty() {
            anyhow::bail!("REVIEWLENS_SOCIAL_DESC_COLUMN must not be empty");
        }
        if self.sentiment_timeout.is_zero() {
            anyhow::bail!("REVIEWLENS_SENTIMENT_TIMEOUT_SECS must be greater than zero");
        }
        if let Some(path) = &self.lexicon_path {
            if !path.exists() {
                anyhow::bail!("Lexicon file not found: {}", path.display());
            }
        }
        Ok(())
    }

    /// Check that the chosen sentiment backend has what it needs.
    /// For ONNX: model files must exist.
    /// For the inference API: an endpoint must be set.
    pub fn require_classifier(&self) -> Result<()> {
        match self.classifier_backend {
            ClassifierBackend::Onnx => {
                if !model_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX sentiment model not found in {}\n\
                         Place model.onnx and tokenizer.json there, or set\n\
                         REVIEWLENS_SENTIMENT=inference-api to use a hosted endpoint instead.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            ClassifierBackend::InferenceApi => {
                if self.inference_url.trim().is_empty() || self.inference_model.trim().is_empty() {
                    anyhow::bail!(
                        "REVIEWLENS_INFERENCE_URL and REVIEWLENS_INFERENCE_MODEL must be set \
                         for the inference-api backend"
                    );
                }
                if self.hf_api_token.is_empty() {
                    tracing::warn!("HF_API_TOKEN not set; hosted endpoints may reject or throttle requests");
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            data_dir: PathBuf::from("./data"),
            stopwords_path: PathBuf::from("./stopwords.txt"),
            builtin_stopwords: false,
            segmenter: Segmenter::Jieba,
            collocations: false,
            lexicon_path: None,
            classifier_backend: ClassifierBackend::InferenceApi,
            model_dir: PathBuf::from("/nonexistent"),
            model_token_type_ids: true,
            inference_url: DEFAULT_BASE_URL.to_string(),
            inference_model: DEFAULT_MODEL_ID.to_string(),
            hf_api_token: String::new(),
            inference_rps: 1.0,
            sentiment_timeout: Duration::from_secs(30),
            social_comment_column: "content".to_string(),
            social_desc_column: "desc".to_string(),
        }
    }

    #[test]
    fn test_validate_defaults() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_column() {
        let config = Config {
            social_desc_column: " ".to_string(),
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_lexicon() {
        let config = Config {
            lexicon_path: Some(PathBuf::from("/nonexistent/lexicon.json")),
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_classifier_onnx_missing_files() {
        let config = Config {
            classifier_backend: ClassifierBackend::Onnx,
            ..base()
        };
        assert!(config.require_classifier().is_err());
        assert!(base().require_classifier().is_ok());
    }
}
