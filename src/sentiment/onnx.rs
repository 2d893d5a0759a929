// Local ONNX sentiment classifier.
//
// Runs a BERT/RoBERTa-style two-class sequence classification model
// (e.g. an ONNX export of Erlangshen-Roberta sentiment) entirely on the
// local CPU. Output logits are softmaxed over [negative, positive].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::{Polarity, SentimentClassifier, SentimentResult};

/// Labels in the order the model's logits are emitted (id2label).
const LABEL_ORDER: [Polarity; 2] = [Polarity::Negative, Polarity::Positive];

const MODEL_FILE: &str = "model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Returns the default directory for the sentiment model files.
/// Uses the platform data directory: ~/.local/share/reviewlens/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reviewlens")
        .join("models")
        .join("sentiment")
}

/// Check whether both required model files exist.
pub fn model_files_present(dir: &Path) -> bool {
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

/// Local ONNX sentiment classifier. Session and tokenizer live behind
/// Arc<Mutex>/Arc so inference can run on spawn_blocking.
pub struct OnnxSentimentClassifier {
    // ort::Session::run takes &mut self
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    /// BERT-style exports take a third `token_type_ids` input; RoBERTa
    /// exports from some toolchains don't.
    token_type_ids: bool,
}

impl OnnxSentimentClassifier {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path, token_type_ids: bool) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!(
                "Sentiment model not found: {}\n\
                 Export a two-class sentiment model to ONNX and place it there,\n\
                 or set REVIEWLENS_SENTIMENT=inference-api.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        debug!("Loaded ONNX sentiment model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            token_type_ids,
        })
    }
}

#[async_trait]
impl SentimentClassifier for OnnxSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentResult> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let with_type_ids = self.token_type_ids;
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let encoding = tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

            let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| i64::from(id)).collect();
            let mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| i64::from(m))
                .collect();
            let type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| i64::from(t)).collect();
            let shape = [1_i64, ids.len() as i64];

            let input_ids = Tensor::from_array((shape, ids)).context("Failed to create input_ids tensor")?;
            let attention_mask =
                Tensor::from_array((shape, mask)).context("Failed to create attention_mask tensor")?;

            let logits = {
                let mut session = session
                    .lock()
                    .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

                let outputs = if with_type_ids {
                    let token_type_ids = Tensor::from_array((shape, type_ids))
                        .context("Failed to create token_type_ids tensor")?;
                    session.run(ort::inputs! {
                        "input_ids" => input_ids,
                        "attention_mask" => attention_mask,
                        "token_type_ids" => token_type_ids
                    })
                } else {
                    session.run(ort::inputs! {
                        "input_ids" => input_ids,
                        "attention_mask" => attention_mask
                    })
                }
                .context("ONNX inference failed")?;

                // Output shape: [1, 2] raw logits
                let (_shape, data) = outputs[0]
                    .try_extract_tensor::<f32>()
                    .context("Failed to extract output tensor")?;
                data.to_vec()
            };

            if logits.len() < LABEL_ORDER.len() {
                anyhow::bail!(
                    "Model returned {} logits, expected {}",
                    logits.len(),
                    LABEL_ORDER.len()
                );
            }

            let probs = softmax(&logits[..LABEL_ORDER.len()]);
            let result = pick_label(&probs);

            debug!(
                polarity = %result.polarity,
                confidence = result.confidence,
                text_preview = %crate::output::truncate_chars(&text, 30),
                "ONNX classified text"
            );
            Ok(result)
        })
        .await
        .context("spawn_blocking panicked")?
    }
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f64> = logits.iter().map(|&l| f64::from(l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Pick the most probable label. Ties go to the earlier label.
fn pick_label(probs: &[f64]) -> SentimentResult {
    let mut best = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p > probs[best] {
            best = i;
        }
    }
    SentimentResult {
        polarity: LABEL_ORDER[best],
        confidence: probs[best],
    }
}
