// Sentiment classification: trait-based abstraction for swappable models.
//
// The SentimentClassifier trait defines the interface. The local ONNX model
// is the default; a hosted inference endpoint can be swapped in without
// touching the aggregation code.

pub mod inference_api;
pub mod onnx;
pub mod rate_limiter;
pub mod traits;

pub use traits::{Polarity, SentimentClassifier, SentimentResult};
