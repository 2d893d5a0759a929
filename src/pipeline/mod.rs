// Analysis pipelines: one movie at a time, or an overview across all of them.

pub mod analysis;
pub mod overview;

pub use analysis::{Analysis, Analyzer, SentimentStage};
pub use overview::{run_overview, MovieCorpus, Overview};
