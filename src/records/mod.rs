// Records: the normalized review shape, plus normalization and dedup.

pub mod dedup;
pub mod models;
pub mod normalize;

pub use models::{Record, Source};
