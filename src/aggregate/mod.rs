// Aggregation over classified records: ratings and sentiment.

pub mod ratings;
pub mod sentiment;
