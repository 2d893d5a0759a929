// ReviewLens: relevance classification and aggregation of film reviews
//
// This is the library root. Each module corresponds to a stage of the
// pipeline or to one of the collaborators around it.

pub mod aggregate;
pub mod config;
pub mod lexical;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod records;
pub mod relevance;
pub mod sentiment;
pub mod sources;
