// Review sources on disk. Fetching from the sites themselves is out of scope;
// these loaders read the exports a scraper already produced.

pub mod files;

pub use files::{list_movies, load_movie, SourceSpec};
