// Lexical frequency: keyword extraction, the word-cloud layout, and the
// engine that turns them into estimated term counts.

pub mod frequency;
pub mod jieba;
pub mod layout;
pub mod stopwords;
pub mod tfidf;
pub mod traits;

pub use frequency::{FrequencyEngine, KeywordCount, TermFrequencyRow, TermFrequencyTable};
pub use layout::FrequencyLayout;
pub use stopwords::StopWords;
pub use traits::KeywordExtractor;
