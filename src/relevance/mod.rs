// Relevance classification: does a review talk about the target relationship?

pub mod classifier;
pub mod lexicon;
pub mod rules;

pub use classifier::{ClassifiedSet, RelevanceClassifier};
pub use lexicon::TopicLexicon;
pub use rules::{Rule, RuleKind};
