pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod scoring;
pub mod tokenizer;
pub mod trie;

/// Opaque document identifier (a URL in the usual corpus).
pub type DocId = String;

pub use engine::{IndexStats, SearchEngine};
pub use error::{IndexError, Result};
pub use index::{Document, InvertedIndex};
pub use query::{Hit, QueryService, SearchResults};
pub use scoring::{IdfMode, ScoringEngine, TermWeights};
pub use trie::{DocCounts, PrefixTree};
