use crate::index::{Document, InvertedIndex};
use crate::query::{QueryService, SearchResults};
use crate::scoring::{ScoringEngine, TermWeights};
use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// A snapshot of index statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of documents in the corpus, including empty ones.
    pub documents: usize,
    /// Number of distinct indexed words.
    pub words: usize,
    /// Number of prefix tree nodes.
    pub nodes: usize,
}

/// An index frozen together with the weights computed from it.
///
/// There is no way to mutate a `SearchEngine`, so it can be shared behind an
/// `Arc` and queried from any number of threads. Re-indexing means building
/// a new engine and swapping it in.
#[derive(Debug)]
pub struct SearchEngine {
    index: InvertedIndex,
    weights: TermWeights,
    scoring: ScoringEngine,
}

impl SearchEngine {
    pub fn new(index: InvertedIndex, scoring: ScoringEngine) -> Self {
        let weights = scoring.compute_all(&index);
        Self { index, weights, scoring }
    }

    /// Strict build: the first invalid document fails the whole build.
    pub fn build<I>(documents: I, scoring: ScoringEngine) -> Result<Self>
    where
        I: IntoIterator<Item = Document>,
    {
        Ok(Self::new(InvertedIndex::build_from_documents(documents)?, scoring))
    }

    /// Lenient build: invalid documents are skipped and reported.
    pub fn build_lenient<I>(documents: I, scoring: ScoringEngine) -> (Self, Vec<IndexError>)
    where
        I: IntoIterator<Item = Document>,
    {
        let (index, skipped) = InvertedIndex::build_lenient(documents);
        (Self::new(index, scoring), skipped)
    }

    pub fn search(&self, word: &str) -> SearchResults {
        QueryService::search(word, &self.index, &self.weights)
    }

    /// Up to `limit` indexed words starting with `prefix`, sorted.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<String> {
        let mut words: Vec<String> = self.index.words_with_prefix(prefix).collect();
        words.sort_unstable();
        words.truncate(limit);
        words
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.index.total_documents(),
            words: self.index.tree().len(),
            nodes: self.index.tree().node_count(),
        }
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn weights(&self) -> &TermWeights { &self.weights }

    pub fn scoring(&self) -> ScoringEngine { self.scoring }
}
