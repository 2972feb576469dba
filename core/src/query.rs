use crate::index::InvertedIndex;
use crate::scoring::TermWeights;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked document for a queried word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub doc_id: DocId,
    /// Raw occurrences of the word in this document.
    pub count: u32,
    pub weight: f64,
}

/// Outcome of a single-word lookup. `NotIndexed` is a normal result, not an
/// error: the word was never seen while building.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResults {
    NotIndexed,
    Ranked(Vec<Hit>),
}

impl SearchResults {
    pub fn is_not_indexed(&self) -> bool { matches!(self, SearchResults::NotIndexed) }

    pub fn hits(&self) -> &[Hit] {
        match self {
            SearchResults::NotIndexed => &[],
            SearchResults::Ranked(hits) => hits,
        }
    }

    pub fn into_hits(self) -> Vec<Hit> {
        match self {
            SearchResults::NotIndexed => Vec::new(),
            SearchResults::Ranked(hits) => hits,
        }
    }

    /// Keeps the `k` best hits.
    pub fn top(mut self, k: usize) -> Self {
        if let SearchResults::Ranked(hits) = &mut self {
            hits.truncate(k);
        }
        self
    }
}

/// Stateless ranking over an index and the weights computed from it.
pub struct QueryService;

impl QueryService {
    /// Documents containing `word`, by descending weight. Equal weights are
    /// ordered by ascending document identifier so output is reproducible.
    pub fn search(word: &str, index: &InvertedIndex, weights: &TermWeights) -> SearchResults {
        let Some(counts) = index.search(word) else {
            return SearchResults::NotIndexed;
        };
        if !weights.is_current_for(index) {
            tracing::warn!(word, "ranking with weights computed from an older index state");
        }
        let mut hits: Vec<Hit> = counts
            .iter()
            .map(|(doc_id, count)| Hit {
                doc_id: doc_id.clone(),
                count: *count,
                weight: weights.weight(word, doc_id),
            })
            .collect();
        hits.sort_by(rank_order);
        SearchResults::Ranked(hits)
    }
}

fn rank_order(a: &Hit, b: &Hit) -> Ordering {
    b.weight.total_cmp(&a.weight).then_with(|| a.doc_id.cmp(&b.doc_id))
}
