//! TF-IDF weights for every `(word, document)` pair.

use crate::index::InvertedIndex;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdfMode {
    /// `ln(N / df)`; zero for a word present in every document.
    #[default]
    Standard,
    /// `ln(1 + N / df)`; never zero, so universal words still rank by count.
    Smoothed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    pub idf_mode: IdfMode,
}

/// Word → document → weight, tagged with the index generation it was
/// computed from.
#[derive(Debug, Clone, Default)]
pub struct TermWeights {
    weights: HashMap<String, HashMap<DocId, f64>>,
    generation: u64,
}

impl ScoringEngine {
    pub fn new(idf_mode: IdfMode) -> Self { Self { idf_mode } }

    pub fn idf(&self, total_documents: usize, document_frequency: u32) -> f64 {
        if document_frequency == 0 {
            return 0.0;
        }
        let ratio = total_documents as f64 / document_frequency as f64;
        match self.idf_mode {
            IdfMode::Standard => ratio.ln(),
            IdfMode::Smoothed => (1.0 + ratio).ln(),
        }
    }

    /// One pass over every indexed word. The whole table is recomputed; there
    /// is no incremental update.
    pub fn compute_all(&self, index: &InvertedIndex) -> TermWeights {
        let total = index.total_documents();
        let mut weights = HashMap::new();
        for word in index.words() {
            let Some(counts) = index.search(&word) else { continue };
            let idf = self.idf(total, index.document_frequency(&word));
            let per_doc: HashMap<DocId, f64> = counts
                .iter()
                .map(|(doc_id, tf)| (doc_id.clone(), *tf as f64 * idf))
                .collect();
            weights.insert(word, per_doc);
        }
        tracing::info!(words = weights.len(), documents = total, mode = ?self.idf_mode, "computed tf-idf weights");
        TermWeights { weights, generation: index.generation() }
    }
}

impl TermWeights {
    pub fn get(&self, word: &str) -> Option<&HashMap<DocId, f64>> { self.weights.get(word) }

    /// Weight of `word` in `doc_id`, 0 when either is missing.
    pub fn weight(&self, word: &str, doc_id: &str) -> f64 {
        self.weights
            .get(word)
            .and_then(|docs| docs.get(doc_id))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn generation(&self) -> u64 { self.generation }

    /// False once `index` has been mutated after these weights were computed.
    pub fn is_current_for(&self, index: &InvertedIndex) -> bool {
        self.generation == index.generation()
    }
}
