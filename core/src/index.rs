use crate::error::{IndexError, Result};
use crate::trie::{validate_word, DocCounts, PrefixTree, Words};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A document as handed over by preprocessing: an opaque identifier plus its
/// cleaned tokens in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new<I, S>(id: impl Into<DocId>, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { id: id.into(), tokens: tokens.into_iter().map(Into::into).collect() }
    }
}

/// Word → per-document counts, plus the corpus-wide statistics TF-IDF needs.
///
/// Document frequency is maintained on every insert: it grows by one the
/// first time a `(word, document)` pair is seen and never again for that
/// pair. The document set, not the number of build calls, defines the corpus
/// size, so a zero-token document still counts.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    tree: PrefixTree,
    df: HashMap<String, u32>,
    documents: HashSet<DocId>,
    generation: u64,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Builds an index, stopping at the first invalid document.
    pub fn build_from_documents<I>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut index = Self::new();
        index.index_documents(documents)?;
        Ok(index)
    }

    /// Builds an index, skipping invalid documents. The skipped documents'
    /// errors are returned alongside the index; skipped documents are not
    /// part of the corpus size.
    pub fn build_lenient<I>(documents: I) -> (Self, Vec<IndexError>)
    where
        I: IntoIterator<Item = Document>,
    {
        let mut index = Self::new();
        let skipped = index.index_documents_lenient(documents);
        (index, skipped)
    }

    /// Adds a batch of documents. An identifier repeated within the batch is
    /// rejected; documents accepted before the failing one stay indexed.
    pub fn index_documents<I>(&mut self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut batch = HashSet::new();
        for doc in documents {
            if !batch.insert(doc.id.clone()) {
                return Err(IndexError::DuplicateDocument(doc.id));
            }
            self.add_document(&doc.id, &doc.tokens)?;
        }
        tracing::info!(
            documents = self.total_documents(),
            words = self.tree.len(),
            "indexed documents"
        );
        Ok(())
    }

    /// Like [`index_documents`](Self::index_documents) but keeps going past
    /// invalid documents.
    ///
    /// A skipped document is not registered, so it does not count toward
    /// [`total_documents`](Self::total_documents) and does not dilute IDF.
    /// A document whose body is merely empty is not skipped and does count.
    pub fn index_documents_lenient<I>(&mut self, documents: I) -> Vec<IndexError>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut batch = HashSet::new();
        let mut skipped = Vec::new();
        for doc in documents {
            let outcome = if batch.insert(doc.id.clone()) {
                self.add_document(&doc.id, &doc.tokens)
            } else {
                Err(IndexError::DuplicateDocument(doc.id.clone()))
            };
            if let Err(err) = outcome {
                tracing::warn!(doc_id = %doc.id, error = %err, "skipping document");
                skipped.push(err);
            }
        }
        tracing::info!(
            documents = self.total_documents(),
            words = self.tree.len(),
            skipped = skipped.len(),
            "indexed documents"
        );
        skipped
    }

    /// Counts the tokens of one document and inserts each distinct word once
    /// with its in-document count. Every token is validated before anything
    /// is written, so a rejected document leaves the index unchanged.
    ///
    /// Adding to an identifier that is already indexed accumulates counts.
    pub fn add_document<S: AsRef<str>>(&mut self, doc_id: &str, tokens: &[S]) -> Result<()> {
        if doc_id.is_empty() {
            return Err(IndexError::EmptyDocumentId);
        }
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for token in tokens {
            *counts.entry(token.as_ref()).or_insert(0) += 1;
        }
        for (word, count) in &counts {
            validate_word(word)?;
            let existing = self.search(word).and_then(|c| c.get(doc_id)).copied().unwrap_or(0);
            if existing.checked_add(*count).is_none() {
                return Err(IndexError::CountOverflow { word: word.to_string(), doc_id: doc_id.to_string() });
            }
        }

        self.register_document(doc_id);
        for (word, count) in &counts {
            self.insert(word, doc_id, *count)?;
        }
        tracing::debug!(doc_id, tokens = tokens.len(), distinct = counts.len(), "added document");
        Ok(())
    }

    /// Adds `count` occurrences of `word` in `doc_id`, registering the
    /// document and updating its document frequency.
    pub fn insert(&mut self, word: &str, doc_id: &str, count: u32) -> Result<()> {
        if doc_id.is_empty() {
            return Err(IndexError::EmptyDocumentId);
        }
        if self.tree.insert(word, doc_id, count)? {
            *self.df.entry(word.to_string()).or_insert(0) += 1;
        }
        self.register_document(doc_id);
        Ok(())
    }

    pub fn search(&self, word: &str) -> Option<&DocCounts> { self.tree.search(word) }

    pub fn words(&self) -> Words<'_> { self.tree.words() }

    pub fn words_with_prefix(&self, prefix: &str) -> Words<'_> { self.tree.words_with_prefix(prefix) }

    /// Number of distinct documents containing `word`; 0 if never indexed.
    pub fn document_frequency(&self, word: &str) -> u32 {
        self.df.get(word).copied().unwrap_or(0)
    }

    pub fn total_documents(&self) -> usize { self.documents.len() }

    pub fn contains_document(&self, doc_id: &str) -> bool { self.documents.contains(doc_id) }

    /// Bumped on every mutation; lets derived tables detect that they were
    /// computed from an older state.
    pub fn generation(&self) -> u64 { self.generation }

    pub fn tree(&self) -> &PrefixTree { &self.tree }

    fn register_document(&mut self, doc_id: &str) {
        if !self.documents.contains(doc_id) {
            self.documents.insert(doc_id.to_string());
        }
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("doc1", ["a", "a", "b"]),
            Document::new("doc2", ["b", "c"]),
        ]
    }

    #[test]
    fn document_frequency_counts_documents_not_occurrences() {
        let index = InvertedIndex::build_from_documents(corpus()).unwrap();
        assert_eq!(index.total_documents(), 2);
        assert_eq!(index.document_frequency("a"), 1);
        assert_eq!(index.document_frequency("b"), 2);
        assert_eq!(index.document_frequency("c"), 1);
        assert_eq!(index.document_frequency("z"), 0);
        assert_eq!(index.search("a").unwrap()["doc1"], 2);
    }

    #[test]
    fn empty_document_counts_toward_total_only() {
        let mut docs = corpus();
        docs.push(Document::new("blank", Vec::<String>::new()));
        let index = InvertedIndex::build_from_documents(docs).unwrap();
        assert_eq!(index.total_documents(), 3);
        assert!(index.contains_document("blank"));
        assert_eq!(index.words().count(), 3);
    }

    #[test]
    fn invalid_document_leaves_index_untouched() {
        let mut index = InvertedIndex::new();
        let before = index.generation();
        let err = index.add_document("doc1", &["fine", "not fine"]).unwrap_err();
        assert!(matches!(err, IndexError::UnsupportedCharacter { .. }));
        assert_eq!(index.total_documents(), 0);
        assert!(index.search("fine").is_none());
        assert_eq!(index.generation(), before);
        assert_eq!(index.add_document("", &["x"]), Err(IndexError::EmptyDocumentId));
    }

    #[test]
    fn duplicate_id_in_one_batch_is_rejected() {
        let docs = vec![Document::new("d", ["x"]), Document::new("d", ["y"])];
        let err = InvertedIndex::build_from_documents(docs.clone()).unwrap_err();
        assert_eq!(err, IndexError::DuplicateDocument("d".into()));

        let (index, skipped) = InvertedIndex::build_lenient(docs);
        assert_eq!(skipped.len(), 1);
        assert_eq!(index.total_documents(), 1);
        assert!(index.search("y").is_none());
    }

    #[test]
    fn lenient_build_keeps_valid_documents() {
        let docs = vec![
            Document::new("good", ["graph"]),
            Document::new("bad", ["gr aph"]),
            Document::new("", ["heap"]),
        ];
        let (index, skipped) = InvertedIndex::build_lenient(docs);
        assert_eq!(skipped.len(), 2);
        // rejected documents are outside the corpus, so N stays 1
        assert_eq!(index.total_documents(), 1);
        assert!(!index.contains_document("bad"));
        assert!(index.search("graph").is_some());
    }

    #[test]
    fn overflowing_document_is_rejected_whole() {
        let mut index = InvertedIndex::new();
        index.insert("heap", "d1", u32::MAX).unwrap();
        let before = index.generation();
        let err = index.add_document("d1", &["graph", "heap"]).unwrap_err();
        assert_eq!(err, IndexError::CountOverflow { word: "heap".into(), doc_id: "d1".into() });
        assert!(index.search("graph").is_none());
        assert_eq!(index.search("heap").unwrap()["d1"], u32::MAX);
        assert_eq!(index.generation(), before);
    }

    #[test]
    fn rebuilding_accumulates() {
        let mut index = InvertedIndex::build_from_documents(corpus()).unwrap();
        index.index_documents(corpus()).unwrap();
        assert_eq!(index.total_documents(), 2);
        assert_eq!(index.search("a").unwrap()["doc1"], 4);
        assert_eq!(index.document_frequency("b"), 2);
    }

    #[test]
    fn direct_insert_maintains_statistics() {
        let mut index = InvertedIndex::new();
        index.insert("stack", "d1", 2).unwrap();
        index.insert("stack", "d1", 1).unwrap();
        index.insert("stack", "d2", 1).unwrap();
        assert_eq!(index.document_frequency("stack"), 2);
        assert_eq!(index.total_documents(), 2);
        assert_eq!(index.search("stack").unwrap()["d1"], 3);
        assert!(index.insert("stack", "d3", 0).is_err());
        assert!(!index.contains_document("d3"));
    }
}
