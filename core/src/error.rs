use crate::DocId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

/// Invalid input rejected at insertion time.
///
/// An error is fatal to the single insertion that produced it; nothing is
/// written to the index before validation passes, so the caller may skip the
/// entry and keep building.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("word is empty")]
    EmptyWord,

    #[error("word {word:?} contains unsupported character {ch:?}")]
    UnsupportedCharacter { word: String, ch: char },

    #[error("count for {word:?} in document {doc_id:?} must be at least 1")]
    ZeroCount { word: String, doc_id: DocId },

    #[error("count for {word:?} in document {doc_id:?} overflows")]
    CountOverflow { word: String, doc_id: DocId },

    #[error("document identifier is empty")]
    EmptyDocumentId,

    #[error("document {0:?} appears more than once in the same build")]
    DuplicateDocument(DocId),
}
