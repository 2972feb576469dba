//! Character-keyed prefix tree holding per-document occurrence counts at
//! word-terminal nodes.
//!
//! Insertion and lookup walk one edge per character, so both are
//! `O(len(word))` regardless of corpus size. Enumeration is an explicit
//! depth-first traversal over a heap-allocated frontier and never recurses,
//! so very long words cannot exhaust the call stack.

use crate::error::{IndexError, Result};
use crate::DocId;
use std::collections::HashMap;

/// Occurrence count of one word per document.
pub type DocCounts = HashMap<DocId, u32>;

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    /// Non-empty iff the path to this node spells an indexed word.
    doc_counts: DocCounts,
}

#[derive(Debug, Default)]
pub struct PrefixTree {
    root: TrieNode,
    words: usize,
    nodes: usize,
}

impl PrefixTree {
    pub fn new() -> Self { Self::default() }

    /// Adds `count` occurrences of `word` in `doc_id`.
    ///
    /// Counts for an existing `(word, doc_id)` pair accumulate. Returns `true`
    /// when the pair was not present before this call. Input is validated
    /// before any node is created, so a rejected insert leaves the tree
    /// untouched; a total that would exceed `u32::MAX` is rejected and the
    /// stored count is kept.
    pub fn insert(&mut self, word: &str, doc_id: &str, count: u32) -> Result<bool> {
        validate_word(word)?;
        if count == 0 {
            return Err(IndexError::ZeroCount { word: word.to_string(), doc_id: doc_id.to_string() });
        }

        let mut node = &mut self.root;
        for ch in word.chars() {
            let nodes = &mut self.nodes;
            node = node.children.entry(ch).or_insert_with(|| {
                *nodes += 1;
                TrieNode::default()
            });
        }

        if node.doc_counts.is_empty() {
            self.words += 1;
        }
        match node.doc_counts.get_mut(doc_id) {
            Some(existing) => {
                *existing = existing.checked_add(count).ok_or_else(|| IndexError::CountOverflow {
                    word: word.to_string(),
                    doc_id: doc_id.to_string(),
                })?;
                Ok(false)
            }
            None => {
                node.doc_counts.insert(doc_id.to_string(), count);
                Ok(true)
            }
        }
    }

    /// Document counts for `word`, or `None` if the word was never indexed.
    pub fn search(&self, word: &str) -> Option<&DocCounts> {
        let node = self.find(word)?;
        if node.doc_counts.is_empty() { None } else { Some(&node.doc_counts) }
    }

    /// Every indexed word, in unspecified order. Each call starts a fresh
    /// traversal.
    pub fn words(&self) -> Words<'_> {
        Words::starting_at(&self.root, Vec::new())
    }

    /// Indexed words beginning with `prefix` (including `prefix` itself when
    /// it is a word).
    pub fn words_with_prefix(&self, prefix: &str) -> Words<'_> {
        match self.find(prefix) {
            Some(node) => Words::starting_at(node, prefix.chars().collect()),
            None => Words::empty(),
        }
    }

    /// Number of distinct indexed words.
    pub fn len(&self) -> usize { self.words }

    pub fn is_empty(&self) -> bool { self.words == 0 }

    /// Number of nodes below the root.
    pub fn node_count(&self) -> usize { self.nodes }

    fn find(&self, path: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in path.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }
}

// The derived drop glue recurses once per level.
impl Drop for PrefixTree {
    fn drop(&mut self) {
        let mut pending: Vec<TrieNode> = self.root.children.drain().map(|(_, n)| n).collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain().map(|(_, n)| n));
        }
    }
}

pub(crate) fn validate_word(word: &str) -> Result<()> {
    if word.is_empty() {
        return Err(IndexError::EmptyWord);
    }
    if let Some(ch) = word.chars().find(|c| !c.is_alphanumeric()) {
        return Err(IndexError::UnsupportedCharacter { word: word.to_string(), ch });
    }
    Ok(())
}

/// Lazy depth-first walk over a subtree.
///
/// The frontier holds `(depth, edge, node)` triples; `path` is shared and is
/// truncated back to `depth` before each edge is pushed.
pub struct Words<'a> {
    path: Vec<char>,
    stack: Vec<(usize, Option<char>, &'a TrieNode)>,
}

impl<'a> Words<'a> {
    fn starting_at(node: &'a TrieNode, path: Vec<char>) -> Self {
        let depth = path.len();
        Self { path, stack: vec![(depth, None, node)] }
    }

    fn empty() -> Self {
        Self { path: Vec::new(), stack: Vec::new() }
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((depth, edge, node)) = self.stack.pop() {
            self.path.truncate(depth);
            if let Some(ch) = edge {
                self.path.push(ch);
            }
            let child_depth = self.path.len();
            self.stack
                .extend(node.children.iter().map(|(ch, child)| (child_depth, Some(*ch), child)));
            if !node.doc_counts.is_empty() {
                return Some(self.path.iter().collect());
            }
        }
        None
    }
}
