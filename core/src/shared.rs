use crate::index::{SearchMatch, WordIndex};
use crate::lock::ReadWriteLock;
use std::collections::BTreeMap;

/// Thread-safe wrapper around [`WordIndex`].
///
/// Composition, not inheritance: the wrapper holds the unsynchronized engine
/// behind a [`ReadWriteLock`] and exposes only guarded operations. Anything
/// that needs several engine calls does them on the inner index under one
/// acquisition, never back through the guarded surface, so the wrapper can
/// never deadlock on itself.
pub struct SharedWordIndex {
    inner: ReadWriteLock<WordIndex>,
}

impl Default for SharedWordIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedWordIndex {
    pub fn new() -> Self {
        Self {
            inner: ReadWriteLock::new(WordIndex::new()),
        }
    }

    pub fn add(&self, word: &str, path: &str, position: usize) {
        self.inner.write().add(word, path, position);
    }

    /// Imports all entries of a caller-owned local index under a single
    /// write acquisition, so lock contention is once per task regardless of
    /// document size.
    pub fn merge_from(&self, local: WordIndex) {
        self.inner.write().merge_from(local);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word)
    }

    pub fn count(&self, word: &str, path: &str) -> usize {
        self.inner.read().count(word, path)
    }

    pub fn word_count(&self) -> usize {
        self.inner.read().word_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn copy_words(&self) -> Vec<String> {
        self.inner.read().copy_words()
    }

    pub fn copy_paths(&self, word: &str) -> Vec<String> {
        self.inner.read().copy_paths(word)
    }

    pub fn copy_positions(&self, word: &str, path: &str) -> Vec<usize> {
        self.inner.read().copy_positions(word, path)
    }

    pub fn exact_search(&self, terms: &[String]) -> Vec<SearchMatch> {
        self.inner.read().exact_search(terms)
    }

    pub fn partial_search(&self, terms: &[String]) -> Vec<SearchMatch> {
        self.inner.read().partial_search(terms)
    }

    /// Fully sorted snapshot taken under one read acquisition.
    pub fn export_sorted(&self) -> BTreeMap<String, BTreeMap<String, Vec<usize>>> {
        self.inner.read().export_sorted()
    }
}
