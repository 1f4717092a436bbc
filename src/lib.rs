//! # autocomplete-rs
//!
//! Weighted prefix autocompletion: given a prefix, return the best scoring
//! values whose keys start with it.
//!
//! The index is an adaptive trie. Small subtrees are kept as flat, lazily
//! sorted lists; a list that grows past the fan-out width is split by next
//! character. Each node caches the best score beneath it, and queries run a
//! best-first search over those scores, so the cost of a query is driven by
//! the requested `limit` rather than by the size of the index.
//!
//! ## Example
//!
//! ```rust
//! use autocomplete_rs::{AutocompleteIndex, Item, SearchOptions};
//!
//! let mut index = AutocompleteIndex::new();
//! index.add(Item::new("ada lovelace", 3.0, "ada"));
//! index.add(Item::new("alan turing", 5.0, "alan"));
//! index.add(Item::new("grace hopper", 4.0, "grace"));
//!
//! let top = index.prefix_search("a", SearchOptions::new().with_limit(1));
//! assert_eq!(top, vec![&"alan"]);
//! ```
//!
//! Queries take `&mut self`: the first read after a mutation sorts the nodes
//! it touches. The index performs no locking; share it behind a lock if
//! several threads need it.

pub mod error;
pub mod item;
mod node;
mod queue;
pub mod strict;

pub use error::{InvariantError, InvariantResult};
pub use item::{IndexOptions, Item, SearchOptions, DEFAULT_MAX_FANOUT_WIDTH};
pub use strict::StrictIndex;

use node::IndexNode;

/// An in-memory index answering top-K prefix queries.
#[derive(Debug, Clone)]
pub struct AutocompleteIndex<V> {
    root: IndexNode<V>,
    max_fanout_width: usize,
    len: usize,
}

impl<V> AutocompleteIndex<V> {
    /// Create an empty index with the default fan-out width.
    pub fn new() -> Self {
        Self::with_options(IndexOptions::default())
    }

    /// Create an empty index with the given options.
    ///
    /// A zero `max_fanout_width` falls back to [`DEFAULT_MAX_FANOUT_WIDTH`].
    pub fn with_options(options: IndexOptions) -> Self {
        if options.max_fanout_width == 0 {
            tracing::debug!(
                default = DEFAULT_MAX_FANOUT_WIDTH,
                "max_fanout_width of 0 replaced by default"
            );
        }
        Self {
            root: IndexNode::new(),
            max_fanout_width: options.effective_width(),
            len: 0,
        }
    }

    #[inline]
    pub fn max_fanout_width(&self) -> usize {
        self.max_fanout_width
    }

    /// Number of items stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add an item. Items with equal keys are kept side by side.
    pub fn add(&mut self, item: Item<V>) {
        self.root.insert(item, 0, self.max_fanout_width);
        self.len += 1;
    }

    /// Remove every item with this key and distinct identity.
    ///
    /// `distinct` defaults to `key`, matching how [`Item::distinct_key`]
    /// resolves an absent identity. Returns the number of items removed;
    /// removing something that is not there is a no-op.
    pub fn remove(&mut self, key: &str, distinct: Option<&str>) -> usize {
        let removed = self.root.remove(key, distinct.unwrap_or(key), 0);
        self.len -= removed;
        removed
    }

    /// Values of items whose key starts with `prefix`, best score first.
    pub fn prefix_search(&mut self, prefix: &str, options: SearchOptions) -> Vec<&V> {
        let Some(node) = self.root.find_prefix_mut(prefix) else {
            tracing::trace!(prefix, "no node covers prefix");
            return Vec::new();
        };
        let results = node.best_first(|key| key.starts_with(prefix), options);
        tracing::trace!(prefix, results = results.len(), "prefix search");
        results
    }

    /// Values of items whose key equals `key`, best score first.
    pub fn exact_search(&mut self, key: &str, options: SearchOptions) -> Vec<&V> {
        let Some(node) = self.root.find_exact_mut(key) else {
            tracing::trace!(key, "no node covers key");
            return Vec::new();
        };
        let results = node.best_first(|candidate| candidate == key, options);
        tracing::trace!(key, results = results.len(), "exact search");
        results
    }

    /// Check every structural invariant of the tree.
    ///
    /// This walks the whole index and is meant for tests and debugging; see
    /// [`StrictIndex`] for a wrapper that runs it after every call.
    pub fn validate_invariants(&self) -> InvariantResult {
        let actual = self.root.validate(&mut String::new())?;
        if actual != self.len {
            return Err(InvariantError::LengthMismatch {
                cached: self.len,
                actual,
            });
        }
        Ok(())
    }

    /// Approximate bytes used by the index structure and its keys.
    ///
    /// Heap memory owned by values is not included.
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.root.heap_bytes()
    }
}

impl<V> Default for AutocompleteIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Extend<Item<V>> for AutocompleteIndex<V> {
    fn extend<I: IntoIterator<Item = Item<V>>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<V> FromIterator<Item<V>> for AutocompleteIndex<V> {
    fn from_iter<I: IntoIterator<Item = Item<V>>>(iter: I) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}


#[cfg(test)]
mod proptests;
