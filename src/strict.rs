//! An index wrapper that re-validates every invariant after each call.

use crate::{AutocompleteIndex, IndexOptions, InvariantResult, Item, SearchOptions};

/// Wraps an [`AutocompleteIndex`] and checks its invariants after every
/// operation, panicking on the first violation.
///
/// Every call walks the whole tree, so this is for tests and debugging, not
/// production traffic.
#[derive(Debug, Clone)]
pub struct StrictIndex<V> {
    inner: AutocompleteIndex<V>,
}

impl<V> Default for StrictIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> StrictIndex<V> {
    pub fn new() -> Self {
        Self::wrap(AutocompleteIndex::new())
    }

    pub fn with_options(options: IndexOptions) -> Self {
        Self::wrap(AutocompleteIndex::with_options(options))
    }

    /// Wrap an existing index, validating it first.
    pub fn wrap(inner: AutocompleteIndex<V>) -> Self {
        let strict = Self { inner };
        strict.check("wrap");
        strict
    }

    pub fn inner(&self) -> &AutocompleteIndex<V> {
        &self.inner
    }

    pub fn into_inner(self) -> AutocompleteIndex<V> {
        self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn add(&mut self, item: Item<V>) {
        self.inner.add(item);
        self.check("add");
    }

    pub fn remove(&mut self, key: &str, distinct: Option<&str>) -> usize {
        let removed = self.inner.remove(key, distinct);
        self.check("remove");
        removed
    }

    /// Like [`AutocompleteIndex::prefix_search`], returning owned values so
    /// the sorted tree can be validated before returning.
    pub fn prefix_search(&mut self, prefix: &str, options: SearchOptions) -> Vec<V>
    where
        V: Clone,
    {
        let results: Vec<V> = self
            .inner
            .prefix_search(prefix, options)
            .into_iter()
            .cloned()
            .collect();
        self.check("prefix_search");
        results
    }

    pub fn exact_search(&mut self, key: &str, options: SearchOptions) -> Vec<V>
    where
        V: Clone,
    {
        let results: Vec<V> = self
            .inner
            .exact_search(key, options)
            .into_iter()
            .cloned()
            .collect();
        self.check("exact_search");
        results
    }

    pub fn validate_invariants(&self) -> InvariantResult {
        self.inner.validate_invariants()
    }

    fn check(&self, operation: &str) {
        if let Err(err) = self.inner.validate_invariants() {
            tracing::error!(operation, error = %err, "index invariant violated");
            panic!("index invariant violated after {operation}: {err}");
        }
    }
}
