//! Flat list baseline.
//!
//! Stores every item in one `Vec` and answers queries with a linear scan. It
//! is correct and simple, which makes it the reference point for the index.

use std::collections::HashSet;

use autocomplete_rs::{Item, SearchOptions};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatListError {
    #[error("list was modified since the last sort; call `sort` first")]
    Unsorted,
}

/// Every item in insertion order, or in descending score order after
/// [`FlatList::sort`].
#[derive(Debug, Clone)]
pub struct FlatList<V> {
    items: Vec<Item<V>>,
    sorted: bool,
}

impl<V> Default for FlatList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FlatList<V> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            sorted: true,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn add(&mut self, item: Item<V>) {
        self.items.push(item);
        self.sorted = false;
    }

    /// Remove every item with this key and distinct identity (`distinct`
    /// defaults to `key`). Returns the number removed.
    pub fn remove(&mut self, key: &str, distinct: Option<&str>) -> usize {
        let distinct = distinct.unwrap_or(key);
        let before = self.items.len();
        self.items
            .retain(|item| item.key != key || item.distinct_key() != distinct);
        before - self.items.len()
    }

    /// Sort by descending score. Equal scores keep insertion order.
    pub fn sort(&mut self) {
        if self.sorted {
            return;
        }
        self.items.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.sorted = true;
    }

    /// Filter, then sort the matches. Works whether or not the list is sorted.
    pub fn unsorted_prefix_search(&self, prefix: &str, options: SearchOptions) -> Vec<&V> {
        let mut matches: Vec<&Item<V>> = self
            .items
            .iter()
            .filter(|item| item.key.starts_with(prefix))
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        collect(matches, options)
    }

    /// Scan the sorted list, stopping as soon as `limit` values are found.
    pub fn sorted_prefix_search(
        &self,
        prefix: &str,
        options: SearchOptions,
    ) -> Result<Vec<&V>, FlatListError> {
        self.sorted_scan(|key| key.starts_with(prefix), options)
    }

    /// Like [`sorted_prefix_search`](Self::sorted_prefix_search), but matches
    /// `needle` anywhere in the key.
    pub fn sorted_substring_search(
        &self,
        needle: &str,
        options: SearchOptions,
    ) -> Result<Vec<&V>, FlatListError> {
        self.sorted_scan(|key| key.contains(needle), options)
    }

    fn sorted_scan(
        &self,
        matches: impl Fn(&str) -> bool,
        options: SearchOptions,
    ) -> Result<Vec<&V>, FlatListError> {
        if !self.sorted {
            return Err(FlatListError::Unsorted);
        }
        Ok(collect(
            self.items.iter().filter(|item| matches(&item.key)),
            options,
        ))
    }
}

impl<V> Extend<Item<V>> for FlatList<V> {
    fn extend<I: IntoIterator<Item = Item<V>>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

/// Apply `unique` and `limit` to matches already in descending score order.
fn collect<'a, V>(
    ranked: impl IntoIterator<Item = &'a Item<V>>,
    options: SearchOptions,
) -> Vec<&'a V> {
    let limit = options.limit.unwrap_or(usize::MAX);
    let mut seen = HashSet::new();
    ranked
        .into_iter()
        .filter(|item| !options.unique || seen.insert(item.distinct_key()))
        .take(limit)
        .map(|item| &item.value)
        .collect()
}
