//! Value envelope and query/index configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fan-out width used when none (or zero) is configured.
pub const DEFAULT_MAX_FANOUT_WIDTH: usize = 500;

/// An entry in the index.
///
/// `score` should be non-negative; an empty subtree reports a score of `0.0`
/// and negative scores are ranked as if they were zero for pruning purposes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item<V> {
    /// The string prefix searches match against.
    pub key: String,
    /// Rank of this item. Higher scores are returned first.
    pub score: f64,
    /// Opaque payload returned by searches.
    pub value: V,
    /// Identity used by `unique` searches. Defaults to `key` when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub distinct: Option<String>,
}

impl<V> Item<V> {
    pub fn new(key: impl Into<String>, score: f64, value: V) -> Self {
        Self {
            key: key.into(),
            score,
            value,
            distinct: None,
        }
    }

    /// Set the identity shared by items that represent the same logical value
    /// under different keys (e.g. a contact indexed by name and by email).
    pub fn with_distinct(mut self, distinct: impl Into<String>) -> Self {
        self.distinct = Some(distinct.into());
        self
    }

    /// The effective distinct identity: `distinct`, or `key` when unset.
    #[inline]
    pub fn distinct_key(&self) -> &str {
        self.distinct.as_deref().unwrap_or(&self.key)
    }
}

/// Options for a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchOptions {
    /// Return at most one value per distinct identity (the highest scoring).
    pub unique: bool,
    /// Maximum number of values to return. `None` is unbounded.
    pub limit: Option<usize>,
}

impl SearchOptions {
    /// Unbounded, non-unique search.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Configuration for an [`AutocompleteIndex`](crate::AutocompleteIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndexOptions {
    /// Number of items a leaf may hold before it fans out by next character.
    ///
    /// Larger widths make inserts cheaper and the first query against a newly
    /// dense prefix slower. Later queries are unaffected. Zero means
    /// [`DEFAULT_MAX_FANOUT_WIDTH`].
    pub max_fanout_width: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            max_fanout_width: DEFAULT_MAX_FANOUT_WIDTH,
        }
    }
}

impl IndexOptions {
    pub fn with_max_fanout_width(mut self, width: usize) -> Self {
        self.max_fanout_width = width;
        self
    }

    /// The width actually used by the index.
    pub(crate) fn effective_width(&self) -> usize {
        if self.max_fanout_width == 0 {
            DEFAULT_MAX_FANOUT_WIDTH
        } else {
            self.max_fanout_width
        }
    }
}
