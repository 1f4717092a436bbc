//! Bounded merge queue driving best-first retrieval.
//!
//! The queue holds a frontier of unexpanded nodes and ready items, always in
//! non-increasing score order. Expanding a node merges its (already sorted)
//! children or items into the frontier in linear time, so results come out in
//! score order without sorting the whole subtree.
//!
//! Every queued item is already known to match the query; the caller filters
//! items before handing them to [`MergeQueue::merge`].

use std::collections::{HashSet, VecDeque};

use crate::item::{Item, SearchOptions};
use crate::node::IndexNode;

/// A frontier element.
pub(crate) enum Entry<'a, V> {
    /// A subtree that has not been expanded yet.
    Node(&'a mut IndexNode<V>),
    /// A matching item, ready to be emitted.
    Item(&'a Item<V>),
}

impl<V> Entry<'_, V> {
    #[inline]
    fn score(&self) -> f64 {
        match self {
            Entry::Node(node) => node.score(),
            Entry::Item(item) => item.score,
        }
    }
}

/// Output of a search: applies the `unique` and `limit` policy.
pub(crate) struct ResultSink<'a, V> {
    results: Vec<&'a V>,
    limit: Option<usize>,
    /// Distinct identities already emitted; `None` unless `unique` is set.
    seen: Option<HashSet<&'a str>>,
}

impl<'a, V> ResultSink<'a, V> {
    pub(crate) fn new(options: SearchOptions) -> Self {
        let capacity = options.limit.unwrap_or(16).min(64);
        Self {
            results: Vec::with_capacity(capacity),
            limit: options.limit,
            seen: options.unique.then(HashSet::new),
        }
    }

    /// Number of values still wanted, `None` when unbounded.
    #[inline]
    pub(crate) fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.results.len()))
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.remaining() == Some(0)
    }

    #[inline]
    fn is_unique(&self) -> bool {
        self.seen.is_some()
    }

    #[inline]
    fn has_emitted(&self, distinct: &str) -> bool {
        self.seen.as_ref().is_some_and(|seen| seen.contains(distinct))
    }

    /// Emit `item` unless it duplicates an emitted identity. Returns `true`
    /// once the limit has been reached.
    pub(crate) fn offer(&mut self, item: &'a Item<V>) -> bool {
        if self.is_full() {
            return true;
        }
        if let Some(seen) = &mut self.seen {
            if !seen.insert(item.distinct_key()) {
                return false;
            }
        }
        self.results.push(&item.value);
        self.is_full()
    }

    pub(crate) fn into_results(self) -> Vec<&'a V> {
        self.results
    }
}

/// Frontier of pending entries, descending by score.
pub(crate) struct MergeQueue<'a, V> {
    pending: VecDeque<Entry<'a, V>>,
}

impl<'a, V> MergeQueue<'a, V> {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Remove and return the highest scoring entry.
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<Entry<'a, V>> {
        self.pending.pop_front()
    }

    /// Merge a batch that is already sorted by descending score.
    ///
    /// On equal scores, entries that were already pending stay first. After
    /// merging, entries that can no longer contribute to the result are
    /// dropped (see [`MergeQueue::bound`]).
    pub(crate) fn merge<I>(&mut self, batch: I, sink: &ResultSink<'a, V>)
    where
        I: IntoIterator<Item = Entry<'a, V>>,
    {
        let mut batch = batch.into_iter().peekable();
        if batch.peek().is_none() {
            return;
        }

        let mut merged = VecDeque::with_capacity(self.pending.len() + batch.size_hint().0);
        while let Some(head) = self.pending.front() {
            let take_batch = matches!(batch.peek(), Some(next) if next.score() > head.score());
            let entry = if take_batch {
                batch.next()
            } else {
                self.pending.pop_front()
            };
            merged.extend(entry);
        }
        merged.extend(batch);
        self.pending = merged;

        self.bound(sink);
    }

    /// Truncate the frontier once its head alone is guaranteed to fill the
    /// remaining limit.
    ///
    /// Only items count toward the bound. A pending node may turn out to be
    /// empty or to hold nothing but duplicates, so it guarantees nothing. An
    /// item counts when its distinct identity has not been emitted and no
    /// earlier pending item shares it; whatever comes out first for that
    /// identity, it comes out no later than this item.
    fn bound(&mut self, sink: &ResultSink<'a, V>) {
        let Some(needed) = sink.remaining() else {
            return;
        };
        if needed == 0 {
            self.pending.clear();
            return;
        }

        let mut guaranteed = 0usize;
        let mut fresh: HashSet<&'a str> = HashSet::new();
        let mut cut = None;
        for (i, entry) in self.pending.iter().enumerate() {
            let Entry::Item(item) = entry else {
                continue;
            };
            let item: &'a Item<V> = *item;
            let counts = if sink.is_unique() {
                let distinct = item.distinct_key();
                !sink.has_emitted(distinct) && fresh.insert(distinct)
            } else {
                true
            };
            if counts {
                guaranteed += 1;
                if guaranteed == needed {
                    cut = Some(i + 1);
                    break;
                }
            }
        }

        if let Some(cut) = cut {
            self.pending.truncate(cut);
        }
    }
}
