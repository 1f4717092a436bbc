//! Adaptive trie node.
//!
//! A node starts as a flat leaf holding items directly. A leaf that grows past
//! the configured fan-out width is converted, once, into an internal node with
//! one child per next character of its keys. Keys that end exactly at the
//! node's depth go to the [`Branch::End`] child.
//!
//! Every node caches the best score in its subtree. Local order (items of a
//! leaf, children of an internal node) is sorted lazily, on the first read
//! after a mutation, so bulk inserts never pay for sorting subtrees that are
//! never queried.
//!
//! Depth is a byte offset into the key. Branching is per `char`, so every node
//! boundary falls on a char boundary.
//!
//! `insert`, `remove` and `validate` recurse once per character of the key.
//! The read path (`find_prefix_mut`, `find_exact_mut`, `best_first`) is
//! iterative.

use std::collections::HashMap;
use std::mem;

use crate::error::{InvariantError, InvariantResult};
use crate::item::{Item, SearchOptions};
use crate::queue::{Entry, MergeQueue, ResultSink};

// =============================================================================
// Branches
// =============================================================================

/// Edge label from a node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Branch {
    /// The key is exhausted at this depth.
    End,
    Char(char),
}

impl Branch {
    /// Branch taken by `key` at byte offset `depth`, and the child's depth.
    #[inline]
    fn of(key: &str, depth: usize) -> (Branch, usize) {
        match key.get(depth..).and_then(|rest| rest.chars().next()) {
            Some(c) => (Branch::Char(c), depth + c.len_utf8()),
            // Past the end of every key below; such a child never splits.
            None => (Branch::End, depth + 1),
        }
    }

    fn push_onto(self, path: &mut String) {
        if let Branch::Char(c) = self {
            path.push(c);
        }
    }
}

// =============================================================================
// Children
// =============================================================================

#[derive(Debug, Clone)]
struct Children<V> {
    /// Children in cached order. Descending by score while the owner is sorted.
    order: Vec<(Branch, IndexNode<V>)>,
    /// Position of each branch in `order`.
    lookup: HashMap<Branch, usize>,
}

impl<V> Children<V> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    #[cfg(test)]
    fn get(&self, branch: Branch) -> Option<&IndexNode<V>> {
        let &pos = self.lookup.get(&branch)?;
        self.order.get(pos).map(|(_, child)| child)
    }

    fn get_mut(&mut self, branch: Branch) -> Option<&mut IndexNode<V>> {
        let &pos = self.lookup.get(&branch)?;
        self.order.get_mut(pos).map(|(_, child)| child)
    }

    fn get_or_insert(&mut self, branch: Branch) -> &mut IndexNode<V> {
        let pos = match self.lookup.get(&branch) {
            Some(&pos) => pos,
            None => {
                let pos = self.order.len();
                self.order.push((branch, IndexNode::new()));
                self.lookup.insert(branch, pos);
                pos
            }
        };
        &mut self.order[pos].1
    }

    fn max_score(&self) -> f64 {
        self.order
            .iter()
            .fold(0.0, |best, (_, child)| max_score(best, child.score))
    }

    fn sort(&mut self) {
        self.order
            .sort_by(|(_, a), (_, b)| b.score.total_cmp(&a.score));
        for (pos, (branch, _)) in self.order.iter().enumerate() {
            self.lookup.insert(*branch, pos);
        }
    }
}

#[inline]
fn max_score(best: f64, score: f64) -> f64 {
    if score > best {
        score
    } else {
        best
    }
}

// =============================================================================
// IndexNode
// =============================================================================

#[derive(Debug, Clone)]
enum Slots<V> {
    Leaf(Vec<Item<V>>),
    Internal(Children<V>),
}

/// A node of the autocomplete trie.
#[derive(Debug, Clone)]
pub(crate) struct IndexNode<V> {
    /// Best score reachable below this node, `0.0` when empty.
    score: f64,
    /// Local order is non-increasing by score.
    sorted: bool,
    slots: Slots<V>,
}

impl<V> Default for IndexNode<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IndexNode<V> {
    pub(crate) fn new() -> Self {
        Self {
            score: 0.0,
            sorted: true,
            slots: Slots::Leaf(Vec::new()),
        }
    }

    #[inline]
    pub(crate) fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.slots, Slots::Leaf(_))
    }

    /// Insert `item`, where `depth` bytes of its key were consumed by ancestors.
    pub(crate) fn insert(&mut self, item: Item<V>, depth: usize, max_width: usize) {
        self.score = max_score(self.score, item.score);
        self.sorted = false;

        if let Slots::Leaf(items) = &self.slots {
            if items.len() > max_width && depth < item.key.len() {
                self.split(depth, max_width);
            }
        }

        match &mut self.slots {
            Slots::Leaf(items) => items.push(item),
            Slots::Internal(children) => {
                let (branch, next) = Branch::of(&item.key, depth);
                children
                    .get_or_insert(branch)
                    .insert(item, next, max_width);
            }
        }
    }

    /// Convert this leaf into an internal node, pushing every item one level
    /// down under its branch.
    fn split(&mut self, depth: usize, max_width: usize) {
        let Slots::Leaf(items) = &mut self.slots else {
            return;
        };
        let items = mem::take(items);
        tracing::trace!(depth, items = items.len(), "fanning out leaf");

        let mut children = Children::new();
        for item in items {
            let (branch, next) = Branch::of(&item.key, depth);
            children
                .get_or_insert(branch)
                .insert(item, next, max_width);
        }
        self.slots = Slots::Internal(children);
    }

    /// Remove every item whose key is `key` and whose effective distinct
    /// identity is `distinct`. Returns the number of items removed.
    pub(crate) fn remove(&mut self, key: &str, distinct: &str, depth: usize) -> usize {
        let removed = match &mut self.slots {
            Slots::Leaf(items) => {
                let before = items.len();
                items.retain(|item| item.key != key || item.distinct_key() != distinct);
                // `retain` preserves order, so a sorted leaf stays sorted.
                before - items.len()
            }
            Slots::Internal(children) => {
                let (branch, next) = Branch::of(key, depth);
                match children.get_mut(branch) {
                    Some(child) => {
                        let removed = child.remove(key, distinct, next);
                        if removed > 0 {
                            self.sorted = false;
                        }
                        removed
                    }
                    None => 0,
                }
            }
        };

        if removed > 0 {
            self.score = self.local_max_score();
        }
        removed
    }

    fn local_max_score(&self) -> f64 {
        match &self.slots {
            Slots::Leaf(items) => items
                .iter()
                .fold(0.0, |best, item| max_score(best, item.score)),
            Slots::Internal(children) => children.max_score(),
        }
    }

    /// Sort local order if a mutation invalidated it.
    pub(crate) fn sort(&mut self) {
        if self.sorted {
            return;
        }
        match &mut self.slots {
            // Stable, so equal scores keep insertion order.
            Slots::Leaf(items) => items.sort_by(|a, b| b.score.total_cmp(&a.score)),
            Slots::Internal(children) => children.sort(),
        }
        self.sorted = true;
    }

    fn child_mut(&mut self, branch: Branch) -> Option<&mut Self> {
        match &mut self.slots {
            Slots::Leaf(_) => None,
            Slots::Internal(children) => children.get_mut(branch),
        }
    }

    /// The node covering every key that starts with `prefix`.
    ///
    /// Stops early at a leaf, which stands for everything below it; callers
    /// must still filter its items by key.
    pub(crate) fn find_prefix_mut(&mut self, prefix: &str) -> Option<&mut Self> {
        let mut node = self;
        let mut depth = 0;
        loop {
            if depth >= prefix.len() || node.is_leaf() {
                return Some(node);
            }
            let ch = prefix[depth..].chars().next()?;
            node = node.child_mut(Branch::Char(ch))?;
            depth += ch.len_utf8();
        }
    }

    /// The node covering keys equal to `key`.
    ///
    /// Like [`find_prefix_mut`](Self::find_prefix_mut), but once `key` is
    /// consumed at an internal node it continues into the `End` child, so
    /// subtrees holding longer keys are never visited.
    pub(crate) fn find_exact_mut(&mut self, key: &str) -> Option<&mut Self> {
        let mut node = self;
        let mut depth = 0;
        loop {
            if node.is_leaf() {
                return Some(node);
            }
            let (branch, next) = Branch::of(key, depth);
            node = node.child_mut(branch)?;
            if branch == Branch::End {
                return Some(node);
            }
            depth = next;
        }
    }

    // =========================================================================
    // Best-first enumeration
    // =========================================================================

    /// Values of items below this node whose key satisfies `matches`, in
    /// descending score order, subject to `options`.
    ///
    /// Work is bounded by the limit rather than by subtree size: a subtree is
    /// only expanded once its best score reaches the head of the frontier.
    pub(crate) fn best_first<'a, F>(&'a mut self, matches: F, options: SearchOptions) -> Vec<&'a V>
    where
        F: Fn(&str) -> bool,
    {
        let mut sink = ResultSink::new(options);
        if sink.is_full() {
            return sink.into_results();
        }

        if self.is_leaf() {
            self.sort();
            let node: &'a Self = self;
            if let Slots::Leaf(items) = &node.slots {
                for item in items {
                    if matches(&item.key) && sink.offer(item) {
                        break;
                    }
                }
            }
            return sink.into_results();
        }

        let mut queue = MergeQueue::new();
        queue.merge([Entry::Node(self)], &sink);
        while let Some(entry) = queue.pop() {
            match entry {
                Entry::Node(node) => {
                    node.sort();
                    match &mut node.slots {
                        Slots::Leaf(items) => {
                            let items: &'a Vec<Item<V>> = items;
                            let batch = items
                                .iter()
                                .filter(|item| matches(&item.key))
                                .map(Entry::Item);
                            queue.merge(batch, &sink);
                        }
                        Slots::Internal(children) => {
                            let batch = children
                                .order
                                .iter_mut()
                                .map(|(_, child)| Entry::Node(child));
                            queue.merge(batch, &sink);
                        }
                    }
                }
                Entry::Item(item) => {
                    if sink.offer(item) {
                        break;
                    }
                }
            }
        }
        sink.into_results()
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Check structural invariants below this node, whose path from the root
    /// is `path`. Returns the number of items reachable from here.
    pub(crate) fn validate(&self, path: &mut String) -> InvariantResult<usize> {
        let count = match &self.slots {
            Slots::Leaf(items) => {
                if let Some(item) = items.iter().find(|item| !item.key.starts_with(path.as_str())) {
                    return Err(InvariantError::KeyOutsidePath {
                        path: path.clone(),
                        key: item.key.clone(),
                    });
                }
                if self.sorted {
                    if let Some(pos) = items.windows(2).position(|w| w[0].score < w[1].score) {
                        return Err(InvariantError::UnsortedNode {
                            path: path.clone(),
                            position: pos + 1,
                        });
                    }
                }
                items.len()
            }
            Slots::Internal(children) => {
                if children.lookup.len() != children.order.len() {
                    return Err(InvariantError::ChildIndexMismatch {
                        path: path.clone(),
                        detail: format!(
                            "{} lookup entries for {} children",
                            children.lookup.len(),
                            children.order.len()
                        ),
                    });
                }

                let mut count = 0;
                for (pos, (branch, child)) in children.order.iter().enumerate() {
                    if children.lookup.get(branch) != Some(&pos) {
                        return Err(InvariantError::ChildIndexMismatch {
                            path: path.clone(),
                            detail: format!("{branch:?} is not looked up at position {pos}"),
                        });
                    }
                    let len = path.len();
                    branch.push_onto(path);
                    count += child.validate(path)?;
                    path.truncate(len);
                }

                if self.sorted {
                    if let Some(pos) = children
                        .order
                        .windows(2)
                        .position(|w| w[0].1.score < w[1].1.score)
                    {
                        return Err(InvariantError::UnsortedNode {
                            path: path.clone(),
                            position: pos + 1,
                        });
                    }
                }
                count
            }
        };

        let actual = self.local_max_score();
        if self.score != actual {
            return Err(InvariantError::ScoreMismatch {
                path: path.clone(),
                cached: self.score,
                actual,
            });
        }
        Ok(count)
    }

    /// Approximate heap bytes owned by this subtree, excluding the node itself
    /// and anything the values point to.
    pub(crate) fn heap_bytes(&self) -> usize {
        match &self.slots {
            Slots::Leaf(items) => {
                items.capacity() * mem::size_of::<Item<V>>()
                    + items
                        .iter()
                        .map(|item| {
                            item.key.capacity()
                                + item.distinct.as_ref().map_or(0, String::capacity)
                        })
                        .sum::<usize>()
            }
            Slots::Internal(children) => {
                children.order.capacity() * mem::size_of::<(Branch, IndexNode<V>)>()
                    + children.lookup.capacity()
                        * (mem::size_of::<Branch>() + mem::size_of::<usize>())
                    + children
                        .order
                        .iter()
                        .map(|(_, child)| child.heap_bytes())
                        .sum::<usize>()
            }
        }
    }

    #[cfg(test)]
    fn child(&self, branch: Branch) -> Option<&Self> {
        match &self.slots {
            Slots::Leaf(_) => None,
            Slots::Internal(children) => children.get(branch),
        }
    }

    #[cfg(test)]
    fn local_len(&self) -> usize {
        match &self.slots {
            Slots::Leaf(items) => items.len(),
            Slots::Internal(children) => children.order.len(),
        }
    }
}
