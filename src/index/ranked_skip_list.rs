//! Ranked Skip List
//!
//! An ordered skip list that answers "what is the 1-based rank of this
//! value?" and "which values sit at ranks `[start, start + count)`?" in
//! O(log n) expected time, while supporting O(log n) insert and remove.
//!
//! # Span Semantics
//!
//! Every forward link carries a span: the number of level-0 positions it
//! advances. The head sits at position 0, the first value at position 1, and
//! a link that runs off the end points at the virtual position `len + 1`.
//!
//! - `node.span[level]` = position of `node.next[level]` - position of `node`
//! - Summing the spans along any path from the head gives the rank of the
//!   node the path ends at.
//!
//! # Structure
//!
//! ```text
//! Level 2: HEAD -(2)-----------> B -(4)--------------------------> END
//! Level 1: HEAD -(1)-> A -(1)-> B -(2)-------> D -(2)-----------> END
//! Level 0: HEAD -(1)-> A -(1)-> B -(1)-> C -(1)-> D -(1)-> E -(1)-> END
//! ```
//!
//! Nodes live in an arena and refer to each other by `u32` index. Each node
//! owns exactly `level + 1` links. The head owns one link per level that
//! exists anywhere in the list, and the list's level never shrinks.
//!
//! # Operations
//!
//! - `insert(value)`: O(log n) - returns the new value's rank
//! - `remove(&value)`: O(log n) - removes the first value comparing equal
//! - `rank(&value)`: O(log n) - 1-based rank, `None` if absent
//! - `range(start, count)`: O(log n + count) - values by rank
//! - `get_by_rank(rank)`: O(log n)

use std::cmp::Ordering;
use std::fmt;
use std::ops::ControlFlow;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::{SmallVec, smallvec};
use tracing::trace;

use super::range::RankRange;
use super::{IndexConfig, MAX_LEVEL};

/// Node index type. u32 saves space vs usize on 64-bit.
pub(super) type Idx = u32;

/// Null index marker.
pub(super) const NULL: Idx = Idx::MAX;

/// The head always occupies the first arena slot.
const HEAD: Idx = 0;

/// A node in the ranked skip list.
struct Node<T> {
    /// `None` for the head and for slots on the free list.
    item: Option<T>,
    /// Forward links, one per level from 0 up to this node's level.
    next: SmallVec<[Idx; 4]>,
    /// Span of each forward link.
    span: SmallVec<[usize; 4]>,
}

impl<T> Node<T> {
    fn new(level: usize, item: T) -> Self {
        Node {
            item: Some(item),
            next: smallvec![NULL; level + 1],
            span: smallvec![0; level + 1],
        }
    }

    fn new_head() -> Self {
        // Empty list: the only link runs straight to position 1.
        Node {
            item: None,
            next: smallvec![NULL],
            span: smallvec![1],
        }
    }

    fn level(&self) -> usize {
        self.next.len() - 1
    }
}

/// An ordered skip list with order statistics.
///
/// Values are kept sorted by their [`Ord`] implementation; rank 1 is the
/// smallest value. Values that compare equal are allowed and occupy
/// consecutive ranks, with the most recently inserted one first.
pub struct RankedSkipList<T> {
    /// Arena of nodes; slot 0 is the head.
    nodes: Vec<Node<T>>,
    /// Free list for reusing removed node slots.
    free_list: Vec<Idx>,
    /// Number of values (not counting head).
    len: usize,
    /// Highest level currently linked from the head.
    level: usize,
    /// Number of levels the list may grow to.
    max_level: usize,
    /// Random state for level generation.
    rng: StdRng,
}

impl<T> RankedSkipList<T> {
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    pub fn with_config(config: IndexConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        RankedSkipList {
            nodes: vec![Node::new_head()],
            free_list: Vec::new(),
            len: 0,
            level: 0,
            max_level: config.clamped_max_level(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest level in use. Starts at 0 and only ever grows.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Drop every value. The level resets to 0; the RNG keeps its state.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new_head());
        self.free_list.clear();
        self.len = 0;
        self.level = 0;
    }

    // --- Node access helpers ---

    fn node(&self, idx: Idx) -> &Node<T> {
        &self.nodes[idx as usize]
    }

    fn node_mut(&mut self, idx: Idx) -> &mut Node<T> {
        &mut self.nodes[idx as usize]
    }

    pub(super) fn item(&self, idx: Idx) -> &T {
        match &self.node(idx).item {
            Some(item) => item,
            None => unreachable!("link to vacant node {idx}"),
        }
    }

    pub(super) fn successor(&self, idx: Idx) -> Idx {
        self.node(idx).next[0]
    }

    fn alloc_node(&mut self, level: usize, item: T) -> Idx {
        if let Some(idx) = self.free_list.pop() {
            *self.node_mut(idx) = Node::new(level, item);
            idx
        } else {
            let idx = self.nodes.len();
            assert!(idx < NULL as usize, "ranked skip list is full");
            self.nodes.push(Node::new(level, item));
            idx as Idx
        }
    }

    fn release_node(&mut self, idx: Idx) -> Option<T> {
        let node = self.node_mut(idx);
        let item = node.item.take();
        node.next.clear();
        node.span.clear();
        self.free_list.push(idx);
        item
    }

    /// Coin-flip level: each extra level has probability 1/2, capped by the
    /// configured maximum rather than the current level.
    fn random_level(&mut self) -> usize {
        let mut level = 0;
        while level + 1 < self.max_level && self.rng.gen_bool(0.5) {
            level += 1;
        }
        level
    }

    /// Find the node sitting just before `rank`, i.e. at rank `rank - 1`
    /// (the head for rank 1). Descends from the head, so only levels a
    /// node actually owns are ever probed.
    fn predecessor_of_rank(&self, rank: usize) -> Idx {
        let target = rank.saturating_sub(1);
        let mut idx = HEAD;
        let mut traversed = 0usize;

        for level in (0..=self.level).rev() {
            loop {
                let node = self.node(idx);
                let next = node.next[level];
                if next == NULL || traversed + node.span[level] > target {
                    break;
                }
                traversed += node.span[level];
                idx = next;
            }
        }

        idx
    }

    /// Value at the given 1-based rank.
    pub fn get_by_rank(&self, rank: usize) -> Option<&T> {
        if rank == 0 || rank > self.len {
            return None;
        }
        let idx = self.successor(self.predecessor_of_rank(rank));
        Some(self.item(idx))
    }

    /// The value at rank 1.
    pub fn first(&self) -> Option<&T> {
        self.get_by_rank(1)
    }

    /// Iterate over ranks `[start, start + count)` as `(rank, value)` pairs.
    ///
    /// `start` is clamped to 1. Nothing is yielded when `count` is 0 or
    /// `start` is past the last rank; fewer than `count` pairs are yielded
    /// when the list runs out.
    pub fn range(&self, start: usize, count: usize) -> RankRange<'_, T> {
        let start = start.max(1);
        if count == 0 || start > self.len {
            return RankRange::empty(self);
        }
        let first = self.successor(self.predecessor_of_rank(start));
        RankRange::new(self, first, start, count)
    }

    /// Visit ranks `[start, start + count)` in order, stopping early when
    /// `visit` breaks. Same clamping rules as [`RankedSkipList::range`].
    pub fn range_by_rank<F>(&self, start: usize, count: usize, mut visit: F)
    where
        F: FnMut(usize, &T) -> ControlFlow<()>,
    {
        for (rank, item) in self.range(start, count) {
            if visit(rank, item).is_break() {
                break;
            }
        }
    }

    /// Iterate over all values in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.range(1, self.len).map(|(_, item)| item)
    }
}

impl<T: Ord> RankedSkipList<T> {
    /// Top-down walk that stops, at every level, on the last node strictly
    /// less than `value`. Returns that node per level together with its
    /// rank.
    fn descend(&self, value: &T) -> ([Idx; MAX_LEVEL], [usize; MAX_LEVEL]) {
        let mut update = [HEAD; MAX_LEVEL];
        let mut ranks = [0usize; MAX_LEVEL];
        let mut idx = HEAD;
        let mut traversed = 0usize;

        for level in (0..=self.level).rev() {
            loop {
                let node = self.node(idx);
                let next = node.next[level];
                if next == NULL || self.item(next) >= value {
                    break;
                }
                traversed += node.span[level];
                idx = next;
            }
            update[level] = idx;
            ranks[level] = traversed;
        }

        (update, ranks)
    }

    /// Insert a value, returning the rank it landed at.
    pub fn insert(&mut self, value: T) -> usize {
        self.check_invariants();

        let (mut update, mut ranks) = self.descend(&value);
        let level = self.random_level();

        if level > self.level {
            trace!(from = self.level, to = level, len = self.len, "raising skip list level");
            let past_end = self.len + 1;
            let head = &mut self.nodes[HEAD as usize];
            for l in self.level + 1..=level {
                head.next.push(NULL);
                head.span.push(past_end);
                update[l] = HEAD;
                ranks[l] = 0;
            }
            self.level = level;
        }

        let new_idx = self.alloc_node(level, value);

        // Splice in below the new node's level. `consumed` is how far the
        // walk got past update[l] before dropping to level 0.
        for l in 0..=level {
            let pred_idx = update[l];
            let consumed = ranks[0] - ranks[l];
            let pred = self.node(pred_idx);
            let old_next = pred.next[l];
            let old_span = pred.span[l];

            let node = self.node_mut(new_idx);
            node.next[l] = old_next;
            node.span[l] = old_span - consumed;

            let pred = self.node_mut(pred_idx);
            pred.next[l] = new_idx;
            pred.span[l] = consumed + 1;
        }

        // Links above pass over the new node.
        for l in level + 1..=self.level {
            self.node_mut(update[l]).span[l] += 1;
        }

        self.len += 1;
        self.check_invariants();

        ranks[0] + 1
    }

    /// Remove the first value comparing equal to `value`, returning it.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        self.check_invariants();

        let (update, _) = self.descend(value);
        let target = self.successor(update[0]);
        if target == NULL || self.item(target).cmp(value) != Ordering::Equal {
            return None;
        }

        for l in 0..=self.level {
            let pred_idx = update[l];
            if self.node(pred_idx).next[l] == target {
                let removed = self.node(target);
                let removed_next = removed.next[l];
                let removed_span = removed.span[l];

                let pred = self.node_mut(pred_idx);
                pred.next[l] = removed_next;
                pred.span[l] += removed_span - 1;
            } else {
                // Link passes over the removed node.
                self.node_mut(pred_idx).span[l] -= 1;
            }
        }

        self.len -= 1;
        let item = self.release_node(target);
        self.check_invariants();

        item
    }

    /// 1-based rank of a value comparing equal to `value`, or `None` if no
    /// such value is stored.
    pub fn rank(&self, value: &T) -> Option<usize> {
        let (update, ranks) = self.descend(value);
        let next = self.successor(update[0]);
        if next != NULL && self.item(next).cmp(value) == Ordering::Equal {
            Some(ranks[0] + 1)
        } else {
            None
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.rank(value).is_some()
    }

    // --- Invariant checking ---

    /// Walk every level and panic if the structure is inconsistent.
    ///
    /// Checks ordering at level 0, link array sizes, level inclusion, and
    /// that every span equals the rank difference it claims to cover.
    /// O(n) per call.
    pub fn assert_invariants(&self) {
        let head = self.node(HEAD);
        assert!(head.item.is_none(), "INVARIANT VIOLATED: head holds a value");
        assert_eq!(
            head.next.len(),
            self.level + 1,
            "INVARIANT VIOLATED: head owns {} levels but list level is {}",
            head.next.len(),
            self.level
        );
        assert!(
            self.level < self.max_level,
            "INVARIANT VIOLATED: level {} exceeds cap {}",
            self.level,
            self.max_level
        );

        // Level 0: positions, ordering, and how many nodes reach each level.
        let mut ranks = vec![usize::MAX; self.nodes.len()];
        ranks[HEAD as usize] = 0;
        let mut per_level = vec![0usize; self.level + 1];
        let mut count = 0usize;
        let mut prev: Option<&T> = None;
        let mut idx = head.next[0];

        while idx != NULL {
            count += 1;
            assert!(
                count <= self.len,
                "INVARIANT VIOLATED: level 0 holds more than len()={} nodes",
                self.len
            );
            let node = self.node(idx);
            assert_eq!(
                node.next.len(),
                node.span.len(),
                "INVARIANT VIOLATED: link and span arrays differ at rank {}",
                count
            );
            assert!(
                node.level() <= self.level,
                "INVARIANT VIOLATED: node at rank {} has level {} above list level {}",
                count,
                node.level(),
                self.level
            );
            let item = self.item(idx);
            if let Some(prev) = prev {
                assert!(prev <= item, "INVARIANT VIOLATED: level 0 out of order at rank {}", count);
            }
            for reached in per_level.iter_mut().take(node.level() + 1) {
                *reached += 1;
            }
            ranks[idx as usize] = count;
            prev = Some(item);
            idx = node.next[0];
        }
        assert_eq!(count, self.len, "INVARIANT VIOLATED: level 0 count={} != len()={}", count, self.len);

        // Every level: spans match rank differences and membership matches
        // the node levels seen at level 0.
        for level in 0..=self.level {
            let mut idx = HEAD;
            let mut members = 0usize;
            loop {
                let node = self.node(idx);
                let here = ranks[idx as usize];
                assert!(
                    node.next.len() > level,
                    "INVARIANT VIOLATED: rank {} reached at level {} above its own level",
                    here,
                    level
                );
                let next = node.next[level];
                let there = if next == NULL { self.len + 1 } else { ranks[next as usize] };
                assert!(
                    there != usize::MAX,
                    "INVARIANT VIOLATED: level {} links to a node missing from level 0",
                    level
                );
                assert!(there > here, "INVARIANT VIOLATED: level {} goes backwards at rank {}", level, here);
                assert_eq!(
                    node.span[level],
                    there - here,
                    "INVARIANT VIOLATED: span at level {} from rank {}",
                    level,
                    here
                );
                if next == NULL {
                    break;
                }
                members += 1;
                idx = next;
            }
            assert_eq!(
                members, per_level[level],
                "INVARIANT VIOLATED: level {} links {} nodes, expected {}",
                level, members, per_level[level]
            );
        }
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        self.assert_invariants();
    }

    #[cfg(not(test))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<T> Default for RankedSkipList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RankedSkipList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankedSkipList")
            .field("len", &self.len)
            .field("level", &self.level)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// One line per level, top level first: `Level 1: a c`.
impl<T: fmt::Display> fmt::Display for RankedSkipList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in (0..=self.level).rev() {
            write!(f, "Level {level}:")?;
            let mut idx = self.node(HEAD).next[level];
            while idx != NULL {
                write!(f, " {}", self.item(idx))?;
                idx = self.node(idx).next[level];
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
