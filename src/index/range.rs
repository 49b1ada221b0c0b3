//! Iteration over a run of consecutive ranks.

use std::iter::FusedIterator;

use super::ranked_skip_list::{Idx, NULL, RankedSkipList};

/// Iterator over `(rank, value)` pairs, produced by
/// [`RankedSkipList::range`].
///
/// The start node is located once by a top-down descent; after that each
/// step follows a single level-0 link.
pub struct RankRange<'a, T> {
    list: &'a RankedSkipList<T>,
    current: Idx,
    rank: usize,
    remaining: usize,
}

impl<'a, T> RankRange<'a, T> {
    pub(super) fn new(list: &'a RankedSkipList<T>, first: Idx, rank: usize, count: usize) -> Self {
        RankRange {
            list,
            current: first,
            rank,
            remaining: count,
        }
    }

    pub(super) fn empty(list: &'a RankedSkipList<T>) -> Self {
        Self::new(list, NULL, 0, 0)
    }
}

impl<'a, T> Iterator for RankRange<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.current == NULL {
            return None;
        }

        let item = self.list.item(self.current);
        let rank = self.rank;
        self.current = self.list.successor(self.current);
        self.rank += 1;
        self.remaining -= 1;
        Some((rank, item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.current == NULL {
            return (0, Some(0));
        }
        let left = self.list.len() + 1 - self.rank;
        let exact = left.min(self.remaining);
        (exact, Some(exact))
    }
}

impl<T> ExactSizeIterator for RankRange<'_, T> {}

impl<T> FusedIterator for RankRange<'_, T> {}
