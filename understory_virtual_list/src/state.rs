// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering snapshots.

use core::fmt;
use core::hash::Hash;

use crate::state_map::StateMap;
use crate::{Cell, CellCache, IndexRange};

/// A snapshot of the realized window.
///
/// A state holds the [`IndexRange`] currently realized and owns one cell per
/// index in that range. The empty state has no range and no cells; it stands
/// for "no window" (empty collection, missing factory, zero cell size, or a
/// viewport with no main extent).
///
/// States are read-only to the host. Each transition builds a fresh state from
/// the previous one, moving cells across; the previous state's leftovers are
/// returned to the [`CellCache`].
pub struct ListState<T, C> {
    range: Option<IndexRange>,
    cells: StateMap<T, C>,
    cells_changed: bool,
}

impl<T, C> ListState<T, C>
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    /// The empty state.
    pub(crate) fn empty() -> Self {
        Self {
            range: None,
            cells: StateMap::new(),
            cells_changed: false,
        }
    }

    pub(crate) fn new(range: IndexRange) -> Self {
        Self {
            range: Some(range),
            cells: StateMap::new(),
            cells_changed: false,
        }
    }

    /// The realized index range, or `None` for the empty state.
    #[must_use]
    pub fn range(&self) -> Option<IndexRange> {
        self.range
    }

    /// Returns `true` for the empty state.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.range.is_none()
    }

    /// Number of realized cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell is realized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns `true` if the set of realized cells differs from the previous
    /// state's (cells were created, taken from the cache, or sent to it).
    ///
    /// When `false`, the same cells are realized and only their bindings may
    /// have changed, so the host can skip rebuilding its node tree.
    #[must_use]
    pub fn cells_changed(&self) -> bool {
        self.cells_changed
    }

    /// The cell realized at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.cells.get(index)
    }

    /// The item bound to the cell at `index`.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&T> {
        self.cells.item(index)
    }

    /// Returns `true` if a cell is realized at `index`.
    #[must_use]
    pub fn contains_index(&self, index: usize) -> bool {
        self.cells.contains_index(index)
    }

    /// Returns `true` if at least one realized cell shows `item`.
    #[must_use]
    pub fn contains_item(&self, item: &T) -> bool {
        self.cells.contains_item(item)
    }

    /// Iterates `(index, item, cell)` in ascending index order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &T, &C)> + '_ {
        self.cells.iter()
    }

    /// Iterates the cells realized for `item`, as `(index, cell)`.
    ///
    /// An item present several times in the collection may be realized more
    /// than once; cells come in registration order.
    pub fn cells_for_item<'a>(
        &'a self,
        item: &T,
    ) -> impl Iterator<Item = (usize, &'a C)> + use<'a, T, C> {
        self.cells
            .indexes_of(item)
            .iter()
            .filter_map(|&index| self.cells.get(index).map(|cell| (index, cell)))
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.cells.get_mut(index)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &T, &mut C)> + '_ {
        self.cells.iter_mut()
    }

    /// Registers `cell` at `index`.
    pub(crate) fn add_cell(&mut self, index: usize, item: T, cell: C) {
        debug_assert!(
            self.range.is_some_and(|r| r.contains(index)),
            "index {index} lies outside {:?}",
            self.range
        );
        let displaced = self.cells.insert(index, item, cell);
        debug_assert!(displaced.is_none(), "index {index} registered twice");
        if let Some(cell) = displaced {
            cell.dispose();
        }
    }

    pub(crate) fn remove_by_index(&mut self, index: usize) -> Option<(T, C)> {
        self.cells.remove_index(index)
    }

    pub(crate) fn remove_by_item(&mut self, item: &T) -> Option<(usize, C)> {
        self.cells.remove_item(item)
    }

    pub(crate) fn poll_first(&mut self) -> Option<(usize, T, C)> {
        self.cells.pop_first()
    }

    pub(crate) fn set_cells_changed(&mut self, changed: bool) {
        self.cells_changed = changed;
    }

    /// Hands every remaining cell to `cache`, leaving this state empty.
    ///
    /// Returns `true` if there was at least one cell to hand over.
    pub(crate) fn dispose_into(&mut self, cache: &mut CellCache<T, C>) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        cache.store_all(self.cells.drain_cells());
        true
    }

    /// Disposes every remaining cell without caching it.
    pub(crate) fn dispose_cells(&mut self) {
        for cell in self.cells.drain_cells() {
            cell.dispose();
        }
    }

    /// Checks internal consistency: both maps agree and, for a non-empty
    /// range, every index in it is realized exactly once.
    pub(crate) fn is_complete(&self) -> bool {
        if !self.cells.is_consistent() {
            return false;
        }
        match self.range {
            None => self.cells.is_empty(),
            Some(range) => {
                self.cells.len() == range.len()
                    && range.iter().all(|i| self.cells.contains_index(i))
            }
        }
    }
}

impl<T, C> fmt::Debug for ListState<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListState")
            .field("range", &self.range)
            .field("cells", &self.cells)
            .field("cells_changed", &self.cells_changed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::ListState;
    use crate::{Cell, CellCache, IndexRange};

    #[derive(Debug, PartialEq)]
    struct Plain(usize);

    impl Cell<char> for Plain {
        fn update_index(&mut self, index: usize) {
            self.0 = index;
        }
        fn update_item(&mut self, _item: &char) {}
    }

    fn state_over(items: &str) -> ListState<char, Plain> {
        let range = IndexRange::new(0, items.len() - 1).unwrap();
        let mut state = ListState::new(range);
        for (index, item) in items.chars().enumerate() {
            state.add_cell(index, item, Plain(index));
        }
        state
    }

    #[test]
    fn empty_state_has_no_range() {
        let state = ListState::<char, Plain>::empty();
        assert!(state.is_invalid());
        assert!(state.is_empty());
        assert!(state.is_complete());
        assert!(!state.cells_changed());
    }

    #[test]
    fn lookups_by_index_and_item() {
        let state = state_over("abca");
        assert!(state.is_complete());
        assert_eq!(state.get(2), Some(&Plain(2)));
        assert_eq!(state.item(3), Some(&'a'));
        assert!(state.contains_index(3) && !state.contains_index(4));
        assert!(state.contains_item(&'c') && !state.contains_item(&'z'));
        let for_a: Vec<usize> = state.cells_for_item(&'a').map(|(i, _)| i).collect();
        assert_eq!(for_a, [0, 3]);
        let order: Vec<usize> = state.iter().map(|(i, _, _)| i).collect();
        assert_eq!(order, [0, 1, 2, 3]);
    }

    #[test]
    fn missing_index_is_incomplete() {
        let mut state = state_over("abc");
        assert!(state.remove_by_index(1).is_some());
        assert!(!state.is_complete());
    }

    #[test]
    fn dispose_into_moves_cells_to_cache() {
        let mut state = state_over("abc");
        let mut cache = CellCache::new(2);
        assert!(state.dispose_into(&mut cache));
        assert!(state.is_empty());
        assert_eq!(cache.len(), 2);
        assert!(!state.dispose_into(&mut cache));
    }
}
