// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Index/item bimap of realized cells.
//!
//! A list position maps to exactly one item, but an item may sit at several
//! positions. [`StateMap`] therefore keeps two maps in lockstep:
//!
//! - `by_index`: ordered `index -> (item, cell)`;
//! - `by_item`: `item -> [index, ...]`, in registration order.
//!
//! Every mutation updates both maps, so lookups by index and by item always
//! agree. When several indexes share an item, removal by item takes the one
//! registered first.

use alloc::collections::BTreeMap;
use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

struct Slot<T, C> {
    item: T,
    cell: C,
}

/// Realized cells keyed both by index and by item.
pub(crate) struct StateMap<T, C> {
    by_index: BTreeMap<usize, Slot<T, C>>,
    by_item: HashMap<T, SmallVec<[usize; 2]>>,
}

impl<T, C> StateMap<T, C>
where
    T: Clone + Eq + Hash,
{
    pub(crate) fn new() -> Self {
        Self {
            by_index: BTreeMap::new(),
            by_item: HashMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.by_index.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    pub(crate) fn contains_index(&self, index: usize) -> bool {
        self.by_index.contains_key(&index)
    }

    pub(crate) fn contains_item(&self, item: &T) -> bool {
        self.by_item.contains_key(item)
    }

    /// Registers `cell` for `item` at `index`.
    ///
    /// If the index was already taken, the previous cell is unregistered and
    /// returned.
    pub(crate) fn insert(&mut self, index: usize, item: T, cell: C) -> Option<C> {
        let displaced = self.remove_index(index).map(|(_, cell)| cell);
        self.by_item.entry(item.clone()).or_default().push(index);
        self.by_index.insert(index, Slot { item, cell });
        displaced
    }

    pub(crate) fn get(&self, index: usize) -> Option<&C> {
        self.by_index.get(&index).map(|slot| &slot.cell)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.by_index.get_mut(&index).map(|slot| &mut slot.cell)
    }

    pub(crate) fn item(&self, index: usize) -> Option<&T> {
        self.by_index.get(&index).map(|slot| &slot.item)
    }

    /// Indexes registered for `item`, in registration order.
    pub(crate) fn indexes_of(&self, item: &T) -> &[usize] {
        self.by_item.get(item).map_or(&[][..], |v| v.as_slice())
    }

    /// Unregisters the cell at `index`.
    pub(crate) fn remove_index(&mut self, index: usize) -> Option<(T, C)> {
        let slot = self.by_index.remove(&index)?;
        self.unlink(&slot.item, index);
        Some((slot.item, slot.cell))
    }

    /// Unregisters the first-registered cell showing `item`.
    ///
    /// Returns the index the cell was registered under.
    pub(crate) fn remove_item(&mut self, item: &T) -> Option<(usize, C)> {
        let indexes = self.by_item.get_mut(item)?;
        let index = indexes.remove(0);
        if indexes.is_empty() {
            self.by_item.remove(item);
        }
        let slot = self.by_index.remove(&index);
        debug_assert!(slot.is_some(), "item map points at unregistered index {index}");
        slot.map(|slot| (index, slot.cell))
    }

    /// Unregisters the cell with the lowest index.
    pub(crate) fn pop_first(&mut self) -> Option<(usize, T, C)> {
        let (index, slot) = self.by_index.pop_first()?;
        self.unlink(&slot.item, index);
        Some((index, slot.item, slot.cell))
    }

    /// Iterates `(index, item, cell)` in ascending index order.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &T, &C)> + '_ {
        self.by_index
            .iter()
            .map(|(&index, slot)| (index, &slot.item, &slot.cell))
    }

    /// Iterates `(index, item, cell)` mutably in ascending index order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &T, &mut C)> + '_ {
        self.by_index
            .iter_mut()
            .map(|(&index, slot)| (index, &slot.item, &mut slot.cell))
    }

    /// Removes every entry, yielding the cells in ascending index order.
    pub(crate) fn drain_cells(&mut self) -> impl Iterator<Item = C> {
        self.by_item.clear();
        core::mem::take(&mut self.by_index)
            .into_values()
            .map(|slot| slot.cell)
    }

    /// Checks that both maps describe the same set of registrations.
    pub(crate) fn is_consistent(&self) -> bool {
        let linked: usize = self.by_item.values().map(|v| v.len()).sum();
        linked == self.by_index.len()
            && self.by_item.iter().all(|(item, indexes)| {
                indexes
                    .iter()
                    .all(|i| self.by_index.get(i).is_some_and(|slot| slot.item == *item))
            })
    }

    fn unlink(&mut self, item: &T, index: usize) {
        let Some(indexes) = self.by_item.get_mut(item) else {
            debug_assert!(false, "index {index} has no item back-link");
            return;
        };
        if let Some(pos) = indexes.iter().position(|&i| i == index) {
            indexes.remove(pos);
        }
        if indexes.is_empty() {
            self.by_item.remove(item);
        }
    }
}

impl<T, C> fmt::Debug for StateMap<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.by_index.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::StateMap;

    fn filled(items: &[&'static str]) -> StateMap<&'static str, u32> {
        let mut map = StateMap::new();
        for (index, item) in items.iter().enumerate() {
            assert!(map.insert(index, *item, index as u32 * 10).is_none());
        }
        map
    }

    #[test]
    fn lookups_agree_in_both_directions() {
        let map = filled(&["a", "b", "a", "c"]);
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(1), Some(&10));
        assert_eq!(map.item(2), Some(&"a"));
        assert_eq!(map.indexes_of(&"a"), [0, 2]);
        assert!(map.contains_item(&"c"));
        assert!(!map.contains_item(&"z"));
        assert!(map.is_consistent());
    }

    #[test]
    fn remove_item_takes_first_registered_duplicate() {
        let mut map = filled(&["a", "b", "a"]);
        assert_eq!(map.remove_item(&"a"), Some((0, 0)));
        assert_eq!(map.remove_item(&"a"), Some((2, 20)));
        assert_eq!(map.remove_item(&"a"), None);
        assert!(map.is_consistent());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_index_keeps_item_links_in_sync() {
        let mut map = filled(&["a", "b", "a"]);
        assert_eq!(map.remove_index(2), Some(("a", 20)));
        assert_eq!(map.indexes_of(&"a"), [0]);
        assert!(map.is_consistent());

        assert_eq!(map.remove_index(2), None);
        assert_eq!(map.remove_item(&"a"), Some((0, 0)));
        assert!(!map.contains_item(&"a"));
    }

    #[test]
    fn insert_over_taken_index_displaces_previous_cell() {
        let mut map = filled(&["a", "b"]);
        assert_eq!(map.insert(1, "z", 99), Some(10));
        assert!(!map.contains_item(&"b"));
        assert_eq!(map.indexes_of(&"z"), [1]);
        assert!(map.is_consistent());
    }

    #[test]
    fn pop_first_and_drain_follow_index_order() {
        let mut map = StateMap::new();
        for index in [5_usize, 3, 9] {
            map.insert(index, index, index as u32);
        }
        assert_eq!(map.pop_first(), Some((3, 3, 3)));
        assert!(map.is_consistent());
        let rest: Vec<u32> = map.drain_cells().collect();
        assert_eq!(rest, [5, 9]);
        assert!(map.is_empty());
        assert!(map.is_consistent());
    }
}
