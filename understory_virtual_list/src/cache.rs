// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded recycling pool for detached cells.

use alloc::collections::VecDeque;
use core::fmt;
use core::marker::PhantomData;

use crate::{Cell, CellFactory};

/// Error returned by [`CellCache::populate`] when no factory is available.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PopulateError {
    /// The cache cannot build cells because no [`CellFactory`] was provided.
    MissingFactory,
}

impl fmt::Display for PopulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFactory => {
                f.write_str("cannot populate the cell cache without a cell factory")
            }
        }
    }
}

impl core::error::Error for PopulateError {}

/// A capacity-bounded FIFO of detached cells.
///
/// Cells enter through [`CellCache::store`] (receiving [`Cell::on_cache`]) and
/// leave through [`CellCache::take`] (receiving [`Cell::on_decache`]), oldest
/// first. The cache never grows past its capacity: a cell stored into a full
/// cache is disposed on the spot, and shrinking the capacity disposes the oldest
/// overflow.
pub struct CellCache<T, C> {
    queue: VecDeque<C>,
    capacity: usize,
    _item: PhantomData<fn(&T)>,
}

impl<T, C: Cell<T>> CellCache<T, C> {
    /// Creates an empty cache holding at most `capacity` cells.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            _item: PhantomData,
        }
    }

    /// Number of cached cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if no cells are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of cells the cache keeps.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates the cached cells, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &C> + '_ {
        self.queue.iter()
    }

    /// Removes and returns the oldest cached cell.
    pub fn take(&mut self) -> Option<C> {
        let mut cell = self.queue.pop_front()?;
        cell.on_decache();
        Some(cell)
    }

    /// Adds a cell to the cache.
    ///
    /// Returns `false` if the cache is full; the cell is disposed in that case.
    pub fn store(&mut self, mut cell: C) -> bool {
        if self.queue.len() >= self.capacity {
            cell.dispose();
            return false;
        }
        cell.on_cache();
        self.queue.push_back(cell);
        true
    }

    /// Stores every cell yielded by `cells`, returning how many were kept.
    pub fn store_all(&mut self, cells: impl IntoIterator<Item = C>) -> usize {
        let mut kept = 0;
        for cell in cells {
            if self.store(cell) {
                kept += 1;
            }
        }
        kept
    }

    /// Fills the cache up to its capacity with cells built for no item.
    ///
    /// Returns the number of cells created. Cells built this way start
    /// without an item, so they must tolerate `None` in their factory.
    ///
    /// # Errors
    ///
    /// Returns [`PopulateError::MissingFactory`] if `factory` is `None`.
    pub fn populate(
        &mut self,
        factory: Option<&mut CellFactory<T, C>>,
    ) -> Result<usize, PopulateError> {
        let factory = factory.ok_or(PopulateError::MissingFactory)?;
        let mut created = 0;
        while self.queue.len() < self.capacity {
            self.store(factory.create(None));
            created += 1;
        }
        Ok(created)
    }

    /// Evicts and disposes the first cached cell matching `predicate`.
    ///
    /// Returns `true` if a cell was removed.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&C) -> bool) -> bool {
        let Some(pos) = self.queue.iter().position(&mut predicate) else {
            return false;
        };
        if let Some(cell) = self.queue.remove(pos) {
            cell.dispose();
        }
        true
    }

    /// Disposes every cached cell.
    pub fn clear(&mut self) {
        for cell in self.queue.drain(..) {
            cell.dispose();
        }
    }

    /// Changes the capacity, disposing the oldest cells if the cache shrinks
    /// below its current size.
    pub fn set_capacity(&mut self, capacity: usize) {
        while self.queue.len() > capacity {
            if let Some(cell) = self.queue.pop_front() {
                cell.dispose();
            }
        }
        self.capacity = capacity;
    }
}

impl<T, C> fmt::Debug for CellCache<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellCache")
            .field("len", &self.queue.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
