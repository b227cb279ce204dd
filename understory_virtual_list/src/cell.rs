// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cell capability and the factory that produces cells.

use alloc::boxed::Box;
use core::fmt;

/// A reusable visual unit bound to one item at a time.
///
/// Cells are owned by value: a realized cell lives in exactly one
/// [`ListState`](crate::ListState), a detached cell lives in the
/// [`CellCache`](crate::CellCache), and nothing else holds on to it. The engine
/// rebinds cells through [`Cell::update_index`] and [`Cell::update_item`]
/// instead of recreating them.
///
/// Neither update is guaranteed to carry a value different from the current
/// one. Implementations with expensive reactions should compare first.
pub trait Cell<T> {
    /// Binds the cell to a new position in the item sequence.
    fn update_index(&mut self, index: usize);

    /// Binds the cell to a new item.
    fn update_item(&mut self, item: &T);

    /// Called right before the cell is placed by
    /// [`VirtualList::layout`](crate::VirtualList::layout).
    fn before_layout(&mut self) {}

    /// Called right after the cell is placed by
    /// [`VirtualList::layout`](crate::VirtualList::layout).
    fn after_layout(&mut self) {}

    /// Called when the cell enters the cache.
    fn on_cache(&mut self) {}

    /// Called when the cell leaves the cache to be reused.
    fn on_decache(&mut self) {}

    /// Cross-axis extent the cell would like to occupy.
    ///
    /// Only consulted when the list does not fit cells to the viewport; the
    /// largest value seen becomes the list's virtual cross extent.
    fn cross_extent(&self) -> f64 {
        0.0
    }

    /// Called once when the cell is permanently discarded.
    fn dispose(self)
    where
        Self: Sized,
    {
    }
}

/// Produces new cells.
///
/// The factory receives the item the cell will display, or `None` when the
/// cell is built ahead of time to pre-warm the cache (see
/// [`CellCache::populate`](crate::CellCache::populate)). Cells must therefore
/// tolerate starting without an item.
pub struct CellFactory<T, C> {
    create: Box<dyn FnMut(Option<&T>) -> C>,
}

impl<T, C> CellFactory<T, C> {
    /// Wraps a closure as a cell factory.
    pub fn new(create: impl FnMut(Option<&T>) -> C + 'static) -> Self {
        Self {
            create: Box::new(create),
        }
    }

    /// Builds a cell for `item`.
    pub fn create(&mut self, item: Option<&T>) -> C {
        (self.create)(item)
    }
}

impl<T, C> fmt::Debug for CellFactory<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellFactory").finish_non_exhaustive()
    }
}
