// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_virtual_list --heading-base-level=0

//! Understory Virtual List: a recycling virtual list engine.
//!
//! This crate displays an arbitrarily long, ordered collection through a small,
//! bounded window of reusable *cells*. As the viewport, the scroll position, or
//! the collection changes, the window is recomputed and cells are moved,
//! rebound, or recycled rather than rebuilt. Work per trigger is proportional
//! to the window, never to the collection.
//!
//! The pieces, leaves first:
//!
//! - [`Cell`]: the host's visual unit, bound to one item at a time, plus the
//!   [`CellFactory`] that builds cells.
//! - [`CellCache`]: a bounded FIFO of detached cells kept for reuse.
//! - [`ListHelper`]: pure window and scroll math for one orientation
//!   ([`VerticalHelper`], [`HorizontalHelper`]).
//! - [`ListState`]: the realized [`IndexRange`] and the cells that fill it.
//! - [`VirtualList`]: the container. It owns items, geometry, factory, cache
//!   and state, and runs one transition per trigger.
//!
//! Rendering is left to the host: after a transition, walk
//! [`VirtualList::state`] (or call [`VirtualList::layout`]) and position each
//! cell's visual node, translated by [`VirtualList::viewport_position`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_virtual_list::{Cell, CellFactory, ListConfig, VirtualList};
//!
//! struct Label {
//!     index: usize,
//!     value: u32,
//! }
//!
//! impl Cell<u32> for Label {
//!     fn update_index(&mut self, index: usize) {
//!         self.index = index;
//!     }
//!     fn update_item(&mut self, item: &u32) {
//!         self.value = *item;
//!     }
//! }
//!
//! let mut list = VirtualList::from_items(ListConfig::default(), (0..10_000_u32).collect());
//! list.set_cell_factory(Some(CellFactory::new(|item: Option<&u32>| Label {
//!     index: 0,
//!     value: item.copied().unwrap_or_default(),
//! })));
//! list.set_viewport_size(Size::new(240.0, 480.0));
//!
//! // 15 visible rows plus two buffer rows per side, all below at the start.
//! assert_eq!(list.state().len(), 19);
//!
//! list.scroll_by(32.0 * 100.0);
//! let report = list.last_report().unwrap();
//! // Scrolling never creates cells; it rebinds the ones that fell out of view.
//! assert_eq!(report.stats.created, 0);
//! assert_eq!(report.stats.from_cache, 0);
//! ```
//!
//! ## Observability
//!
//! Every trigger produces a [`TransitionReport`]; install a
//! [`TransitionTrace`] (any `FnMut(&TransitionReport)` works) to collect them.
//! With the `tracing` feature, handlers also emit `tracing` spans and events.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod cache;
mod cell;
mod config;
mod helper;
mod list;
mod manager;
mod range;
mod state;
mod state_map;
mod trace;

pub use cache::{CellCache, PopulateError};
pub use cell::{Cell, CellFactory};
pub use config::{BufferSize, ListConfig, Orientation};
pub use helper::{HelperFactory, HorizontalHelper, ListGeometry, ListHelper, VerticalHelper};
pub use list::VirtualList;
pub use range::IndexRange;
pub use state::ListState;
pub use trace::{
    ItemsChange, Outcome, ReconcileStats, TransitionRecorder, TransitionReport, TransitionTrace,
    Trigger,
};
