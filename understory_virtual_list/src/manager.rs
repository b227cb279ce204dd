// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State transitions.
//!
//! [`ListManager`] turns one trigger into at most one new [`ListState`]. Every
//! handler follows the same shape:
//!
//! 1. check that cells can be realized at all (items, factory, cell size),
//!    committing the empty state otherwise;
//! 2. clamp the scroll position against the new bounds;
//! 3. compute the target range, committing the empty state if there is none;
//! 4. move cells from the previous state into a fresh one with one of the
//!    algorithms below;
//! 5. hand leftovers to the cache and commit.
//!
//! ## Algorithms
//!
//! - *Move, reuse, create* (geometry, buffer, spacing, cell factory): cells
//!   realized at an index in the target range stay there untouched.
//! - *Scroll fast path* (position): ranges of equal length; shared indexes are
//!   kept and leftover cells are rebound to the newly exposed indexes. Never
//!   touches the cache or the factory.
//! - *Intersection* (cell size, orientation, helper): the overlap of the previous and
//!   target ranges is kept.
//! - *Remaining indexes*: whatever is still unfilled takes, in order, a
//!   leftover cell from the previous state, a cached cell, or a new one.
//!
//! Item changes match cells by item rather than by index, so a cell follows its
//! item when the item moves.
//!
//! ## Re-entrancy
//!
//! Clamping the scroll position is itself a position change. While a handler
//! runs, the manager raises a guard that turns the nested position handler into
//! a no-op, so each external trigger produces exactly one transition.

use core::hash::Hash;

use kurbo::Point;
use smallvec::SmallVec;

use crate::list::ListCore;
use crate::{
    Cell, IndexRange, ItemsChange, ListState, Outcome, ReconcileStats, TransitionReport, Trigger,
};

type Indexes = SmallVec<[usize; 16]>;

/// Drives transitions between states.
#[derive(Debug, Default)]
pub(crate) struct ListManager {
    normalizing: bool,
}

impl ListManager {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a handler is normalizing the scroll position.
    pub(crate) fn is_normalizing(&self) -> bool {
        self.normalizing
    }

    /// Runs `f` with the position guard raised.
    fn guarded<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.normalizing = true;
        let out = f(self);
        self.normalizing = false;
        out
    }

    /// Viewport or buffer change: rebuild with move, reuse, create.
    pub(crate) fn on_geometry_changed<T, C>(
        &mut self,
        core: &mut ListCore<T, C>,
        trigger: Trigger,
    ) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("on_geometry_changed", ?trigger).entered();
        let mut report = TransitionReport::new(trigger, core.state.range());
        self.guarded(|this| {
            this.invalidate_positions(core);
            if !validity_check(core, &mut report) {
                return;
            }
            let Some(range) = checked_range(core, &mut report) else {
                return;
            };
            let mut old = core.take_state();
            let mut new = ListState::new(range);
            move_reuse_create(core, &mut old, &mut new, range, &mut report.stats);
            finish(core, old, new, &mut report);
            core.request_layout();
        });
        report
    }

    /// Main-axis scroll: the fast path.
    pub(crate) fn on_position_changed<T, C>(
        &mut self,
        core: &mut ListCore<T, C>,
    ) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        let mut report = TransitionReport::new(Trigger::Position, core.state.range());
        if self.is_normalizing() {
            #[cfg(feature = "tracing")]
            tracing::trace!("position change ignored while normalizing");
            return report;
        }
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("on_position_changed").entered();

        let Some(last) = core.state.range() else {
            return report;
        };
        let Some(range) = core.range() else {
            return report;
        };
        if last == range || last.len() != range.len() {
            return report;
        }

        let mut old = core.take_state();
        let mut new = ListState::new(range);
        scroll_fast_path(core, &mut old, &mut new, range, &mut report.stats);
        // Equal lengths leave nothing behind; anything left is a bookkeeping bug.
        debug_assert!(old.is_empty(), "scroll left {} cells behind", old.len());
        finish(core, old, new, &mut report);
        core.request_layout();
        report
    }

    /// New factory: every cell is rebuilt.
    pub(crate) fn on_cell_factory_changed<T, C>(
        &mut self,
        core: &mut ListCore<T, C>,
    ) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("on_cell_factory_changed").entered();
        let mut report = TransitionReport::new(Trigger::CellFactory, core.state.range());

        // Cells built by the previous factory must not be reused.
        core.take_state().dispose_cells();
        core.cache.clear();
        if !validity_check(core, &mut report) {
            return report;
        }
        let Some(range) = checked_range(core, &mut report) else {
            return report;
        };
        let mut old = ListState::empty();
        let mut new = ListState::new(range);
        move_reuse_create(core, &mut old, &mut new, range, &mut report.stats);
        new.set_cells_changed(true);
        finish(core, old, new, &mut report);
        report
    }

    /// Items changed: cells follow their items.
    pub(crate) fn on_items_changed<T, C>(
        &mut self,
        core: &mut ListCore<T, C>,
        change: ItemsChange,
    ) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("on_items_changed", ?change).entered();
        let mut report = TransitionReport::new(Trigger::Items(change), core.state.range());
        self.guarded(|this| {
            this.invalidate_positions(core);
            if !validity_check(core, &mut report) {
                return;
            }
            let Some(range) = checked_range(core, &mut report) else {
                return;
            };

            let mut old = core.take_state();
            let mut new = ListState::new(range);
            let mut missing = Indexes::new();
            for index in range {
                let item = core.items[index].clone();
                match old.remove_by_item(&item) {
                    Some((previous, mut cell)) => {
                        if previous == index {
                            report.stats.reused += 1;
                        } else {
                            cell.update_index(index);
                            report.stats.index_updates += 1;
                        }
                        new.add_cell(index, item, cell);
                    }
                    None => missing.push(index),
                }
            }
            fill_remaining(core, &mut old, &mut new, missing, &mut report.stats);
            let cells_changed = finish(core, old, new, &mut report);
            if !cells_changed {
                core.request_layout();
            }
        });
        report
    }

    /// Fit-to-viewport toggled: only placement and cross bounds change.
    pub(crate) fn on_fit_to_viewport_changed<T, C>(
        &mut self,
        core: &mut ListCore<T, C>,
    ) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        let report = TransitionReport::new(Trigger::FitToViewport, core.state.range());
        core.request_layout();
        self.invalidate_positions(core);
        report
    }

    /// Cell size or helper changed: rebuild around the intersection.
    ///
    /// For a new helper, the caller installs it before invoking this.
    pub(crate) fn on_extent_changed<T, C>(
        &mut self,
        core: &mut ListCore<T, C>,
        trigger: Trigger,
    ) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("on_extent_changed", ?trigger).entered();
        let mut report = TransitionReport::new(trigger, core.state.range());
        self.guarded(|this| {
            this.invalidate_positions(core);
            if !validity_check(core, &mut report) {
                return;
            }
            intersection_rebuild(core, &mut report);
        });
        report
    }

    /// Orientation changed: positions reset, rebuild around the intersection.
    ///
    /// The caller swaps the helper before invoking this.
    pub(crate) fn on_orientation_changed<T, C>(
        &mut self,
        core: &mut ListCore<T, C>,
    ) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("on_orientation_changed").entered();
        let mut report = TransitionReport::new(Trigger::Orientation, core.state.range());
        self.guarded(|this| {
            if core.position != Point::ZERO {
                core.position = Point::ZERO;
                let _ = this.on_position_changed(core);
            }
            if !validity_check(core, &mut report) {
                return;
            }
            intersection_rebuild(core, &mut report);
        });
        report
    }

    /// Spacing changed: rebuild with move, reuse, create.
    pub(crate) fn on_spacing_changed<T, C>(&mut self, core: &mut ListCore<T, C>) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("on_spacing_changed").entered();
        let mut report = TransitionReport::new(Trigger::Spacing, core.state.range());
        self.guarded(|this| {
            this.invalidate_positions(core);
            if !validity_check(core, &mut report) {
                return;
            }
            let Some(range) = checked_range(core, &mut report) else {
                return;
            };
            let mut old = core.take_state();
            let mut new = ListState::new(range);
            move_reuse_create(core, &mut old, &mut new, range, &mut report.stats);
            if !finish(core, old, new, &mut report) {
                core.request_layout();
            }
        });
        report
    }

    /// Teardown: every realized and cached cell is disposed.
    pub(crate) fn dispose<T, C>(&mut self, core: &mut ListCore<T, C>) -> TransitionReport
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        let mut report = TransitionReport::new(Trigger::Dispose, core.state.range());
        core.take_state().dispose_cells();
        core.cache.clear();
        commit_empty(core, &mut report);
        report
    }

    /// Clamps the scroll position into the current bounds.
    ///
    /// A main-axis adjustment notifies the position handler, which does
    /// nothing while the guard is raised.
    fn invalidate_positions<T, C>(&mut self, core: &mut ListCore<T, C>)
    where
        T: Clone + Eq + Hash,
        C: Cell<T>,
    {
        let geometry = core.geometry();
        let clamped = core.helper.clamp_position(&geometry, core.position);
        if clamped == core.position {
            return;
        }
        let main_moved =
            core.helper.main_position(clamped) != core.helper.main_position(core.position);
        core.position = clamped;
        if main_moved {
            let _ = self.on_position_changed(core);
        }
    }
}

/// Collapses to the empty state unless cells can be realized.
fn validity_check<T, C>(core: &mut ListCore<T, C>, report: &mut TransitionReport) -> bool
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    if core.can_realize() {
        return true;
    }
    commit_empty(core, report);
    false
}

/// The target range, collapsing to the empty state when there is none.
fn checked_range<T, C>(
    core: &mut ListCore<T, C>,
    report: &mut TransitionReport,
) -> Option<IndexRange>
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    let range = core.range();
    if range.is_none() {
        commit_empty(core, report);
    }
    range
}

fn commit_empty<T, C>(core: &mut ListCore<T, C>, report: &mut TransitionReport)
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    let mut old = core.take_state();
    let leftovers = old.len();
    if old.dispose_into(&mut core.cache) {
        report.stats.cached += leftovers;
    }
    report.outcome = Outcome::Empty;
    report.after = None;
    report.cells_changed = false;
    if report.before.is_some() {
        core.request_layout();
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(before = ?report.before, "committed empty state");
}

/// Caches the previous state's leftovers and commits `new`.
///
/// Returns whether the committed state reports changed cells.
fn finish<T, C>(
    core: &mut ListCore<T, C>,
    mut old: ListState<T, C>,
    mut new: ListState<T, C>,
    report: &mut TransitionReport,
) -> bool
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    let leftovers = old.len();
    if old.dispose_into(&mut core.cache) {
        report.stats.cached += leftovers;
        new.set_cells_changed(true);
    }
    debug_assert!(new.is_complete(), "incomplete state for {:?}", new.range());

    let cells_changed = new.cells_changed();
    report.outcome = Outcome::Committed;
    report.after = new.range();
    report.cells_changed = cells_changed;
    if cells_changed {
        core.request_layout();
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(
        before = ?report.before,
        after = ?report.after,
        cells_changed,
        stats = ?report.stats,
        "committed state"
    );
    core.state = new;
    cells_changed
}

/// Keeps cells whose index is still in range, then fills the gaps.
fn move_reuse_create<T, C>(
    core: &mut ListCore<T, C>,
    old: &mut ListState<T, C>,
    new: &mut ListState<T, C>,
    range: IndexRange,
    stats: &mut ReconcileStats,
) where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    let mut missing = Indexes::new();
    for index in range {
        match old.remove_by_index(index) {
            Some((item, cell)) => {
                new.add_cell(index, item, cell);
                stats.reused += 1;
            }
            None => missing.push(index),
        }
    }
    fill_remaining(core, old, new, missing, stats);
}

/// Keeps shared indexes and rebinds leftovers to the new ones.
fn scroll_fast_path<T, C>(
    core: &ListCore<T, C>,
    old: &mut ListState<T, C>,
    new: &mut ListState<T, C>,
    range: IndexRange,
    stats: &mut ReconcileStats,
) where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    debug_assert_eq!(
        old.range().map(IndexRange::len),
        Some(range.len()),
        "scroll fast path needs ranges of equal length"
    );
    let mut needed = Indexes::new();
    for index in range {
        match old.remove_by_index(index) {
            Some((item, cell)) => {
                new.add_cell(index, item, cell);
                stats.reused += 1;
            }
            None => needed.push(index),
        }
    }
    for index in needed {
        let Some((_, _, mut cell)) = old.poll_first() else {
            debug_assert!(false, "no leftover cell for index {index}");
            break;
        };
        let item = core.items[index].clone();
        cell.update_index(index);
        cell.update_item(&item);
        stats.index_updates += 1;
        stats.item_updates += 1;
        stats.from_leftovers += 1;
        new.add_cell(index, item, cell);
    }
}

/// Keeps the overlap of the previous and target ranges, then fills the gaps.
fn intersection_rebuild<T, C>(core: &mut ListCore<T, C>, report: &mut TransitionReport)
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    let Some(range) = checked_range(core, report) else {
        return;
    };
    let mut old = core.take_state();
    let mut new = ListState::new(range);
    let common = old.range().and_then(|r| r.intersection(range));
    if let Some(common) = common {
        for index in common {
            if let Some((item, cell)) = old.remove_by_index(index) {
                new.add_cell(index, item, cell);
                report.stats.reused += 1;
            }
        }
    }
    let missing: Indexes = range
        .iter()
        .filter(|&index| !common.is_some_and(|c| c.contains(index)))
        .collect();
    fill_remaining(core, &mut old, &mut new, missing, &mut report.stats);
    if !finish(core, old, new, report) {
        core.request_layout();
    }
}

/// Sources a cell for every index in `missing`.
///
/// Leftovers from `old` come first (rebound to index and item); once they run
/// out, cells come from the cache or the factory and the new state is marked
/// as having changed cells.
fn fill_remaining<T, C>(
    core: &mut ListCore<T, C>,
    old: &mut ListState<T, C>,
    new: &mut ListState<T, C>,
    missing: Indexes,
    stats: &mut ReconcileStats,
) where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    for index in missing {
        let item = core.items[index].clone();
        let cell = if let Some((_, _, mut cell)) = old.poll_first() {
            cell.update_index(index);
            cell.update_item(&item);
            stats.item_updates += 1;
            stats.from_leftovers += 1;
            cell
        } else {
            let Some(mut cell) = core.item_to_cell(index, stats) else {
                debug_assert!(false, "no cell source for index {index}");
                continue;
            };
            new.set_cells_changed(true);
            cell.update_index(index);
            cell
        };
        stats.index_updates += 1;
        new.add_cell(index, item, cell);
    }
}

#[cfg(test)]
mod tests {
    use super::ListManager;

    #[test]
    fn guard_is_scoped_to_the_closure() {
        let mut manager = ListManager::new();
        assert!(!manager.is_normalizing());
        let inside = manager.guarded(|m| m.is_normalizing());
        assert!(inside);
        assert!(!manager.is_normalizing());
    }
}
