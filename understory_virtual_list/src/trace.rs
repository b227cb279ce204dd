// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition reports.
//!
//! The list keeps no log of its own. After every handled trigger it builds a
//! [`TransitionReport`] describing what happened (which trigger, whether a state
//! was committed, and how many cells were reused, rebound, pulled from the
//! cache, or created) and exposes it through
//! [`VirtualList::last_report`](crate::VirtualList::last_report).
//!
//! Hosts that want the full history install a [`TransitionTrace`] sink with
//! [`VirtualList::set_trace`](crate::VirtualList::set_trace). Any
//! `FnMut(&TransitionReport)` closure is a sink; [`TransitionRecorder`] is a
//! small one that stores every report.

use alloc::vec::Vec;

use crate::IndexRange;

/// A structural change to the item collection.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ItemsChange {
    /// `count` items were inserted starting at `at`.
    Insert {
        /// First inserted index.
        at: usize,
        /// Number of inserted items.
        count: usize,
    },
    /// `count` items were removed starting at `at`.
    Remove {
        /// First removed index.
        at: usize,
        /// Number of removed items.
        count: usize,
    },
    /// The item at `at` was replaced.
    Replace {
        /// Replaced index.
        at: usize,
    },
    /// Items were reordered.
    Permute,
    /// The collection was replaced or edited arbitrarily.
    Reset,
}

/// What caused a transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Trigger {
    /// The viewport's main extent changed.
    Geometry,
    /// The main-axis scroll position changed.
    Position,
    /// The cell factory was replaced.
    CellFactory,
    /// The item collection changed.
    Items(ItemsChange),
    /// The cell size changed.
    CellSize,
    /// The spacing changed.
    Spacing,
    /// The orientation changed.
    Orientation,
    /// The helper factory was replaced.
    Helper,
    /// The buffer size changed.
    Buffer,
    /// Fit-to-viewport was toggled.
    FitToViewport,
    /// Realized cells were re-bound to their current items.
    Refresh,
    /// The list was torn down.
    Dispose,
}

/// How a trigger ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// A new state with a window was committed.
    Committed,
    /// The empty state was committed.
    Empty,
    /// The handler returned without building a new state.
    Ignored,
}

/// Per-transition churn counters.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ReconcileStats {
    /// Cells moved to the new state without any update.
    pub reused: usize,
    /// Calls to [`Cell::update_index`](crate::Cell::update_index).
    pub index_updates: usize,
    /// Calls to [`Cell::update_item`](crate::Cell::update_item).
    pub item_updates: usize,
    /// Cells taken over from the previous state at a different index.
    pub from_leftovers: usize,
    /// Cells taken from the cache.
    pub from_cache: usize,
    /// Cells built by the factory.
    pub created: usize,
    /// Leftover cells handed to the cache (including any it had to dispose).
    pub cached: usize,
}

impl ReconcileStats {
    /// Adds `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        self.reused += other.reused;
        self.index_updates += other.index_updates;
        self.item_updates += other.item_updates;
        self.from_leftovers += other.from_leftovers;
        self.from_cache += other.from_cache;
        self.created += other.created;
        self.cached += other.cached;
    }

    /// Number of cells that had to be sourced from outside the previous state.
    #[must_use]
    pub fn acquired(&self) -> usize {
        self.from_cache + self.created
    }
}

/// Summary of one handled trigger.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransitionReport {
    /// The trigger.
    pub trigger: Trigger,
    /// How the handler ended.
    pub outcome: Outcome,
    /// Range realized before the trigger.
    pub before: Option<IndexRange>,
    /// Range realized after the trigger.
    pub after: Option<IndexRange>,
    /// Whether the committed state reports changed cells.
    pub cells_changed: bool,
    /// Churn counters.
    pub stats: ReconcileStats,
}

impl TransitionReport {
    pub(crate) fn new(trigger: Trigger, before: Option<IndexRange>) -> Self {
        Self {
            trigger,
            outcome: Outcome::Ignored,
            before,
            after: before,
            cells_changed: false,
            stats: ReconcileStats::default(),
        }
    }
}

/// A callback sink for transition reports.
pub trait TransitionTrace {
    /// Called once per handled trigger, after the new state is in place.
    fn transition(&mut self, report: &TransitionReport);
}

impl<F> TransitionTrace for F
where
    F: FnMut(&TransitionReport),
{
    fn transition(&mut self, report: &TransitionReport) {
        self(report);
    }
}

/// Stores every report it receives.
#[derive(Clone, Debug, Default)]
pub struct TransitionRecorder {
    reports: Vec<TransitionReport>,
}

impl TransitionRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded reports, oldest first.
    #[must_use]
    pub fn reports(&self) -> &[TransitionReport] {
        &self.reports
    }

    /// The most recent report.
    #[must_use]
    pub fn last(&self) -> Option<&TransitionReport> {
        self.reports.last()
    }

    /// Number of recorded reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Sum of the churn counters of every recorded report.
    #[must_use]
    pub fn totals(&self) -> ReconcileStats {
        let mut totals = ReconcileStats::default();
        for report in &self.reports {
            totals.merge(&report.stats);
        }
        totals
    }

    /// Forgets every recorded report.
    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl TransitionTrace for TransitionRecorder {
    fn transition(&mut self, report: &TransitionReport) {
        self.reports.push(*report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_accumulates_totals() {
        let mut rec = TransitionRecorder::new();
        let mut report = TransitionReport::new(Trigger::Position, IndexRange::new(0, 11));
        report.stats.index_updates = 3;
        report.stats.item_updates = 3;
        rec.transition(&report);

        report.trigger = Trigger::Items(ItemsChange::Remove { at: 5, count: 1 });
        report.stats = ReconcileStats {
            created: 1,
            ..ReconcileStats::default()
        };
        rec.transition(&report);

        assert_eq!(rec.len(), 2);
        let totals = rec.totals();
        assert_eq!(totals.index_updates, 3);
        assert_eq!(totals.acquired(), 1);
        assert_eq!(rec.last().map(|r| r.trigger), Some(report.trigger));
        rec.clear();
        assert!(rec.is_empty());
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = 0;
        {
            let mut sink = |_: &TransitionReport| seen += 1;
            let report = TransitionReport::new(Trigger::Geometry, None);
            sink.transition(&report);
            sink.transition(&report);
        }
        assert_eq!(seen, 2);
    }
}
