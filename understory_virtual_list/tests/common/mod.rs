// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for list integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]
#![allow(dead_code, reason = "Not every test file uses every helper.")]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use kurbo::Size;
use understory_virtual_list::{
    BufferSize, Cell, CellFactory, ListConfig, TransitionRecorder, TransitionReport,
    TransitionTrace, VirtualList,
};

/// A lifecycle call observed on a test cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Created { id: u32, item: Option<u32> },
    Index { id: u32, index: usize },
    Item { id: u32, item: u32 },
    Cache { id: u32 },
    Decache { id: u32 },
    BeforeLayout { id: u32 },
    AfterLayout { id: u32 },
    Dispose { id: u32 },
}

pub(crate) type Log = Rc<RefCell<Vec<Event>>>;

/// A cell that records every call it receives.
#[derive(Debug)]
pub(crate) struct TestCell {
    pub(crate) id: u32,
    pub(crate) index: Option<usize>,
    pub(crate) item: Option<u32>,
    pub(crate) cross: f64,
    log: Log,
}

impl Cell<u32> for TestCell {
    fn update_index(&mut self, index: usize) {
        self.index = Some(index);
        self.log.borrow_mut().push(Event::Index { id: self.id, index });
    }

    fn update_item(&mut self, item: &u32) {
        self.item = Some(*item);
        self.log.borrow_mut().push(Event::Item {
            id: self.id,
            item: *item,
        });
    }

    fn before_layout(&mut self) {
        self.log.borrow_mut().push(Event::BeforeLayout { id: self.id });
    }

    fn after_layout(&mut self) {
        self.log.borrow_mut().push(Event::AfterLayout { id: self.id });
    }

    fn on_cache(&mut self) {
        self.log.borrow_mut().push(Event::Cache { id: self.id });
    }

    fn on_decache(&mut self) {
        self.log.borrow_mut().push(Event::Decache { id: self.id });
    }

    fn cross_extent(&self) -> f64 {
        self.cross
    }

    fn dispose(self) {
        self.log.borrow_mut().push(Event::Dispose { id: self.id });
    }
}

/// A factory numbering its cells from 1 and logging into `log`.
///
/// The cell's cross extent is derived from its item so layout tests can
/// observe cross-axis tracking.
pub(crate) fn factory(log: &Log) -> CellFactory<u32, TestCell> {
    let log = log.clone();
    let mut next = 0;
    CellFactory::new(move |item: Option<&u32>| {
        next += 1;
        let item = item.copied();
        log.borrow_mut().push(Event::Created { id: next, item });
        TestCell {
            id: next,
            index: None,
            item,
            cross: 100.0 + f64::from(item.unwrap_or(0) % 7) * 10.0,
            log: log.clone(),
        }
    })
}

pub(crate) struct Fixture {
    pub(crate) list: VirtualList<u32, TestCell>,
    pub(crate) log: Log,
    pub(crate) recorder: Rc<RefCell<TransitionRecorder>>,
}

impl Fixture {
    /// Number of logged events matching `pred` since the last [`Fixture::reset`].
    pub(crate) fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.log.borrow().iter().filter(|e| pred(e)).count()
    }

    pub(crate) fn created(&self) -> usize {
        self.count(|e| matches!(e, Event::Created { .. }))
    }

    pub(crate) fn disposed(&self) -> usize {
        self.count(|e| matches!(e, Event::Dispose { .. }))
    }

    pub(crate) fn index_updates(&self) -> usize {
        self.count(|e| matches!(e, Event::Index { .. }))
    }

    pub(crate) fn item_updates(&self) -> usize {
        self.count(|e| matches!(e, Event::Item { .. }))
    }

    pub(crate) fn decached(&self) -> usize {
        self.count(|e| matches!(e, Event::Decache { .. }))
    }

    /// Forgets the event log and the recorded reports.
    pub(crate) fn reset(&self) {
        self.log.borrow_mut().clear();
        self.recorder.borrow_mut().clear();
    }

    /// Number of transitions recorded since the last [`Fixture::reset`].
    pub(crate) fn transitions(&self) -> usize {
        self.recorder.borrow().len()
    }

    /// Ids of the realized cells, in index order.
    pub(crate) fn realized_ids(&self) -> Vec<u32> {
        self.list.state().iter().map(|(_, _, c)| c.id).collect()
    }

    /// Checks the structural invariants every committed state must satisfy.
    pub(crate) fn assert_consistent(&self) {
        let state = self.list.state();
        match state.range() {
            None => assert!(state.is_empty(), "empty state holds cells"),
            Some(range) => {
                assert_eq!(state.len(), range.len(), "window not fully realized");
                for (index, item, cell) in state.iter() {
                    assert!(range.contains(index), "index {index} outside {range}");
                    assert_eq!(cell.index, Some(index), "cell {} has a stale index", cell.id);
                    assert_eq!(cell.item, Some(*item), "cell {} has a stale item", cell.id);
                    assert_eq!(self.list.items()[index], *item, "state item out of sync");
                }
            }
        }

        let mut ids = HashSet::new();
        for (_, _, cell) in state.iter() {
            assert!(ids.insert(cell.id), "cell {} realized twice", cell.id);
        }
        for cell in self.list.cache().iter() {
            assert!(ids.insert(cell.id), "cell {} both realized and cached", cell.id);
        }
        assert!(
            self.list.cache().len() <= self.list.cache().capacity(),
            "cache over capacity"
        );
    }
}

/// A vertical list over `0..len` with 32px cells, a viewport fitting 10 of them, and a
/// buffer of one cell per side.
pub(crate) fn fixture(len: u32) -> Fixture {
    fixture_with(
        len,
        ListConfig::default().with_buffer_size(BufferSize::Small),
        Size::new(200.0, 320.0),
    )
}

pub(crate) fn fixture_with(len: u32, config: ListConfig, viewport: Size) -> Fixture {
    let log = Log::default();
    let recorder = Rc::new(RefCell::new(TransitionRecorder::new()));
    let mut list = VirtualList::from_items(config, (0..len).collect());
    list.set_cell_factory(Some(factory(&log)));
    list.set_viewport_size(viewport);
    let sink = recorder.clone();
    list.set_trace(move |report: &TransitionReport| sink.borrow_mut().transition(report));
    let fixture = Fixture {
        list,
        log,
        recorder,
    };
    fixture.reset();
    fixture
}
