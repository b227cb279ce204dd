// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The list container.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::Hash;

use kurbo::{Point, Rect, Size, Vec2};

use crate::config::{normalize_cell_size, normalize_spacing};
use crate::manager::ListManager;
use crate::{
    BufferSize, Cell, CellCache, CellFactory, HelperFactory, IndexRange, ItemsChange, ListConfig,
    ListGeometry, ListHelper, ListState, Orientation, PopulateError, ReconcileStats,
    TransitionReport, TransitionTrace, Trigger,
};

/// Everything the manager reads and writes during a transition.
pub(crate) struct ListCore<T, C> {
    pub(crate) items: Vec<T>,
    pub(crate) config: ListConfig,
    pub(crate) viewport: Size,
    pub(crate) position: Point,
    pub(crate) max_cross: f64,
    pub(crate) factory: Option<CellFactory<T, C>>,
    pub(crate) cache: CellCache<T, C>,
    pub(crate) state: ListState<T, C>,
    pub(crate) helper: &'static dyn ListHelper,
    pub(crate) helper_factory: HelperFactory,
    pub(crate) needs_layout: bool,
}

impl<T, C> ListCore<T, C>
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    pub(crate) fn geometry(&self) -> ListGeometry {
        ListGeometry {
            viewport: self.viewport,
            position: self.position,
            cell_size: self.config.cell_size,
            spacing: self.config.spacing,
            buffer: self.config.buffer_size,
            len: self.items.len(),
            fit_to_viewport: self.config.fit_to_viewport,
            max_cross: self.max_cross,
        }
    }

    pub(crate) fn range(&self) -> Option<IndexRange> {
        self.helper.range(&self.geometry())
    }

    /// Cells can only be realized with items, a factory, and a positive cell
    /// size.
    pub(crate) fn can_realize(&self) -> bool {
        !self.items.is_empty() && self.factory.is_some() && self.config.cell_size > 0.0
    }

    pub(crate) fn take_state(&mut self) -> ListState<T, C> {
        core::mem::replace(&mut self.state, ListState::empty())
    }

    pub(crate) fn request_layout(&mut self) {
        self.needs_layout = true;
    }

    /// A cell for the item at `index`: cached if possible, otherwise new.
    pub(crate) fn item_to_cell(&mut self, index: usize, stats: &mut ReconcileStats) -> Option<C> {
        let item = &self.items[index];
        if let Some(mut cell) = self.cache.take() {
            cell.update_item(item);
            stats.item_updates += 1;
            stats.from_cache += 1;
            return Some(cell);
        }
        let cell = self.factory.as_mut()?.create(Some(item));
        stats.created += 1;
        Some(cell)
    }
}

/// A virtualized list of `T` rendered through recycled cells of type `C`.
///
/// The list owns the items, the geometry (viewport size, scroll position, cell
/// size, spacing, buffer, orientation), the [`CellFactory`], the
/// [`CellCache`], and the current [`ListState`]. Every setter that affects the
/// realized window runs exactly one transition and records a
/// [`TransitionReport`].
///
/// Nothing is realized until the list has items, a cell factory, a positive
/// cell size, and a viewport with a main extent:
///
/// ```rust
/// use kurbo::Size;
/// use understory_virtual_list::{BufferSize, Cell, CellFactory, ListConfig, VirtualList};
///
/// struct Row {
///     index: usize,
///     text: String,
/// }
///
/// impl Cell<String> for Row {
///     fn update_index(&mut self, index: usize) {
///         self.index = index;
///     }
///     fn update_item(&mut self, item: &String) {
///         self.text.clone_from(item);
///     }
/// }
///
/// let items: Vec<String> = (0..1000).map(|i| format!("row {i}")).collect();
/// let config = ListConfig::default().with_buffer_size(BufferSize::Small);
/// let mut list = VirtualList::from_items(config, items);
/// list.set_cell_factory(Some(CellFactory::new(|item: Option<&String>| Row {
///     index: 0,
///     text: item.cloned().unwrap_or_default(),
/// })));
/// list.set_viewport_size(Size::new(200.0, 320.0));
///
/// // Ten rows fit; one extra on each side, clamped at the start.
/// assert_eq!(list.range().map(|r| (r.min(), r.max())), Some((0, 11)));
///
/// list.scroll_to_index(500);
/// assert_eq!(list.range().map(|r| (r.min(), r.max())), Some((499, 510)));
/// assert_eq!(list.state().get(500).map(|row| row.text.as_str()), Some("row 500"));
///
/// list.layout(|_index, _row, _rect| {
///     // Position the row's visual node at `rect`, offset by `list.viewport_position()`.
/// });
/// assert!(!list.needs_layout());
/// ```
pub struct VirtualList<T, C> {
    core: ListCore<T, C>,
    manager: ListManager,
    last_report: Option<TransitionReport>,
    trace: Option<Box<dyn TransitionTrace>>,
}

impl<T, C> VirtualList<T, C>
where
    T: Clone + Eq + Hash,
    C: Cell<T>,
{
    /// Creates an empty list.
    #[must_use]
    pub fn new(config: ListConfig) -> Self {
        Self::from_items(config, Vec::new())
    }

    /// Creates a list over `items`.
    ///
    /// The list stays empty until a cell factory and a viewport size are set.
    #[must_use]
    pub fn from_items(config: ListConfig, items: Vec<T>) -> Self {
        let config = config.normalized();
        let helper_factory: HelperFactory = Orientation::helper;
        Self {
            core: ListCore {
                items,
                config,
                viewport: Size::ZERO,
                position: Point::ZERO,
                max_cross: 0.0,
                factory: None,
                cache: CellCache::new(config.cache_capacity),
                state: ListState::empty(),
                helper: helper_factory(config.orientation),
                helper_factory,
                needs_layout: false,
            },
            manager: ListManager::new(),
            last_report: None,
            trace: None,
        }
    }

    // --- configuration ---

    /// The current configuration.
    #[must_use]
    pub fn config(&self) -> &ListConfig {
        &self.core.config
    }

    /// Returns `true` if a cell factory is set.
    #[must_use]
    pub fn has_cell_factory(&self) -> bool {
        self.core.factory.is_some()
    }

    /// Replaces the cell factory.
    ///
    /// Every realized and cached cell was built by the previous factory, so all
    /// of them are disposed and the window is rebuilt from scratch.
    pub fn set_cell_factory(&mut self, factory: Option<CellFactory<T, C>>) {
        self.core.factory = factory;
        let report = self.manager.on_cell_factory_changed(&mut self.core);
        self.publish(report);
    }

    /// Sets the main-axis cell size. Non-finite values become `0.0`.
    pub fn set_cell_size(&mut self, cell_size: f64) {
        let cell_size = normalize_cell_size(cell_size);
        if cell_size == self.core.config.cell_size {
            return;
        }
        self.core.config.cell_size = cell_size;
        let report = self
            .manager
            .on_extent_changed(&mut self.core, Trigger::CellSize);
        self.publish(report);
    }

    /// Sets the spacing between cells. Negative and non-finite values become
    /// `0.0`.
    pub fn set_spacing(&mut self, spacing: f64) {
        let spacing = normalize_spacing(spacing);
        if spacing == self.core.config.spacing {
            return;
        }
        self.core.config.spacing = spacing;
        let report = self.manager.on_spacing_changed(&mut self.core);
        self.publish(report);
    }

    /// Sets the number of buffer cells on each side of the visible area.
    pub fn set_buffer_size(&mut self, buffer_size: BufferSize) {
        if buffer_size == self.core.config.buffer_size {
            return;
        }
        self.core.config.buffer_size = buffer_size;
        let report = self
            .manager
            .on_geometry_changed(&mut self.core, Trigger::Buffer);
        self.publish(report);
    }

    /// Sets the scrolling axis.
    ///
    /// Both scroll positions are reset to zero and the cross extent recorded
    /// from previous layouts is forgotten.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation == self.core.config.orientation {
            return;
        }
        self.core.config.orientation = orientation;
        self.core.helper = (self.core.helper_factory)(orientation);
        self.core.max_cross = 0.0;
        let report = self.manager.on_orientation_changed(&mut self.core);
        self.publish(report);
    }

    /// The function building the helper for each orientation.
    #[must_use]
    pub fn helper_factory(&self) -> HelperFactory {
        self.core.helper_factory
    }

    /// Replaces the function building the [`ListHelper`] for each orientation.
    ///
    /// The helper for the current orientation is installed at once: positions
    /// are clamped against its bounds and the window is rebuilt around the
    /// overlap with the previous one. Later orientation changes ask the same
    /// factory.
    pub fn set_helper_factory(&mut self, factory: HelperFactory) {
        self.core.helper_factory = factory;
        self.core.helper = factory(self.core.config.orientation);
        let report = self
            .manager
            .on_extent_changed(&mut self.core, Trigger::Helper);
        self.publish(report);
    }

    /// Sets whether cells span the viewport's cross extent.
    pub fn set_fit_to_viewport(&mut self, fit: bool) {
        if fit == self.core.config.fit_to_viewport {
            return;
        }
        self.core.config.fit_to_viewport = fit;
        let report = self.manager.on_fit_to_viewport_changed(&mut self.core);
        self.publish(report);
    }

    /// Sets the cache capacity, disposing the oldest cached cells if needed.
    pub fn set_cache_capacity(&mut self, capacity: usize) {
        self.core.config.cache_capacity = capacity;
        self.core.cache.set_capacity(capacity);
    }

    // --- geometry and scrolling ---

    /// The viewport size.
    #[must_use]
    pub fn viewport_size(&self) -> Size {
        self.core.viewport
    }

    /// Sets the viewport size.
    ///
    /// A change of the main extent recomputes the window; a change of the cross
    /// extent only requests a layout pass.
    pub fn set_viewport_size(&mut self, size: Size) {
        let old = self.core.viewport;
        if old == size {
            return;
        }
        self.core.viewport = size;
        let helper = self.core.helper;
        if helper.main_extent(old) != helper.main_extent(size) {
            let report = self
                .manager
                .on_geometry_changed(&mut self.core, Trigger::Geometry);
            self.publish(report);
        } else {
            let geometry = self.core.geometry();
            self.core.position = helper.clamp_position(&geometry, self.core.position);
            self.core.request_layout();
        }
    }

    /// The scroll position; `x` is horizontal and `y` vertical.
    #[must_use]
    pub fn position(&self) -> Point {
        self.core.position
    }

    /// Scrolls to `position`, clamped into the scroll bounds.
    ///
    /// Only main-axis movement can change the window. Cross-axis movement
    /// changes [`VirtualList::viewport_position`] and nothing else.
    pub fn set_position(&mut self, position: Point) {
        let geometry = self.core.geometry();
        let helper = self.core.helper;
        let clamped = helper.clamp_position(&geometry, position);
        if clamped == self.core.position {
            return;
        }
        let main_moved = helper.main_position(clamped) != helper.main_position(self.core.position);
        self.core.position = clamped;
        if main_moved {
            let report = self.manager.on_position_changed(&mut self.core);
            self.publish(report);
        }
    }

    /// Sets the horizontal scroll position.
    pub fn set_h_position(&mut self, x: f64) {
        self.set_position(Point::new(x, self.core.position.y));
    }

    /// Sets the vertical scroll position.
    pub fn set_v_position(&mut self, y: f64) {
        self.set_position(Point::new(self.core.position.x, y));
    }

    /// Scrolls the main axis by `delta`.
    pub fn scroll_by(&mut self, delta: f64) {
        let target = self.core.helper.scroll_by(&self.core.geometry(), delta);
        self.set_position(target);
    }

    /// Scrolls the main axis to `pixel`.
    pub fn scroll_to_pixel(&mut self, pixel: f64) {
        let target = self.core.helper.scroll_to_pixel(&self.core.geometry(), pixel);
        self.set_position(target);
    }

    /// Scrolls so the item at `index` starts at the top (or left) edge, as far
    /// as the bounds allow.
    pub fn scroll_to_index(&mut self, index: usize) {
        let target = self.core.helper.scroll_to_index(&self.core.geometry(), index);
        self.set_position(target);
    }

    /// Scrolls to the first item.
    pub fn scroll_to_first(&mut self) {
        self.scroll_to_index(0);
    }

    /// Scrolls to the last item.
    pub fn scroll_to_last(&mut self) {
        self.scroll_to_index(self.core.items.len().saturating_sub(1));
    }

    /// The orientation helper in use.
    #[must_use]
    pub fn helper(&self) -> &'static dyn ListHelper {
        self.core.helper
    }

    /// A snapshot of the inputs to the window math.
    #[must_use]
    pub fn geometry(&self) -> ListGeometry {
        self.core.geometry()
    }

    /// Index of the first (partially) visible item.
    #[must_use]
    pub fn first_visible(&self) -> usize {
        self.core.helper.first_visible(&self.core.geometry())
    }

    /// Index of the last (partially) visible item.
    #[must_use]
    pub fn last_visible(&self) -> usize {
        self.core.helper.last_visible(&self.core.geometry())
    }

    /// Number of cells needed to cover the viewport.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.core.helper.visible_count(&self.core.geometry())
    }

    /// Number of cells the window realizes, buffer included.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.core.helper.total_count(&self.core.geometry())
    }

    /// Largest valid scroll position on both axes.
    #[must_use]
    pub fn max_scroll(&self) -> Point {
        self.core.helper.max_position(&self.core.geometry())
    }

    /// Size of the whole content.
    #[must_use]
    pub fn virtual_size(&self) -> Size {
        self.core.helper.virtual_size(&self.core.geometry())
    }

    /// Translation to apply to the group of realized cells.
    #[must_use]
    pub fn viewport_position(&self) -> Vec2 {
        self.core.helper.viewport_position(&self.core.geometry())
    }

    // --- items ---

    /// The items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.core.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.items.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.core.items.is_empty()
    }

    /// Replaces all items.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.core.items = items;
        self.items_changed(ItemsChange::Reset);
    }

    /// Appends an item.
    pub fn push(&mut self, item: T) {
        let at = self.core.items.len();
        self.core.items.push(item);
        self.items_changed(ItemsChange::Insert { at, count: 1 });
    }

    /// Inserts an item at `at`.
    ///
    /// # Panics
    ///
    /// Panics if `at > len`.
    pub fn insert(&mut self, at: usize, item: T) {
        self.core.items.insert(at, item);
        self.items_changed(ItemsChange::Insert { at, count: 1 });
    }

    /// Appends every item yielded by `items`.
    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        let at = self.core.items.len();
        self.core.items.extend(items);
        let count = self.core.items.len() - at;
        if count > 0 {
            self.items_changed(ItemsChange::Insert { at, count });
        }
    }

    /// Removes and returns the item at `at`, or `None` if out of bounds.
    pub fn remove(&mut self, at: usize) -> Option<T> {
        if at >= self.core.items.len() {
            return None;
        }
        let item = self.core.items.remove(at);
        self.items_changed(ItemsChange::Remove { at, count: 1 });
        Some(item)
    }

    /// Replaces the item at `at`, returning the previous one.
    ///
    /// Returns `None` and drops `item` if `at` is out of bounds.
    pub fn replace(&mut self, at: usize, item: T) -> Option<T> {
        let slot = self.core.items.get_mut(at)?;
        let previous = core::mem::replace(slot, item);
        self.items_changed(ItemsChange::Replace { at });
        Some(previous)
    }

    /// Swaps two items.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.core.items.swap(a, b);
        if a != b {
            self.items_changed(ItemsChange::Permute);
        }
    }

    /// Sorts the items with `compare`.
    pub fn sort_by(&mut self, compare: impl FnMut(&T, &T) -> Ordering) {
        self.core.items.sort_by(compare);
        self.items_changed(ItemsChange::Permute);
    }

    /// Keeps only the items matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        let before = self.core.items.len();
        self.core.items.retain(keep);
        if self.core.items.len() != before {
            self.items_changed(ItemsChange::Reset);
        }
    }

    /// Removes every item.
    pub fn clear_items(&mut self) {
        self.core.items.clear();
        self.items_changed(ItemsChange::Reset);
    }

    /// Edits the items arbitrarily, then reconciles once.
    pub fn edit_items<R>(&mut self, edit: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let out = edit(&mut self.core.items);
        self.items_changed(ItemsChange::Reset);
        out
    }

    fn items_changed(&mut self, change: ItemsChange) {
        let report = self.manager.on_items_changed(&mut self.core, change);
        self.publish(report);
    }

    // --- state, cache, layout ---

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &ListState<T, C> {
        &self.core.state
    }

    /// The realized range, or `None` when nothing is realized.
    #[must_use]
    pub fn range(&self) -> Option<IndexRange> {
        self.core.state.range()
    }

    /// The cell cache.
    #[must_use]
    pub fn cache(&self) -> &CellCache<T, C> {
        &self.core.cache
    }

    /// Fills the cache to capacity with cells built for no item.
    ///
    /// # Errors
    ///
    /// Returns [`PopulateError::MissingFactory`] if no factory is set.
    pub fn populate_cache(&mut self) -> Result<usize, PopulateError> {
        self.core.cache.populate(self.core.factory.as_mut())
    }

    /// Returns `true` if cells need to be (re)placed.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.core.needs_layout
    }

    /// Asks for a layout pass.
    pub fn request_layout(&mut self) {
        self.core.request_layout();
    }

    /// Places every realized cell.
    ///
    /// Cells are visited in index order. For each one, `place` receives the
    /// item index, the cell, and its rectangle relative to the cell group
    /// (which the host translates by [`VirtualList::viewport_position`]).
    /// [`Cell::before_layout`] and [`Cell::after_layout`] bracket the call.
    ///
    /// Clears the layout request.
    pub fn layout(&mut self, mut place: impl FnMut(usize, &mut C, Rect)) {
        let geometry = self.core.geometry();
        let helper = self.core.helper;
        let fit = geometry.fit_to_viewport;
        let mut max_cross = if fit {
            helper.cross_extent(geometry.viewport)
        } else {
            self.core.max_cross
        };
        for (layout_index, (index, _, cell)) in self.core.state.iter_mut().enumerate() {
            let cross = if fit {
                0.0
            } else {
                let cross = cell.cross_extent();
                max_cross = max_cross.max(cross);
                cross
            };
            let rect = helper.layout_rect(&geometry, layout_index, cross);
            cell.before_layout();
            place(index, &mut *cell, rect);
            cell.after_layout();
        }
        self.core.max_cross = max_cross;
        self.core.needs_layout = false;
    }

    /// Pushes the current item into realized cells again.
    ///
    /// Useful when items change internally without changing identity. With
    /// an empty slice, every realized cell is refreshed.
    pub fn refresh(&mut self, indexes: &[usize]) {
        let mut report = TransitionReport::new(Trigger::Refresh, self.core.state.range());
        let core = &mut self.core;
        if indexes.is_empty() {
            for (index, _, cell) in core.state.iter_mut() {
                cell.update_item(&core.items[index]);
                report.stats.item_updates += 1;
            }
        } else {
            for &index in indexes {
                if let (Some(cell), Some(item)) = (core.state.get_mut(index), core.items.get(index))
                {
                    cell.update_item(item);
                    report.stats.item_updates += 1;
                }
            }
        }
        if report.stats.item_updates > 0 {
            core.request_layout();
        }
        self.publish(report);
    }

    /// Tears the list down: every realized and cached cell is disposed.
    ///
    /// The list stays usable; the next trigger rebuilds the window.
    pub fn dispose(&mut self) {
        let report = self.manager.dispose(&mut self.core);
        self.publish(report);
    }

    // --- observability ---

    /// The report of the most recent trigger.
    #[must_use]
    pub fn last_report(&self) -> Option<&TransitionReport> {
        self.last_report.as_ref()
    }

    /// Installs a sink that receives every subsequent report.
    pub fn set_trace(&mut self, trace: impl TransitionTrace + 'static) {
        self.trace = Some(Box::new(trace));
    }

    /// Removes and returns the installed sink.
    pub fn take_trace(&mut self) -> Option<Box<dyn TransitionTrace>> {
        self.trace.take()
    }

    fn publish(&mut self, report: TransitionReport) {
        if let Some(trace) = self.trace.as_mut() {
            trace.transition(&report);
        }
        self.last_report = Some(report);
    }
}

impl<T, C> fmt::Debug for VirtualList<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualList")
            .field("len", &self.core.items.len())
            .field("config", &self.core.config)
            .field("viewport", &self.core.viewport)
            .field("position", &self.core.position)
            .field("state", &self.core.state)
            .field("cache", &self.core.cache)
            .field("needs_layout", &self.core.needs_layout)
            .field("last_report", &self.last_report)
            .finish_non_exhaustive()
    }
}
