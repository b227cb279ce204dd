// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Orientation-specific window and scroll math.
//!
//! Everything here is a pure function of a [`ListGeometry`] snapshot. The
//! formulas are written once, in terms of a *main* axis (the scrolling one) and
//! a *cross* axis; [`VerticalHelper`] and [`HorizontalHelper`] only say which
//! of `x`/`y` plays which role.
//!
//! With `step = cell_size + spacing`:
//!
//! - `visible_count = ceil(viewport_main / step)`;
//! - `total_count = min(visible_count + 2 * buffer, len)`, or `0` when nothing
//!   is visible;
//! - `first_visible = clamp(floor(main_position / step), 0, len - 1)`;
//! - the realized range starts `buffer` cells before the first visible one and
//!   is shifted back when it would run past the end of the collection.

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size, Vec2};

use crate::{BufferSize, IndexRange, Orientation};

/// The inputs every [`ListHelper`] computation reads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ListGeometry {
    /// Size of the viewport.
    pub viewport: Size,
    /// Scroll position; `x` is the horizontal offset and `y` the vertical one.
    pub position: Point,
    /// Main-axis extent of each cell.
    pub cell_size: f64,
    /// Gap between consecutive cells.
    pub spacing: f64,
    /// Extra cells realized on each side of the visible area.
    pub buffer: BufferSize,
    /// Number of items in the collection.
    pub len: usize,
    /// Whether cells span the viewport's cross extent.
    pub fit_to_viewport: bool,
    /// Largest cross extent reported by a cell so far.
    pub max_cross: f64,
}

impl ListGeometry {
    /// Distance from the start of one cell to the start of the next.
    #[must_use]
    pub fn cell_step(&self) -> f64 {
        self.cell_size + self.spacing
    }
}

/// Window, bounds, and placement math for one orientation.
///
/// Only the axis projections are required; every computation is provided in
/// terms of them. Helpers are stateless and shared: see
/// [`Orientation::helper`]. Overriding a provided method changes how a
/// [`VirtualList`](crate::VirtualList) windows its items once the helper is
/// installed through [`HelperFactory`].
pub trait ListHelper: fmt::Debug + Sync {
    /// The orientation this helper implements.
    fn orientation(&self) -> Orientation;

    /// Main-axis component of `size`.
    fn main_extent(&self, size: Size) -> f64;

    /// Cross-axis component of `size`.
    fn cross_extent(&self, size: Size) -> f64;

    /// Main-axis component of `position`.
    fn main_position(&self, position: Point) -> f64;

    /// Cross-axis component of `position`.
    fn cross_position(&self, position: Point) -> f64;

    /// Builds a point from main and cross coordinates.
    fn point(&self, main: f64, cross: f64) -> Point;

    /// Builds a size from main and cross extents.
    fn size(&self, main: f64, cross: f64) -> Size;

    /// Number of cells needed to cover the viewport.
    fn visible_count(&self, geometry: &ListGeometry) -> usize {
        let step = geometry.cell_step();
        if step.is_nan() || step <= 0.0 {
            return 0;
        }
        to_index((self.main_extent(geometry.viewport) / step).ceil())
    }

    /// Number of cells to realize: the visible ones plus the buffer on both
    /// sides, capped by the collection length.
    fn total_count(&self, geometry: &ListGeometry) -> usize {
        let visible = self.visible_count(geometry);
        if visible == 0 {
            return 0;
        }
        visible
            .saturating_add(2 * geometry.buffer.count())
            .min(geometry.len)
    }

    /// Index of the item under main-axis offset `offset`, clamped into the
    /// collection.
    fn index_at(&self, geometry: &ListGeometry, offset: f64) -> usize {
        let step = geometry.cell_step();
        if geometry.len == 0 || step.is_nan() || step <= 0.0 {
            return 0;
        }
        to_index((offset / step).floor()).min(geometry.len - 1)
    }

    /// Index of the first (partially) visible item.
    fn first_visible(&self, geometry: &ListGeometry) -> usize {
        self.index_at(geometry, self.main_position(geometry.position))
    }

    /// Index of the last (partially) visible item.
    fn last_visible(&self, geometry: &ListGeometry) -> usize {
        let end = self.main_position(geometry.position) + self.main_extent(geometry.viewport);
        self.index_at(geometry, end)
    }

    /// The range of indices to realize, or `None` when there is no window.
    fn range(&self, geometry: &ListGeometry) -> Option<IndexRange> {
        let extent = self.main_extent(geometry.viewport);
        if extent.is_nan() || extent <= 0.0 {
            return None;
        }
        let total = self.total_count(geometry);
        if total == 0 {
            return None;
        }
        let mut start = self
            .first_visible(geometry)
            .saturating_sub(geometry.buffer.count());
        let end = (geometry.len - 1).min(start + total - 1);
        if end - start + 1 < total {
            start = (end + 1).saturating_sub(total);
        }
        IndexRange::new(start, end)
    }

    /// Main-axis extent of the whole collection.
    fn virtual_main(&self, geometry: &ListGeometry) -> f64 {
        if geometry.len == 0 {
            return 0.0;
        }
        (geometry.len as f64 * geometry.cell_step() - geometry.spacing).max(0.0)
    }

    /// Cross-axis extent of the content.
    fn virtual_cross(&self, geometry: &ListGeometry) -> f64 {
        if geometry.fit_to_viewport {
            self.cross_extent(geometry.viewport)
        } else {
            geometry.max_cross
        }
    }

    /// Full content size.
    fn virtual_size(&self, geometry: &ListGeometry) -> Size {
        self.size(self.virtual_main(geometry), self.virtual_cross(geometry))
    }

    /// Largest valid main-axis scroll position.
    fn max_main_scroll(&self, geometry: &ListGeometry) -> f64 {
        (self.virtual_main(geometry) - self.main_extent(geometry.viewport)).max(0.0)
    }

    /// Largest valid cross-axis scroll position.
    fn max_cross_scroll(&self, geometry: &ListGeometry) -> f64 {
        (self.virtual_cross(geometry) - self.cross_extent(geometry.viewport)).max(0.0)
    }

    /// Largest valid scroll position on both axes.
    fn max_position(&self, geometry: &ListGeometry) -> Point {
        self.point(
            self.max_main_scroll(geometry),
            self.max_cross_scroll(geometry),
        )
    }

    /// Clamps `position` into `[0, max]` on both axes. NaN becomes `0`.
    fn clamp_position(&self, geometry: &ListGeometry, position: Point) -> Point {
        self.point(
            clamp_scroll(self.main_position(position), self.max_main_scroll(geometry)),
            clamp_scroll(self.cross_position(position), self.max_cross_scroll(geometry)),
        )
    }

    /// Translation to apply to the realized cell group so that the cell at
    /// layout index `0` (the first of the range) lands where it belongs.
    ///
    /// Zero when there is no window.
    fn viewport_position(&self, geometry: &ListGeometry) -> Vec2 {
        let Some(range) = self.range(geometry) else {
            return Vec2::ZERO;
        };
        let step = geometry.cell_step();
        let main = self.main_position(geometry.position);
        let to_first = (self.first_visible(geometry) - range.min()) as f64 * step;
        let cross = clamp_scroll(
            self.cross_position(geometry.position),
            self.max_cross_scroll(geometry),
        );
        self.point(-(to_first + main % step), -cross).to_vec2()
    }

    /// Placement of the `layout_index`-th realized cell, relative to the
    /// translated cell group.
    ///
    /// `cell_cross` is the cell's own cross extent; it is ignored when cells
    /// fit the viewport.
    fn layout_rect(&self, geometry: &ListGeometry, layout_index: usize, cell_cross: f64) -> Rect {
        let main = geometry.cell_step() * layout_index as f64;
        let cross = if geometry.fit_to_viewport {
            self.cross_extent(geometry.viewport)
        } else {
            cell_cross
        };
        Rect::from_origin_size(
            self.point(main, 0.0),
            self.size(geometry.cell_size, cross),
        )
    }

    /// Position after scrolling the main axis by `delta`, clamped.
    fn scroll_by(&self, geometry: &ListGeometry, delta: f64) -> Point {
        self.scroll_to_pixel(geometry, self.main_position(geometry.position) + delta)
    }

    /// Position with the main axis at `pixel`, clamped.
    fn scroll_to_pixel(&self, geometry: &ListGeometry, pixel: f64) -> Point {
        let target = self.point(pixel, self.cross_position(geometry.position));
        self.clamp_position(geometry, target)
    }

    /// Position that brings the item at `index` to the start of the viewport,
    /// clamped.
    fn scroll_to_index(&self, geometry: &ListGeometry, index: usize) -> Point {
        self.scroll_to_pixel(geometry, geometry.cell_step() * index as f64)
    }
}

/// Helper for lists scrolling along `y`.
#[derive(Copy, Clone, Debug, Default)]
pub struct VerticalHelper;

impl ListHelper for VerticalHelper {
    fn orientation(&self) -> Orientation {
        Orientation::Vertical
    }

    fn main_extent(&self, size: Size) -> f64 {
        size.height
    }

    fn cross_extent(&self, size: Size) -> f64 {
        size.width
    }

    fn main_position(&self, position: Point) -> f64 {
        position.y
    }

    fn cross_position(&self, position: Point) -> f64 {
        position.x
    }

    fn point(&self, main: f64, cross: f64) -> Point {
        Point::new(cross, main)
    }

    fn size(&self, main: f64, cross: f64) -> Size {
        Size::new(cross, main)
    }
}

/// Helper for lists scrolling along `x`.
#[derive(Copy, Clone, Debug, Default)]
pub struct HorizontalHelper;

impl ListHelper for HorizontalHelper {
    fn orientation(&self) -> Orientation {
        Orientation::Horizontal
    }

    fn main_extent(&self, size: Size) -> f64 {
        size.width
    }

    fn cross_extent(&self, size: Size) -> f64 {
        size.height
    }

    fn main_position(&self, position: Point) -> f64 {
        position.x
    }

    fn cross_position(&self, position: Point) -> f64 {
        position.y
    }

    fn point(&self, main: f64, cross: f64) -> Point {
        Point::new(main, cross)
    }

    fn size(&self, main: f64, cross: f64) -> Size {
        Size::new(main, cross)
    }
}

/// Builds the helper a list uses for an orientation.
///
/// The default is [`Orientation::helper`]. Custom helpers are typically
/// unit structs, so `&MyHelper` is already `'static`.
pub type HelperFactory = fn(Orientation) -> &'static dyn ListHelper;

impl Orientation {
    /// The shared helper implementing this orientation.
    #[must_use]
    pub fn helper(self) -> &'static dyn ListHelper {
        match self {
            Self::Vertical => &VerticalHelper,
            Self::Horizontal => &HorizontalHelper,
        }
    }
}

fn clamp_scroll(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "Float-to-int casts saturate; callers clamp the result into the collection"
)]
fn to_index(value: f64) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    value as usize
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Size, Vec2};

    use super::{ListGeometry, ListHelper};
    use crate::{BufferSize, IndexRange, Orientation};

    fn geometry(len: usize) -> ListGeometry {
        ListGeometry {
            viewport: Size::new(200.0, 320.0),
            position: Point::ZERO,
            cell_size: 32.0,
            spacing: 0.0,
            buffer: BufferSize::Small,
            len,
            fit_to_viewport: true,
            max_cross: 0.0,
        }
    }

    #[test]
    fn window_of_a_fresh_list() {
        let h = Orientation::Vertical.helper();
        let g = geometry(1000);
        assert_eq!(h.visible_count(&g), 10);
        assert_eq!(h.total_count(&g), 12);
        assert_eq!(h.first_visible(&g), 0);
        assert_eq!(h.last_visible(&g), 10);
        assert_eq!(h.range(&g), IndexRange::new(0, 11));
    }

    #[test]
    fn window_after_scrolling_to_index() {
        let h = Orientation::Vertical.helper();
        let mut g = geometry(1000);
        g.position = h.scroll_to_index(&g, 500);
        assert_eq!(g.position, Point::new(0.0, 16000.0));
        assert_eq!(h.first_visible(&g), 500);
        assert_eq!(h.range(&g), IndexRange::new(499, 510));
    }

    #[test]
    fn window_is_shifted_back_at_the_end() {
        let h = Orientation::Vertical.helper();
        let mut g = geometry(1000);
        g.position = h.scroll_to_index(&g, 999);
        // Clamped to the last full page.
        assert_eq!(g.position.y, 1000.0 * 32.0 - 320.0);
        assert_eq!(h.range(&g), IndexRange::new(988, 999));
    }

    #[test]
    fn short_collections_cap_the_window() {
        let h = Orientation::Vertical.helper();
        let g = geometry(5);
        assert_eq!(h.total_count(&g), 5);
        assert_eq!(h.range(&g), IndexRange::new(0, 4));
        assert_eq!(h.max_main_scroll(&g), 0.0);
    }

    #[test]
    fn degenerate_geometry_has_no_window() {
        let h = Orientation::Vertical.helper();
        assert_eq!(h.range(&geometry(0)), None);

        let mut g = geometry(10);
        g.viewport = Size::new(200.0, 0.0);
        assert_eq!(h.range(&g), None);
        assert_eq!(h.viewport_position(&g), Vec2::ZERO);

        let mut g = geometry(10);
        g.cell_size = 0.0;
        assert_eq!(h.visible_count(&g), 0);
        assert_eq!(h.range(&g), None);
    }

    #[test]
    fn bounds_subtract_trailing_spacing() {
        let h = Orientation::Vertical.helper();
        let mut g = geometry(10);
        g.spacing = 8.0;
        assert_eq!(h.virtual_main(&g), 10.0 * 40.0 - 8.0);
        assert_eq!(h.max_main_scroll(&g), 392.0 - 320.0);
        assert_eq!(h.max_cross_scroll(&g), 0.0);
    }

    #[test]
    fn translation_accounts_for_buffer_and_partial_cell() {
        let h = Orientation::Vertical.helper();
        let mut g = geometry(1000);
        g.position = Point::new(0.0, 100.0 * 32.0 + 10.0);
        // First visible 100, range starts at 99: one full cell plus 10px.
        assert_eq!(h.range(&g).map(IndexRange::min), Some(99));
        assert_eq!(h.viewport_position(&g), Vec2::new(0.0, -42.0));
    }

    #[test]
    fn cross_scroll_follows_widest_cell_when_not_fitting() {
        let h = Orientation::Vertical.helper();
        let mut g = geometry(100);
        g.fit_to_viewport = false;
        g.max_cross = 260.0;
        assert_eq!(h.max_cross_scroll(&g), 60.0);
        let clamped = h.clamp_position(&g, Point::new(500.0, -4.0));
        assert_eq!(clamped, Point::new(60.0, 0.0));

        g.position = Point::new(30.0, 0.0);
        assert_eq!(h.viewport_position(&g), Vec2::new(-30.0, -0.0));
        assert_eq!(
            h.layout_rect(&g, 2, 150.0),
            Rect::new(0.0, 64.0, 150.0, 96.0)
        );
    }

    #[test]
    fn horizontal_helper_swaps_axes() {
        let h = Orientation::Horizontal.helper();
        assert_eq!(h.orientation(), Orientation::Horizontal);
        let mut g = geometry(1000);
        g.viewport = Size::new(320.0, 50.0);
        assert_eq!(h.range(&g), IndexRange::new(0, 11));
        assert_eq!(h.scroll_by(&g, 64.0), Point::new(64.0, 0.0));
        assert_eq!(h.layout_rect(&g, 1, 0.0), Rect::new(32.0, 0.0, 64.0, 50.0));
        assert_eq!(h.virtual_size(&g), Size::new(32000.0, 50.0));
    }
}
