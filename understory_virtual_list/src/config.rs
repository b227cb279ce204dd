// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration for a [`VirtualList`](crate::VirtualList).

/// Number of extra cells realized on each side of the visible area.
///
/// An enumeration rather than a free integer keeps the window size bounded: the
/// largest buffer adds three cells per side.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum BufferSize {
    /// No buffer cells.
    None,
    /// One buffer cell per side.
    Small,
    /// Two buffer cells per side.
    #[default]
    Medium,
    /// Three buffer cells per side.
    Large,
}

impl BufferSize {
    /// Returns the number of buffer cells per side.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::None => 0,
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
        }
    }
}

/// The main (scrolling) axis of a list.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Orientation {
    /// Items are stacked top to bottom; the list scrolls vertically.
    #[default]
    Vertical,
    /// Items are stacked left to right; the list scrolls horizontally.
    Horizontal,
}

/// Fixed per-list configuration.
///
/// Built with [`ListConfig::default`] and the chainable `with_*` setters:
///
/// ```rust
/// use understory_virtual_list::{BufferSize, ListConfig, Orientation};
///
/// let config = ListConfig::default()
///     .with_cell_size(24.0)
///     .with_spacing(4.0)
///     .with_buffer_size(BufferSize::Small)
///     .with_orientation(Orientation::Horizontal);
/// assert_eq!(config.cell_step(), 28.0);
/// ```
///
/// Values are normalized on entry: a negative or non-finite spacing becomes
/// `0.0`, and a non-finite cell size becomes `0.0` (which keeps the list
/// empty until a usable size is set).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ListConfig {
    /// Main-axis extent of each cell. Must be `> 0` for the list to realize cells.
    pub cell_size: f64,
    /// Gap between consecutive cells along the main axis.
    pub spacing: f64,
    /// Extra cells on each side of the visible area.
    pub buffer_size: BufferSize,
    /// The scrolling axis.
    pub orientation: Orientation,
    /// When `true`, every cell spans the full cross extent of the viewport.
    pub fit_to_viewport: bool,
    /// Maximum number of detached cells kept for reuse.
    pub cache_capacity: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            spacing: 0.0,
            buffer_size: BufferSize::default(),
            orientation: Orientation::default(),
            fit_to_viewport: true,
            cache_capacity: 10,
        }
    }
}

impl ListConfig {
    /// Sets the main-axis cell size.
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = normalize_cell_size(cell_size);
        self
    }

    /// Sets the spacing between cells.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = normalize_spacing(spacing);
        self
    }

    /// Sets the buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: BufferSize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Sets the orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets whether cells stretch across the viewport's cross axis.
    #[must_use]
    pub fn with_fit_to_viewport(mut self, fit: bool) -> Self {
        self.fit_to_viewport = fit;
        self
    }

    /// Sets the cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Distance from the start of one cell to the start of the next.
    #[must_use]
    pub fn cell_step(&self) -> f64 {
        self.cell_size + self.spacing
    }

    /// Returns a copy with all fields normalized.
    #[must_use]
    pub(crate) fn normalized(self) -> Self {
        Self {
            cell_size: normalize_cell_size(self.cell_size),
            spacing: normalize_spacing(self.spacing),
            ..self
        }
    }
}

pub(crate) fn normalize_cell_size(size: f64) -> f64 {
    if size.is_finite() { size } else { 0.0 }
}

pub(crate) fn normalize_spacing(spacing: f64) -> f64 {
    if spacing.is_finite() && spacing > 0.0 {
        spacing
    } else {
        0.0
    }
}
