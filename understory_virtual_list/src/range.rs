// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inclusive index ranges.
//!
//! A realized window is always a contiguous, inclusive run of item indices.
//! "No window" is expressed as `Option::<IndexRange>::None` by callers rather
//! than a sentinel value.

use core::fmt;
use core::ops::RangeInclusive;

/// An inclusive, non-empty interval of item indices: `[min, max]`.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct IndexRange {
    min: usize,
    max: usize,
}

impl IndexRange {
    /// Creates a range covering `min..=max`.
    ///
    /// Returns `None` if `min > max`.
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Creates a range holding exactly one index.
    #[must_use]
    pub const fn single(index: usize) -> Self {
        Self {
            min: index,
            max: index,
        }
    }

    /// First index in the range.
    #[must_use]
    pub const fn min(self) -> usize {
        self.min
    }

    /// Last index in the range (inclusive).
    #[must_use]
    pub const fn max(self) -> usize {
        self.max
    }

    /// Number of indices covered.
    #[must_use]
    pub const fn len(self) -> usize {
        self.max - self.min + 1
    }

    /// Always `false`; an `IndexRange` covers at least one index.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Returns `true` if `index` lies inside the range.
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index >= self.min && index <= self.max
    }

    /// Returns the overlap of `self` and `other`, if any.
    #[must_use]
    pub fn intersection(self, other: Self) -> Option<Self> {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Iterates the covered indices in ascending order.
    pub fn iter(self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl IntoIterator for IndexRange {
    type Item = usize;
    type IntoIter = RangeInclusive<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
