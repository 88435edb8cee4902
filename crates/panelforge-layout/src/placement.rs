#![forbid(unsafe_code)]

//! Grid snapping and free-space placement for new panels.
//!
//! [`find_free_space`] is a best-effort heuristic, not a bin-packing solver:
//! it walks a fixed row-major lattice of candidate slots and takes the first
//! one that keeps a gutter to every existing panel.
//!
//! # Full-page policy
//!
//! When no lattice slot is free the new panel is stacked at the lattice
//! origin regardless of overlap and the result is reported as
//! [`Placement::Stacked`]. The page is never grown to make room.
//!
//! # Determinism
//!
//! The scan has no randomness and depends only on the page's panel
//! rectangles and the arguments, so identical inputs always produce identical
//! coordinates.

use std::fmt;

use panelforge_core::geometry::{Point, Rect, Size, overlaps};

use crate::page::Page;

/// Default top-left origin of the placement lattice.
pub const DEFAULT_PLACEMENT_ORIGIN: Point = Point::new(50, 50);

/// Grid snapping rules applied during interactive edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapRules {
    pub enabled: bool,
    pub grid_size: i32,
}

impl Default for SnapRules {
    fn default() -> Self {
        Self {
            enabled: false,
            grid_size: 10,
        }
    }
}

impl SnapRules {
    /// Snapping on, with the given grid.
    #[must_use]
    pub const fn grid(grid_size: i32) -> Self {
        Self {
            enabled: true,
            grid_size,
        }
    }

    #[must_use]
    pub fn snap(&self, value: i32) -> i32 {
        snap(value, self.grid_size, self.enabled)
    }

    /// Snap a position; sizes are left alone.
    #[must_use]
    pub fn snap_point(&self, point: Point) -> Point {
        Point::new(self.snap(point.x), self.snap(point.y))
    }

    /// Snap x, y, width and height independently.
    #[must_use]
    pub fn snap_rect(&self, rect: Rect) -> Rect {
        Rect::new(
            self.snap(rect.x),
            self.snap(rect.y),
            self.snap(rect.width),
            self.snap(rect.height),
        )
    }

    /// Distance one keyboard nudge moves: a grid step when snapping, else `unsnapped`.
    #[must_use]
    pub fn nudge_step(&self, unsnapped: i32) -> i32 {
        if self.enabled && self.grid_size > 0 {
            self.grid_size
        } else {
            unsnapped
        }
    }
}

/// Round `value` to the nearest multiple of `grid_size` (halves round up).
///
/// Identity when snapping is disabled or the grid is not positive. Results
/// that would leave the `i32` range saturate at its ends.
#[must_use]
pub fn snap(value: i32, grid_size: i32, enabled: bool) -> i32 {
    if !enabled || grid_size <= 0 {
        return value;
    }
    let (value, grid) = (i64::from(value), i64::from(grid_size));
    let remainder = value.rem_euclid(grid);
    let base = value - remainder;
    let snapped = if remainder * 2 >= grid { base + grid } else { base };
    i32::try_from(snapped.clamp(i64::from(i32::MIN), i64::from(i32::MAX))).unwrap_or(i32::MAX)
}

/// Outcome of a free-space search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A slot with no overlap.
    Free(Point),
    /// No slot was free; stacked at the lattice origin.
    Stacked(Point),
}

impl Placement {
    #[must_use]
    pub const fn point(self) -> Point {
        match self {
            Self::Free(point) | Self::Stacked(point) => point,
        }
    }

    #[must_use]
    pub const fn is_stacked(self) -> bool {
        matches!(self, Self::Stacked(_))
    }
}

/// Chooses where a newly created panel goes.
pub trait PlacementStrategy: fmt::Debug {
    fn find_free_space(&self, page: &Page, size: Size, margin: i32) -> Placement;
}

/// Row-major lattice scan starting at a fixed origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMajorPlacement {
    pub origin: Point,
}

impl Default for RowMajorPlacement {
    fn default() -> Self {
        Self {
            origin: DEFAULT_PLACEMENT_ORIGIN,
        }
    }
}

impl PlacementStrategy for RowMajorPlacement {
    fn find_free_space(&self, page: &Page, size: Size, margin: i32) -> Placement {
        find_free_space(page, size, margin, self.origin)
    }
}

/// Scan candidate slots row by row, stepping by `size + margin`, and return
/// the first one that overlaps no existing panel (with `margin` as gutter).
#[must_use]
pub fn find_free_space(page: &Page, size: Size, margin: i32, origin: Point) -> Placement {
    let margin = margin.max(0);
    let width = size.width.max(1);
    let height = size.height.max(1);
    let step_x = width.saturating_add(margin);
    let step_y = height.saturating_add(margin);
    let extent = page.size();

    let mut y = origin.y;
    while y.saturating_add(height) <= extent.height {
        let mut x = origin.x;
        while x.saturating_add(width) <= extent.width {
            let candidate = Rect::new(x, y, width, height);
            let blocked = page
                .panels()
                .iter()
                .any(|panel| overlaps(panel.rect, candidate, margin));
            if !blocked {
                return Placement::Free(Point::new(x, y));
            }
            x = x.saturating_add(step_x);
        }
        y = y.saturating_add(step_y);
    }

    tracing::warn!(
        page = %page.id(),
        panels = page.panels().len(),
        width,
        height,
        "no free slot left on page; stacking new panel at placement origin"
    );
    Placement::Stacked(origin)
}
