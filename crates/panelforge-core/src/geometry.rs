#![forbid(unsafe_code)]

//! Geometric primitives in absolute page units.
//!
//! Everything the engine stores is expressed in integer page units (a page is
//! typically 800×1000). Percentages only exist at the rendering boundary via
//! [`to_percent`] / [`from_percent`], so repeated edits never accumulate
//! round-trip drift.
//!
//! The free functions here are pure and total: out-of-range or degenerate
//! input is clamped, never rejected.

use serde::{Deserialize, Serialize};

/// Smallest width/height a panel may have.
pub const MIN_PANEL_SIZE: i32 = 50;

/// Default spacing kept between panels by free-space placement.
pub const DEFAULT_GUTTER: i32 = 20;

/// A position in page units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert host pixel coordinates (possibly fractional) into page units.
    ///
    /// Non-finite values map to 0; out-of-range values saturate.
    #[must_use]
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(round_to_unit(x), round_to_unit(y))
    }

    /// Offset `(dx, dy)` from `origin` to `self`.
    #[inline]
    pub const fn delta_from(self, origin: Point) -> (i32, i32) {
        (
            self.x.saturating_sub(origin.x),
            self.y.saturating_sub(origin.y),
        )
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

/// A width/height pair in page units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Rectangle covering `[0, width] × [0, height]`.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// One of the four corners of a rectangle.
///
/// Resize handles are identified by the corner they sit on; the corner that
/// stays fixed during a resize is [`Corner::opposite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners in hit-test priority order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The diagonally opposite corner.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    /// Whether this corner lies on the left edge.
    #[must_use]
    pub const fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether this corner lies on the top edge.
    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// An axis-aligned rectangle in page units.
///
/// Origin is the top-left corner; `right()`/`bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its origin and size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Area in square page units.
    #[inline]
    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle (right/bottom exclusive).
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Midpoint, rounded toward the origin.
    #[must_use]
    pub const fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Position of the given corner.
    #[must_use]
    pub const fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.x, self.y),
            Corner::TopRight => Point::new(self.right(), self.y),
            Corner::BottomLeft => Point::new(self.x, self.bottom()),
            Corner::BottomRight => Point::new(self.right(), self.bottom()),
        }
    }

    /// Same size, moved by `(dx, dy)`.
    #[must_use]
    pub const fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Same origin, new size.
    #[must_use]
    pub const fn with_size(&self, size: Size) -> Rect {
        Rect::new(self.x, self.y, size.width, size.height)
    }

    /// Grow by `margin` on every side.
    #[must_use]
    pub const fn inflate(&self, margin: i32) -> Rect {
        Rect::new(
            self.x.saturating_sub(margin),
            self.y.saturating_sub(margin),
            self.width.saturating_add(margin.saturating_mul(2)),
            self.height.saturating_add(margin.saturating_mul(2)),
        )
    }

    /// Whether `self` lies within `[0, bounds.width] × [0, bounds.height]`.
    #[must_use]
    pub const fn is_within(&self, bounds: Size) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= bounds.width && self.bottom() <= bounds.height
    }

    /// Map from a `from`-sized reference space into a `to`-sized one, rounding
    /// to the nearest unit. An empty reference leaves the rectangle unchanged.
    #[must_use]
    pub fn scaled(&self, from: Size, to: Size) -> Rect {
        if from.is_empty() {
            return *self;
        }
        let sx = f64::from(to.width) / f64::from(from.width);
        let sy = f64::from(to.height) / f64::from(from.height);
        Rect::new(
            round_to_unit(f64::from(self.x) * sx),
            round_to_unit(f64::from(self.y) * sy),
            round_to_unit(f64::from(self.width) * sx),
            round_to_unit(f64::from(self.height) * sy),
        )
    }
}

/// Rectangle expressed as percentages of a container, for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

fn round_to_unit(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    // `as` saturates at the i32 range.
    value.round() as i32
}

fn percent_of(value: i32, total: i32) -> f64 {
    if total <= 0 {
        0.0
    } else {
        f64::from(value) * 100.0 / f64::from(total)
    }
}

fn from_percent_of(percent: f64, total: i32) -> i32 {
    round_to_unit(percent * f64::from(total) / 100.0)
}

/// Clamp `rect` into the page while preserving its size where possible.
///
/// Width/height are forced into `[min_size, page extent]`; then the origin is
/// moved so the rectangle lies within `[0, page.width] × [0, page.height]`.
/// A page smaller than `min_size` yields the largest valid rectangle (the page
/// extent itself). Idempotent.
#[must_use]
pub fn clamp(rect: Rect, page: Size, min_size: i32) -> Rect {
    let page_w = page.width.max(0);
    let page_h = page.height.max(0);
    let min_w = min_size.max(0).min(page_w);
    let min_h = min_size.max(0).min(page_h);

    let width = rect.width.clamp(min_w, page_w);
    let height = rect.height.clamp(min_h, page_h);
    Rect::new(
        rect.x.clamp(0, page_w - width),
        rect.y.clamp(0, page_h - height),
        width,
        height,
    )
}

/// Clamp a resized rectangle while keeping its `anchor` corner fixed.
///
/// The anchor corner is itself pulled inside the page first (it only moves when
/// the input was already invalid); the opposite, moving corner is then limited
/// to the page and to at least `min_size` away from the anchor. Idempotent.
#[must_use]
pub fn clamp_anchored(rect: Rect, anchor: Corner, page: Size, min_size: i32) -> Rect {
    let (x, width) = clamp_span(
        rect.x,
        rect.width,
        anchor.is_left(),
        page.width.max(0),
        min_size,
    );
    let (y, height) = clamp_span(
        rect.y,
        rect.height,
        anchor.is_top(),
        page.height.max(0),
        min_size,
    );
    Rect::new(x, y, width, height)
}

/// One axis of [`clamp_anchored`]: `start`/`len` along an axis of `extent`.
fn clamp_span(start: i32, len: i32, anchor_at_start: bool, extent: i32, min_size: i32) -> (i32, i32) {
    let min_len = min_size.max(0).min(extent);
    if anchor_at_start {
        let start = start.clamp(0, extent - min_len);
        let len = len.clamp(min_len, extent - start);
        (start, len)
    } else {
        let end = start.saturating_add(len).clamp(min_len, extent);
        let len = len.clamp(min_len, end);
        (end - len, len)
    }
}

/// Convert to percentages of `container` (0% for an empty container).
#[must_use]
pub fn to_percent(rect: Rect, container: Size) -> PercentRect {
    PercentRect {
        left: percent_of(rect.x, container.width),
        top: percent_of(rect.y, container.height),
        width: percent_of(rect.width, container.width),
        height: percent_of(rect.height, container.height),
    }
}

/// Inverse of [`to_percent`], rounding to the nearest page unit.
#[must_use]
pub fn from_percent(percent: PercentRect, container: Size) -> Rect {
    Rect::new(
        from_percent_of(percent.left, container.width),
        from_percent_of(percent.top, container.height),
        from_percent_of(percent.width, container.width),
        from_percent_of(percent.height, container.height),
    )
}

/// Intersection test with `a` inflated by `margin` on all sides.
///
/// Rectangles that merely touch (after inflation) do not overlap.
#[must_use]
pub fn overlaps(a: Rect, b: Rect, margin: i32) -> bool {
    let a = a.inflate(margin.max(0));
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}
