#![forbid(unsafe_code)]

//! Property tests for the geometry clamps.
//!
//! Validates:
//! - Both clamps are idempotent.
//! - Clamped rectangles respect the minimum size and the page bounds.
//! - The anchored clamp never moves a valid anchor corner.
//! - Percentage conversion round-trips on whole-percent grids.
//! - Overlap without margin is symmetric; edge-adjacent rectangles never overlap.

use panelforge_core::geometry::{
    Corner, MIN_PANEL_SIZE, Rect, Size, clamp, clamp_anchored, from_percent, overlaps, to_percent,
};
use proptest::prelude::*;

fn page_strategy() -> impl Strategy<Value = Size> {
    (0i32..2000, 0i32..2000).prop_map(|(w, h)| Size::new(w, h))
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-5000i32..5000, -5000i32..5000, -500i32..5000, -500i32..5000)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn corner_strategy() -> impl Strategy<Value = Corner> {
    prop_oneof![
        Just(Corner::TopLeft),
        Just(Corner::TopRight),
        Just(Corner::BottomLeft),
        Just(Corner::BottomRight),
    ]
}

fn assert_valid(rect: Rect, page: Size) -> Result<(), TestCaseError> {
    let min_w = MIN_PANEL_SIZE.min(page.width);
    let min_h = MIN_PANEL_SIZE.min(page.height);
    prop_assert!(rect.width >= min_w, "width {} < {}", rect.width, min_w);
    prop_assert!(rect.height >= min_h, "height {} < {}", rect.height, min_h);
    prop_assert!(rect.is_within(page), "{rect:?} outside {page:?}");
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn clamp_is_idempotent(rect in rect_strategy(), page in page_strategy()) {
        let once = clamp(rect, page, MIN_PANEL_SIZE);
        prop_assert_eq!(clamp(once, page, MIN_PANEL_SIZE), once);
    }

    #[test]
    fn clamp_yields_valid_rect(rect in rect_strategy(), page in page_strategy()) {
        assert_valid(clamp(rect, page, MIN_PANEL_SIZE), page)?;
    }

    #[test]
    fn clamp_anchored_is_idempotent(
        rect in rect_strategy(),
        page in page_strategy(),
        anchor in corner_strategy(),
    ) {
        let once = clamp_anchored(rect, anchor, page, MIN_PANEL_SIZE);
        prop_assert_eq!(clamp_anchored(once, anchor, page, MIN_PANEL_SIZE), once);
        assert_valid(once, page)?;
    }

    #[test]
    fn clamp_anchored_keeps_valid_anchor(
        rect in rect_strategy(),
        anchor in corner_strategy(),
    ) {
        let page = Size::new(800, 1000);
        let valid = clamp(rect, page, MIN_PANEL_SIZE);
        let pinned = valid.corner(anchor);
        // Any resize of a valid rectangle that keeps the anchor edge values
        // must leave the anchor where it was.
        let resized = match anchor {
            Corner::TopLeft => Rect::new(valid.x, valid.y, rect.width, rect.height),
            Corner::TopRight => Rect::new(pinned.x - rect.width, valid.y, rect.width, rect.height),
            Corner::BottomLeft => Rect::new(valid.x, pinned.y - rect.height, rect.width, rect.height),
            Corner::BottomRight => Rect::new(
                pinned.x - rect.width,
                pinned.y - rect.height,
                rect.width,
                rect.height,
            ),
        };
        let clamped = clamp_anchored(resized, anchor, page, MIN_PANEL_SIZE);
        prop_assert_eq!(clamped.corner(anchor), pinned);
    }

    #[test]
    fn percent_round_trip_on_whole_percents(
        left in 0i32..=100,
        top in 0i32..=100,
        width in 0i32..=100,
        height in 0i32..=100,
    ) {
        let page = Size::new(800, 1000);
        let rect = Rect::new(left * 8, top * 10, width * 8, height * 10);
        prop_assert_eq!(from_percent(to_percent(rect, page), page), rect);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn overlap_without_margin_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(overlaps(a, b, 0), overlaps(b, a, 0));
    }

    #[test]
    fn adjacent_rects_do_not_overlap(
        x in -1000i32..1000,
        y in -1000i32..1000,
        w in 1i32..500,
        h in 1i32..500,
    ) {
        let a = Rect::new(x, y, w, h);
        prop_assert!(overlaps(a, a, 0));
        prop_assert!(!overlaps(a, a.translated(w, 0), 0));
        prop_assert!(!overlaps(a, a.translated(0, h), 0));
        prop_assert!(overlaps(a, a.translated(w, 0), 1));
    }
}
