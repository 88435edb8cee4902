#![forbid(unsafe_code)]

//! Pointer hit testing against a page.
//!
//! Resize handles are only offered on the selected panel and take priority
//! over panel bodies. Bodies are tested topmost first (reverse list order).

use panelforge_core::geometry::{Corner, Point, Rect};

use crate::page::{Page, PanelId};

/// Default edge length of a square resize handle, in page units.
pub const DEFAULT_HANDLE_SIZE: i32 = 12;

/// What a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Empty canvas.
    Canvas,
    /// Inside a panel.
    Body { panel: PanelId },
    /// A corner resize handle of the selected panel.
    Handle { panel: PanelId, corner: Corner },
}

/// Square handle of side `handle_size` centred on the given corner of `rect`.
#[must_use]
pub fn handle_rect(rect: Rect, corner: Corner, handle_size: i32) -> Rect {
    let size = handle_size.max(1);
    let center = rect.corner(corner);
    Rect::new(center.x - size / 2, center.y - size / 2, size, size)
}

#[must_use]
pub fn hit_test(page: &Page, selected: Option<PanelId>, point: Point, handle_size: i32) -> HitTarget {
    if let Some(panel) = selected.and_then(|id| page.panel(id)) {
        for corner in Corner::ALL {
            if handle_rect(panel.rect, corner, handle_size).contains(point) {
                return HitTarget::Handle {
                    panel: panel.id,
                    corner,
                };
            }
        }
    }

    page.panels()
        .iter()
        .rev()
        .find(|panel| panel.rect.contains(point))
        .map_or(HitTarget::Canvas, |panel| HitTarget::Body { panel: panel.id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageId, Panel};
    use panelforge_core::geometry::{MIN_PANEL_SIZE, Size};

    fn id(raw: u64) -> PanelId {
        PanelId::new(raw).unwrap()
    }

    fn page() -> Page {
        let mut page = Page::new(PageId::MIN, 1, Size::new(800, 1000));
        page.push_panel(Panel::new(id(1), PageId::MIN, Rect::new(100, 100, 200, 200)), MIN_PANEL_SIZE);
        page.push_panel(Panel::new(id(2), PageId::MIN, Rect::new(200, 200, 200, 200)), MIN_PANEL_SIZE);
        page
    }

    #[test]
    fn empty_canvas() {
        assert_eq!(hit_test(&page(), None, Point::new(10, 10), 12), HitTarget::Canvas);
    }

    #[test]
    fn topmost_body_wins() {
        let page = page();
        assert_eq!(
            hit_test(&page, None, Point::new(250, 250), 12),
            HitTarget::Body { panel: id(2) }
        );
        assert_eq!(
            hit_test(&page, None, Point::new(150, 150), 12),
            HitTarget::Body { panel: id(1) }
        );
    }

    #[test]
    fn handles_only_on_selection() {
        let page = page();
        let corner = Point::new(300, 300);
        // Without selection the bottom-right corner of panel 1 is inside panel 2.
        assert_eq!(
            hit_test(&page, None, corner, 12),
            HitTarget::Body { panel: id(2) }
        );
        assert_eq!(
            hit_test(&page, Some(id(1)), corner, 12),
            HitTarget::Handle {
                panel: id(1),
                corner: Corner::BottomRight
            }
        );
        // Handles extend slightly outside the panel.
        assert_eq!(
            hit_test(&page, Some(id(1)), Point::new(96, 96), 12),
            HitTarget::Handle {
                panel: id(1),
                corner: Corner::TopLeft
            }
        );
    }

    #[test]
    fn stale_selection_is_ignored() {
        assert_eq!(
            hit_test(&page(), Some(id(99)), Point::new(10, 10), 12),
            HitTarget::Canvas
        );
    }
}
