#![forbid(unsafe_code)]

//! Page and panel data model.
//!
//! A [`Page`] owns an ordered list of [`Panel`]s; list order is both z-order
//! (later panels draw on top) and reading order. Every mutation that goes
//! through a `Page` method re-clamps geometry, so a page never holds a panel
//! that is smaller than the minimum size or sticks out of the page.
//!
//! Content references ([`ContentRef`]) belong to external story/asset
//! services. The model stores and round-trips them without interpreting
//! them; cloning one only bumps a reference count.

use std::fmt;
use std::sync::Arc;

use panelforge_core::geometry::{Rect, Size, clamp};
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::error::LayoutError;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        ///
        /// `0` is reserved/invalid so IDs are always non-zero.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Lowest valid ID.
            pub const MIN: Self = Self(1);

            /// Create an ID from its raw value; `0` is rejected.
            #[must_use]
            pub const fn new(raw: u64) -> Option<Self> {
                if raw == 0 { None } else { Some(Self(raw)) }
            }

            /// Get the raw numeric value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Stable identifier for a page within a project.
    PageId,
    "page"
);

define_id!(
    /// Stable identifier for a panel; unique for the project's lifetime.
    PanelId,
    "panel"
);

/// Wall-clock stamp in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Current wall-clock time. A clock before the epoch reads as 0.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(millis)
    }
}

/// What an external content reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    SceneImage,
    SceneDescription,
    Dialogue,
    Background,
    Other,
}

/// Opaque reference into an external story/asset service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub kind: ContentKind,
    pub key: Arc<str>,
}

impl ContentRef {
    #[must_use]
    pub fn new(kind: ContentKind, key: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

/// Outline of a panel frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelShape {
    #[default]
    Rectangle,
    Circle,
    FreeForm,
}

/// Stroke pattern of a panel border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokePattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: u16,
    pub color: String,
    pub pattern: StrokePattern,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            width: 2,
            color: "#000000".to_owned(),
            pattern: StrokePattern::Solid,
        }
    }
}

/// Visual attributes of a panel, edited as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelStyle {
    #[serde(default)]
    pub shape: PanelShape,
    #[serde(default)]
    pub border: BorderStyle,
    #[serde(default = "default_fill")]
    pub fill: String,
}

fn default_fill() -> String {
    "#ffffff".to_owned()
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            shape: PanelShape::default(),
            border: BorderStyle::default(),
            fill: default_fill(),
        }
    }
}

/// One frame on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub id: PanelId,
    /// Owning page (non-owning back-reference).
    pub page: PageId,
    pub rect: Rect,
    pub style: PanelStyle,
    pub content: Vec<ContentRef>,
}

impl Panel {
    /// A panel with default style and no content.
    #[must_use]
    pub fn new(id: PanelId, page: PageId, rect: Rect) -> Self {
        Self {
            id,
            page,
            rect,
            style: PanelStyle::default(),
            content: Vec::new(),
        }
    }

    /// Value copy under a fresh identifier, moved by `(dx, dy)`.
    ///
    /// Content references are shared, not deep-cloned.
    #[must_use]
    pub fn duplicate(&self, id: PanelId, dx: i32, dy: i32) -> Self {
        Self {
            id,
            rect: self.rect.translated(dx, dy),
            ..self.clone()
        }
    }
}

/// An ordered collection of panels with fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    id: PageId,
    number: u32,
    size: Size,
    background: Option<ContentRef>,
    panels: Vec<Panel>,
    modified_at: Timestamp,
}

impl Page {
    /// An empty page. Non-positive dimensions are raised to 1 unit.
    #[must_use]
    pub fn new(id: PageId, number: u32, size: Size) -> Self {
        Self {
            id,
            number,
            size: Size::new(size.width.max(1), size.height.max(1)),
            background: None,
            panels: Vec::new(),
            modified_at: Timestamp::now(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> PageId {
        self.id
    }

    /// 1-based ordinal within the project.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn background(&self) -> Option<&ContentRef> {
        self.background.as_ref()
    }

    /// Panels in z-order (bottom first).
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    #[must_use]
    pub const fn modified_at(&self) -> Timestamp {
        self.modified_at
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.id == id)
    }

    /// Position in the panel list, which is also the z-order index.
    #[must_use]
    pub fn z_index(&self, id: PanelId) -> Option<usize> {
        self.panels.iter().position(|panel| panel.id == id)
    }

    #[must_use]
    pub fn contains_panel(&self, id: PanelId) -> bool {
        self.z_index(id).is_some()
    }

    /// Clamp `rect` against this page.
    #[must_use]
    pub fn clamp_rect(&self, rect: Rect, min_size: i32) -> Rect {
        clamp(rect, self.size, min_size)
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub(crate) fn set_modified_at(&mut self, stamp: Timestamp) {
        self.modified_at = stamp;
    }

    pub(crate) fn touch(&mut self) {
        // Keep stamps monotonic even if the wall clock steps backwards.
        self.modified_at = self.modified_at.max(Timestamp::now());
    }

    pub(crate) fn set_background(&mut self, background: Option<ContentRef>) {
        self.background = background;
        self.touch();
    }

    fn adopt(&self, mut panel: Panel, min_size: i32) -> Panel {
        panel.page = self.id;
        panel.rect = self.clamp_rect(panel.rect, min_size);
        panel
    }

    /// Insert at `index` (clamped to the list length), re-clamping geometry.
    pub(crate) fn insert_panel(&mut self, index: usize, panel: Panel, min_size: i32) {
        let panel = self.adopt(panel, min_size);
        let index = index.min(self.panels.len());
        self.panels.insert(index, panel);
        self.touch();
    }

    pub(crate) fn push_panel(&mut self, panel: Panel, min_size: i32) {
        self.insert_panel(self.panels.len(), panel, min_size);
    }

    pub(crate) fn remove_panel(&mut self, id: PanelId) -> Result<Panel, LayoutError> {
        let index = self
            .z_index(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        let removed = self.panels.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Replace the whole panel list (undo restore, template apply).
    pub(crate) fn replace_panels(&mut self, panels: Vec<Panel>, min_size: i32) -> Vec<Panel> {
        let adopted = panels
            .into_iter()
            .map(|panel| self.adopt(panel, min_size))
            .collect();
        let previous = std::mem::replace(&mut self.panels, adopted);
        self.touch();
        previous
    }

    /// Write clamped geometry; returns what was stored.
    pub(crate) fn set_panel_rect(
        &mut self,
        id: PanelId,
        rect: Rect,
        min_size: i32,
    ) -> Result<Rect, LayoutError> {
        let clamped = self.clamp_rect(rect, min_size);
        let panel = self.panel_mut(id)?;
        panel.rect = clamped;
        self.touch();
        Ok(clamped)
    }

    pub(crate) fn set_panel_style(&mut self, id: PanelId, style: PanelStyle) -> Result<(), LayoutError> {
        self.panel_mut(id)?.style = style;
        self.touch();
        Ok(())
    }

    pub(crate) fn set_panel_content(
        &mut self,
        id: PanelId,
        content: Vec<ContentRef>,
    ) -> Result<(), LayoutError> {
        self.panel_mut(id)?.content = content;
        self.touch();
        Ok(())
    }

    /// Move a panel to `to` in the z-order; returns whether anything changed.
    pub(crate) fn move_panel(&mut self, id: PanelId, to: usize) -> Result<bool, LayoutError> {
        let from = self
            .z_index(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        let to = to.min(self.panels.len().saturating_sub(1));
        if from == to {
            return Ok(false);
        }
        let panel = self.panels.remove(from);
        self.panels.insert(to, panel);
        self.touch();
        Ok(true)
    }

    fn panel_mut(&mut self, id: PanelId) -> Result<&mut Panel, LayoutError> {
        self.panels
            .iter_mut()
            .find(|panel| panel.id == id)
            .ok_or(LayoutError::PanelNotFound { panel: id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelforge_core::geometry::MIN_PANEL_SIZE;

    fn panel_id(raw: u64) -> PanelId {
        PanelId::new(raw).unwrap()
    }

    fn page() -> Page {
        Page::new(PageId::MIN, 1, Size::new(800, 1000))
    }

    #[test]
    fn zero_ids_are_rejected() {
        assert!(PanelId::new(0).is_none());
        assert!(PageId::new(0).is_none());
        assert_eq!(PanelId::new(7).map(PanelId::get), Some(7));
        assert_eq!(PageId::new(3).unwrap().to_string(), "page-3");
    }

    #[test]
    fn inserted_panels_are_clamped_and_adopted() {
        let mut page = page();
        let foreign = PageId::new(9).unwrap();
        page.push_panel(
            Panel::new(panel_id(1), foreign, Rect::new(790, 990, 10, 10)),
            MIN_PANEL_SIZE,
        );
        let stored = &page.panels()[0];
        assert_eq!(stored.page, page.id());
        assert_eq!(stored.rect, Rect::new(750, 950, 50, 50));
    }

    #[test]
    fn z_order_moves() {
        let mut page = page();
        for raw in 1..=3 {
            page.push_panel(
                Panel::new(panel_id(raw), PageId::MIN, Rect::new(0, 0, 100, 100)),
                MIN_PANEL_SIZE,
            );
        }
        assert!(page.move_panel(panel_id(1), 99).unwrap());
        let order: Vec<u64> = page.panels().iter().map(|p| p.id.get()).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert!(!page.move_panel(panel_id(1), 2).unwrap());
        assert_eq!(page.z_index(panel_id(3)), Some(1));
        assert_eq!(
            page.move_panel(panel_id(42), 0),
            Err(LayoutError::PanelNotFound {
                panel: panel_id(42)
            })
        );
    }

    #[test]
    fn duplicate_shares_content() {
        let mut original = Panel::new(panel_id(1), PageId::MIN, Rect::new(10, 10, 100, 100));
        original
            .content
            .push(ContentRef::new(ContentKind::SceneImage, "asset://scene/1"));
        let copy = original.duplicate(panel_id(2), 20, 20);
        assert_eq!(copy.id, panel_id(2));
        assert_eq!(copy.rect, Rect::new(30, 30, 100, 100));
        assert!(Arc::ptr_eq(&copy.content[0].key, &original.content[0].key));
    }

    #[test]
    fn degenerate_page_size_is_raised() {
        let page = Page::new(PageId::MIN, 1, Size::new(0, -5));
        assert_eq!(page.size(), Size::new(1, 1));
    }

    #[test]
    fn touch_is_monotonic() {
        let mut page = page();
        page.set_modified_at(Timestamp::from_millis(u64::MAX));
        page.touch();
        assert_eq!(page.modified_at(), Timestamp::from_millis(u64::MAX));
    }
}
