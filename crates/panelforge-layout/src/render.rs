#![forbid(unsafe_code)]

//! Rendering boundary.
//!
//! The engine stores absolute page units; surfaces receive percentages of
//! the page so the same layout scales to any viewport. [`render_page`] is a
//! pure function of the page, the selection and an optional live rectangle
//! for the panel under an active gesture.

use panelforge_core::geometry::{Corner, PercentRect, Rect, Size, to_percent};

use crate::hit::handle_rect;
use crate::page::{ContentRef, Page, PageId, PanelId, PanelStyle};

/// Geometry of the panel being dragged or resized, not yet committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveRect {
    pub panel: PanelId,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageView<'a> {
    pub id: PageId,
    pub number: u32,
    pub size: Size,
    pub background: Option<&'a ContentRef>,
}

/// One panel as handed to a surface, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView<'a> {
    pub id: PanelId,
    pub z_index: usize,
    pub rect: Rect,
    pub percent: PercentRect,
    pub style: &'a PanelStyle,
    pub content: &'a [ContentRef],
    pub selected: bool,
}

/// Receives draw calls for one page.
pub trait RenderSurface {
    fn begin_page(&mut self, page: &PageView<'_>);

    fn draw_panel(&mut self, panel: &PanelView<'_>);

    /// Corner handles of the selected panel, drawn after every panel.
    fn show_handles(&mut self, panel: PanelId, handles: &[(Corner, PercentRect); 4]);
}

/// Emit `page` to `surface`, substituting `live` geometry when given.
pub fn render_page<S: RenderSurface + ?Sized>(
    page: &Page,
    selected: Option<PanelId>,
    live: Option<LiveRect>,
    handle_size: i32,
    surface: &mut S,
) {
    let size = page.size();
    surface.begin_page(&PageView {
        id: page.id(),
        number: page.number(),
        size,
        background: page.background(),
    });

    let mut selected_rect = None;
    for (z_index, panel) in page.panels().iter().enumerate() {
        let rect = match live {
            Some(live) if live.panel == panel.id => live.rect,
            _ => panel.rect,
        };
        let is_selected = selected == Some(panel.id);
        if is_selected {
            selected_rect = Some((panel.id, rect));
        }
        surface.draw_panel(&PanelView {
            id: panel.id,
            z_index,
            rect,
            percent: to_percent(rect, size),
            style: &panel.style,
            content: &panel.content,
            selected: is_selected,
        });
    }

    if let Some((panel, rect)) = selected_rect {
        let handles = Corner::ALL.map(|corner| {
            (corner, to_percent(handle_rect(rect, corner, handle_size), size))
        });
        surface.show_handles(panel, &handles);
    }
}

/// Owned record of one draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    BeginPage { page: PageId, number: u32, size: Size },
    Panel { panel: PanelId, z_index: usize, rect: Rect, percent: PercentRect, selected: bool },
    Handles { panel: PanelId, corners: [(Corner, PercentRect); 4] },
}

/// A surface that records draw calls, for headless hosts and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<RenderCommand>,
}

impl DisplayList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for DisplayList {
    fn begin_page(&mut self, page: &PageView<'_>) {
        self.commands.clear();
        self.commands.push(RenderCommand::BeginPage {
            page: page.id,
            number: page.number,
            size: page.size,
        });
    }

    fn draw_panel(&mut self, panel: &PanelView<'_>) {
        self.commands.push(RenderCommand::Panel {
            panel: panel.id,
            z_index: panel.z_index,
            rect: panel.rect,
            percent: panel.percent,
            selected: panel.selected,
        });
    }

    fn show_handles(&mut self, panel: PanelId, handles: &[(Corner, PercentRect); 4]) {
        self.commands.push(RenderCommand::Handles {
            panel,
            corners: *handles,
        });
    }
}
