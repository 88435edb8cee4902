#![forbid(unsafe_code)]

//! The page/panel repository: aggregate root of a project.
//!
//! [`Repository`] owns every page, mints identifiers, and is the only place
//! page data is mutated. Rendering, export and persistence read from it;
//! the editor session writes to it exclusively through committed operations.
//!
//! # Invariants
//!
//! 1. There is always at least one page.
//! 2. Page numbers are `1..=page_count()` in list order.
//! 3. Panel and page identifiers are minted from monotonic counters and are
//!    never handed out twice, even after deletes, undo or reloads.
//! 4. `panel_index` maps every live panel to the page that holds it.

use panelforge_core::geometry::{
    DEFAULT_GUTTER, MIN_PANEL_SIZE, Point, Rect, Size,
};
use rustc_hash::FxHashMap;

use crate::error::LayoutError;
use crate::hit::DEFAULT_HANDLE_SIZE;
use crate::page::{ContentRef, Page, PageId, Panel, PanelId, PanelStyle};
use crate::placement::{
    DEFAULT_PLACEMENT_ORIGIN, Placement, PlacementStrategy, RowMajorPlacement, SnapRules,
};
use crate::template::Template;

/// Default page dimensions in page units.
pub const DEFAULT_PAGE_SIZE: Size = Size::new(800, 1000);

/// Default size of a panel created by "add panel".
pub const DEFAULT_PANEL_SIZE: Size = Size::new(200, 150);

/// Default offset of a duplicated panel from its source.
pub const DEFAULT_DUPLICATE_OFFSET: Point = Point::new(20, 20);

/// Geometry policy shared by the repository and the interaction machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRules {
    pub page_size: Size,
    pub min_size: i32,
    pub gutter: i32,
    pub snap: SnapRules,
    pub placement_origin: Point,
    pub panel_size: Size,
    pub duplicate_offset: Point,
    pub handle_size: i32,
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            min_size: MIN_PANEL_SIZE,
            gutter: DEFAULT_GUTTER,
            snap: SnapRules::default(),
            placement_origin: DEFAULT_PLACEMENT_ORIGIN,
            panel_size: DEFAULT_PANEL_SIZE,
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            handle_size: DEFAULT_HANDLE_SIZE,
        }
    }
}

/// Z-order edits for a single panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderMove {
    Forward,
    Backward,
    ToFront,
    ToBack,
}

/// Result of [`Repository::add_panel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedPanel {
    pub id: PanelId,
    pub rect: Rect,
    pub placement: Placement,
}

/// Monotonic identifier allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IdCounters {
    pub(crate) next_page: u64,
    pub(crate) next_panel: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            next_page: 1,
            next_panel: 1,
        }
    }
}

impl IdCounters {
    fn mint_page(&mut self) -> PageId {
        let raw = self.next_page.max(1);
        self.next_page = raw.saturating_add(1);
        PageId::new(raw).unwrap_or(PageId::MIN)
    }

    fn mint_panel(&mut self) -> PanelId {
        let raw = self.next_panel.max(1);
        self.next_panel = raw.saturating_add(1);
        PanelId::new(raw).unwrap_or(PanelId::MIN)
    }

    /// Make sure future ids are greater than everything in `pages`.
    pub(crate) fn bump_past(&mut self, pages: &[Page]) {
        for page in pages {
            self.next_page = self.next_page.max(page.id().get().saturating_add(1));
            for panel in page.panels() {
                self.next_panel = self.next_panel.max(panel.id.get().saturating_add(1));
            }
        }
    }
}

#[derive(Debug)]
pub struct Repository {
    pages: Vec<Page>,
    ids: IdCounters,
    panel_index: FxHashMap<PanelId, PageId>,
    rules: LayoutRules,
    placement: Box<dyn PlacementStrategy>,
}

impl Repository {
    /// A project with a single empty page.
    #[must_use]
    pub fn new(rules: LayoutRules) -> Self {
        let mut repository = Self::empty(rules);
        repository.add_page();
        repository
    }

    fn empty(rules: LayoutRules) -> Self {
        Self {
            pages: Vec::new(),
            ids: IdCounters::default(),
            panel_index: FxHashMap::default(),
            placement: Box::new(RowMajorPlacement {
                origin: rules.placement_origin,
            }),
            rules,
        }
    }

    /// Rebuild from loaded pages; used by snapshot restore.
    pub(crate) fn from_parts(
        pages: Vec<Page>,
        mut ids: IdCounters,
        rules: LayoutRules,
    ) -> Result<Self, LayoutError> {
        if pages.is_empty() {
            return Err(LayoutError::EmptyProject);
        }
        ids.bump_past(&pages);
        let mut repository = Self::empty(rules);
        repository.ids = ids;
        for page in pages {
            if repository.page_index(page.id()).is_some() {
                return Err(LayoutError::DuplicatePageId { page: page.id() });
            }
            repository.index_page(&page)?;
            repository.pages.push(page);
        }
        repository.renumber();
        Ok(repository)
    }

    /// Swap the placement strategy used by [`add_panel`](Self::add_panel).
    #[must_use]
    pub fn with_placement(mut self, placement: impl PlacementStrategy + 'static) -> Self {
        self.placement = Box::new(placement);
        self
    }

    #[must_use]
    pub const fn rules(&self) -> &LayoutRules {
        &self.rules
    }

    pub(crate) const fn id_counters(&self) -> IdCounters {
        self.ids
    }

    // ====================================================================
    // Pages
    // ====================================================================

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The first page; a project is never empty.
    #[must_use]
    pub fn first_page(&self) -> &Page {
        &self.pages[0]
    }

    /// Page at a 0-based list index.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    #[must_use]
    pub fn page_by_id(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id() == id)
    }

    #[must_use]
    pub fn page_index(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id() == id)
    }

    /// Like [`page_by_id`](Self::page_by_id), but as a `Result`.
    pub fn require_page(&self, id: PageId) -> Result<&Page, LayoutError> {
        self.page_by_id(id).ok_or(LayoutError::PageNotFound { page: id })
    }

    /// Append a page with the default size.
    pub fn add_page(&mut self) -> PageId {
        self.add_page_with_size(self.rules.page_size)
    }

    pub fn add_page_with_size(&mut self, size: Size) -> PageId {
        let id = self.ids.mint_page();
        let number = u32::try_from(self.pages.len() + 1).unwrap_or(u32::MAX);
        self.pages.push(Page::new(id, number, size));
        tracing::debug!(page = %id, number, "page added");
        id
    }

    /// Remove a page. The last remaining page can never be deleted.
    pub fn delete_page(&mut self, id: PageId) -> Result<Page, LayoutError> {
        let index = self
            .page_index(id)
            .ok_or(LayoutError::PageNotFound { page: id })?;
        if self.pages.len() == 1 {
            return Err(LayoutError::LastPage);
        }
        let page = self.pages.remove(index);
        for panel in page.panels() {
            self.panel_index.remove(&panel.id);
        }
        self.renumber();
        tracing::info!(page = %id, panels = page.panels().len(), "page deleted");
        Ok(page)
    }

    /// Move the page at `from` to list index `to`, renumbering all pages.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), LayoutError> {
        let len = self.pages.len();
        if from >= len {
            return Err(LayoutError::PageIndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(LayoutError::PageIndexOutOfRange { index: to, len });
        }
        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        self.renumber();
        Ok(())
    }

    pub fn set_background(
        &mut self,
        id: PageId,
        background: Option<ContentRef>,
    ) -> Result<(), LayoutError> {
        self.page_mut(id)?.set_background(background);
        Ok(())
    }

    // ====================================================================
    // Panels
    // ====================================================================

    /// Page holding `panel`, via the id index.
    #[must_use]
    pub fn page_of(&self, panel: PanelId) -> Option<PageId> {
        self.panel_index.get(&panel).copied()
    }

    #[must_use]
    pub fn find_panel(&self, id: PanelId) -> Option<(&Page, &Panel)> {
        let page = self.page_by_id(self.page_of(id)?)?;
        Some((page, page.panel(id)?))
    }

    pub fn require_panel(&self, id: PanelId) -> Result<&Panel, LayoutError> {
        self.find_panel(id)
            .map(|(_, panel)| panel)
            .ok_or(LayoutError::PanelNotFound { panel: id })
    }

    /// Create a default-sized panel in the first free slot of the page.
    pub fn add_panel(&mut self, page_id: PageId) -> Result<AddedPanel, LayoutError> {
        let page = self.require_page(page_id)?;
        let placement = self
            .placement
            .find_free_space(page, self.rules.panel_size, self.rules.gutter);
        let rect = page.clamp_rect(
            Rect::from_origin_size(placement.point(), self.rules.panel_size),
            self.rules.min_size,
        );

        let id = self.ids.mint_panel();
        let min_size = self.rules.min_size;
        self.page_mut(page_id)?
            .push_panel(Panel::new(id, page_id, rect), min_size);
        self.panel_index.insert(id, page_id);
        tracing::debug!(page = %page_id, panel = %id, x = rect.x, y = rect.y, stacked = placement.is_stacked(), "panel added");
        Ok(AddedPanel {
            id,
            rect,
            placement,
        })
    }

    /// Copy a panel under a fresh id, offset and clamped, directly above it.
    pub fn duplicate_panel(&mut self, source: PanelId) -> Result<PanelId, LayoutError> {
        let page_id = self
            .page_of(source)
            .ok_or(LayoutError::PanelNotFound { panel: source })?;
        let page = self.require_page(page_id)?;
        let index = page
            .z_index(source)
            .ok_or(LayoutError::PanelNotFound { panel: source })?;
        let source_panel = page.panels()[index].clone();
        let offset = self.rules.duplicate_offset;
        let id = self.ids.mint_panel();
        let copy = source_panel.duplicate(id, offset.x, offset.y);

        let min_size = self.rules.min_size;
        self.page_mut(page_id)?.insert_panel(index + 1, copy, min_size);
        self.panel_index.insert(id, page_id);
        tracing::debug!(source = %source, panel = %id, "panel duplicated");
        Ok(id)
    }

    pub fn delete_panel(&mut self, id: PanelId) -> Result<Panel, LayoutError> {
        let page_id = self
            .page_of(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        let removed = self.page_mut(page_id)?.remove_panel(id)?;
        self.panel_index.remove(&id);
        tracing::debug!(page = %page_id, panel = %id, "panel deleted");
        Ok(removed)
    }

    /// Persist new geometry for a panel; returns the clamped rectangle.
    pub fn set_panel_rect(&mut self, id: PanelId, rect: Rect) -> Result<Rect, LayoutError> {
        let page_id = self
            .page_of(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        let min_size = self.rules.min_size;
        self.page_mut(page_id)?.set_panel_rect(id, rect, min_size)
    }

    pub fn update_panel_style(&mut self, id: PanelId, style: PanelStyle) -> Result<(), LayoutError> {
        let page_id = self
            .page_of(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        self.page_mut(page_id)?.set_panel_style(id, style)
    }

    pub fn set_panel_content(
        &mut self,
        id: PanelId,
        content: Vec<ContentRef>,
    ) -> Result<(), LayoutError> {
        let page_id = self
            .page_of(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        self.page_mut(page_id)?.set_panel_content(id, content)
    }

    /// Change a panel's z-order; returns whether the order changed.
    pub fn reorder_panel(&mut self, id: PanelId, step: ZOrderMove) -> Result<bool, LayoutError> {
        let page_id = self
            .page_of(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        let page = self.page_mut(page_id)?;
        let current = page
            .z_index(id)
            .ok_or(LayoutError::PanelNotFound { panel: id })?;
        let top = page.panels().len().saturating_sub(1);
        let target = match step {
            ZOrderMove::Forward => (current + 1).min(top),
            ZOrderMove::Backward => current.saturating_sub(1),
            ZOrderMove::ToFront => top,
            ZOrderMove::ToBack => 0,
        };
        page.move_panel(id, target)
    }

    /// Replace every panel on the page with fresh panels laid out by
    /// `template`; returns the new ids in reading order.
    pub fn apply_template(
        &mut self,
        page_id: PageId,
        template: &Template,
    ) -> Result<Vec<PanelId>, LayoutError> {
        let page = self.require_page(page_id)?;
        let rects = template.layout_for(page.size(), self.rules.min_size);
        let panels: Vec<Panel> = rects
            .into_iter()
            .map(|rect| Panel::new(self.ids.mint_panel(), page_id, rect))
            .collect();
        let ids: Vec<PanelId> = panels.iter().map(|panel| panel.id).collect();

        let min_size = self.rules.min_size;
        let discarded = self.page_mut(page_id)?.replace_panels(panels, min_size);
        for panel in &discarded {
            self.panel_index.remove(&panel.id);
        }
        for id in &ids {
            self.panel_index.insert(*id, page_id);
        }
        tracing::info!(
            page = %page_id,
            template = %template.id,
            discarded = discarded.len(),
            created = ids.len(),
            "template applied"
        );
        Ok(ids)
    }

    /// Restore a page's panel list to a previously captured state.
    pub fn restore_panels(&mut self, page_id: PageId, panels: Vec<Panel>) -> Result<(), LayoutError> {
        let min_size = self.rules.min_size;
        let page = self.page_mut(page_id)?;
        let discarded = page.replace_panels(panels, min_size);
        let restored: Vec<PanelId> = page.panels().iter().map(|panel| panel.id).collect();
        for panel in discarded {
            self.panel_index.remove(&panel.id);
        }
        for id in restored {
            self.panel_index.insert(id, page_id);
        }
        Ok(())
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn page_mut(&mut self, id: PageId) -> Result<&mut Page, LayoutError> {
        self.pages
            .iter_mut()
            .find(|page| page.id() == id)
            .ok_or(LayoutError::PageNotFound { page: id })
    }

    fn index_page(&mut self, page: &Page) -> Result<(), LayoutError> {
        for panel in page.panels() {
            if self.panel_index.insert(panel.id, page.id()).is_some() {
                return Err(LayoutError::DuplicatePanelId { panel: panel.id });
            }
        }
        Ok(())
    }

    fn renumber(&mut self) {
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.set_number(u32::try_from(index + 1).unwrap_or(u32::MAX));
        }
    }

    /// Replace or append a loaded page, keeping ids unique across the project.
    pub(crate) fn install_page(&mut self, page: Page) -> Result<PageId, LayoutError> {
        let id = page.id();
        for panel in page.panels() {
            match self.panel_index.get(&panel.id) {
                Some(owner) if *owner != id => {
                    return Err(LayoutError::DuplicatePanelId { panel: panel.id });
                }
                _ => {}
            }
        }
        self.ids.bump_past(std::slice::from_ref(&page));

        match self.page_index(id) {
            Some(index) => {
                let old = std::mem::replace(&mut self.pages[index], page);
                for panel in old.panels() {
                    self.panel_index.remove(&panel.id);
                }
            }
            None => self.pages.push(page),
        }
        let installed = self
            .page_by_id(id)
            .map(|page| page.panels().iter().map(|panel| panel.id).collect::<Vec<_>>())
            .unwrap_or_default();
        for panel in installed {
            self.panel_index.insert(panel, id);
        }
        self.renumber();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateCatalog;

    fn repo() -> Repository {
        Repository::new(LayoutRules::default())
    }

    fn first_page_id(repo: &Repository) -> PageId {
        repo.page(0).unwrap().id()
    }

    #[test]
    fn new_repository_has_one_page() {
        let repo = repo();
        assert_eq!(repo.page_count(), 1);
        let page = repo.page(0).unwrap();
        assert_eq!(page.number(), 1);
        assert_eq!(page.size(), DEFAULT_PAGE_SIZE);
        assert!(page.panels().is_empty());
    }

    #[test]
    fn last_page_cannot_be_deleted() {
        let mut repo = repo();
        let only = first_page_id(&repo);
        assert_eq!(repo.delete_page(only), Err(LayoutError::LastPage));
        assert_eq!(repo.page_count(), 1);
    }

    #[test]
    fn deleting_pages_renumbers_and_unindexes() {
        let mut repo = repo();
        let first = first_page_id(&repo);
        let second = repo.add_page();
        let third = repo.add_page();
        let panel = repo.add_panel(second).unwrap().id;

        repo.delete_page(second).unwrap();
        assert_eq!(repo.page_of(panel), None);
        assert_eq!(repo.page_by_id(first).unwrap().number(), 1);
        assert_eq!(repo.page_by_id(third).unwrap().number(), 2);
        assert_eq!(
            repo.delete_page(second),
            Err(LayoutError::PageNotFound { page: second })
        );
    }

    #[test]
    fn move_page_renumbers() {
        let mut repo = repo();
        let first = first_page_id(&repo);
        let second = repo.add_page();
        repo.move_page(0, 1).unwrap();
        assert_eq!(repo.page(0).unwrap().id(), second);
        assert_eq!(repo.page_by_id(first).unwrap().number(), 2);
        assert_eq!(
            repo.move_page(5, 0),
            Err(LayoutError::PageIndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn add_panel_uses_free_space() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let a = repo.add_panel(page).unwrap();
        let b = repo.add_panel(page).unwrap();
        assert_eq!(a.rect, Rect::new(50, 50, 200, 150));
        assert_eq!(b.rect, Rect::new(270, 50, 200, 150));
        assert_ne!(a.id, b.id);
        assert_eq!(repo.page_of(b.id), Some(page));
    }

    #[test]
    fn duplicate_sits_above_source_with_offset() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let a = repo.add_panel(page).unwrap().id;
        let b = repo.add_panel(page).unwrap().id;
        let copy = repo.duplicate_panel(a).unwrap();

        let page = repo.page_by_id(page).unwrap();
        let order: Vec<PanelId> = page.panels().iter().map(|p| p.id).collect();
        assert_eq!(order, vec![a, copy, b]);
        assert_eq!(page.panel(copy).unwrap().rect, Rect::new(70, 70, 200, 150));
    }

    #[test]
    fn duplicate_is_clamped_at_page_edge() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let a = repo.add_panel(page).unwrap().id;
        repo.set_panel_rect(a, Rect::new(600, 850, 200, 150)).unwrap();
        let copy = repo.duplicate_panel(a).unwrap();
        assert_eq!(repo.require_panel(copy).unwrap().rect, Rect::new(600, 850, 200, 150));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let a = repo.add_panel(page).unwrap().id;
        repo.delete_panel(a).unwrap();
        let b = repo.add_panel(page).unwrap().id;
        assert!(b > a);
        assert_eq!(
            repo.delete_panel(a),
            Err(LayoutError::PanelNotFound { panel: a })
        );
    }

    #[test]
    fn set_panel_rect_clamps() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let a = repo.add_panel(page).unwrap().id;
        let stored = repo.set_panel_rect(a, Rect::new(-10, 990, 20, 500)).unwrap();
        assert_eq!(stored, Rect::new(0, 500, 50, 500));
    }

    #[test]
    fn reorder_panel_steps() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let a = repo.add_panel(page).unwrap().id;
        let b = repo.add_panel(page).unwrap().id;
        let c = repo.add_panel(page).unwrap().id;

        assert!(repo.reorder_panel(a, ZOrderMove::Forward).unwrap());
        assert!(repo.reorder_panel(c, ZOrderMove::ToBack).unwrap());
        assert!(!repo.reorder_panel(c, ZOrderMove::Backward).unwrap());
        let order: Vec<PanelId> = repo
            .page_by_id(page)
            .unwrap()
            .panels()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn template_replaces_all_panels() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let old = repo.add_panel(page).unwrap().id;
        let catalog = TemplateCatalog::builtin();
        let ids = repo
            .apply_template(page, catalog.get("grid-2x2").unwrap())
            .unwrap();

        assert_eq!(ids.len(), 4);
        assert_eq!(repo.page_of(old), None);
        assert!(ids.iter().all(|id| *id > old));
        let rects: Vec<Rect> = repo
            .page_by_id(page)
            .unwrap()
            .panels()
            .iter()
            .map(|p| p.rect)
            .collect();
        assert_eq!(rects[1], Rect::new(410, 20, 370, 470));
    }

    #[test]
    fn restore_reindexes() {
        let mut repo = repo();
        let page = first_page_id(&repo);
        let a = repo.add_panel(page).unwrap().id;
        let before = repo.page_by_id(page).unwrap().panels().to_vec();
        let b = repo.add_panel(page).unwrap().id;

        repo.restore_panels(page, before).unwrap();
        assert_eq!(repo.page_of(a), Some(page));
        assert_eq!(repo.page_of(b), None);
    }

    #[test]
    fn custom_placement_strategy() {
        #[derive(Debug)]
        struct Corner;
        impl PlacementStrategy for Corner {
            fn find_free_space(&self, _page: &Page, _size: Size, _margin: i32) -> Placement {
                Placement::Free(Point::new(600, 850))
            }
        }

        let mut repo = repo().with_placement(Corner);
        let page = first_page_id(&repo);
        let added = repo.add_panel(page).unwrap();
        assert_eq!(added.rect, Rect::new(600, 850, 200, 150));
    }
}
